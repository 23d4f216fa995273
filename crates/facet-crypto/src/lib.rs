pub mod envelope;
pub mod error;
pub mod keyring;
pub mod symmetric;

pub use error::{CryptoError, Result};
pub use keyring::Keyring;

/// Re-export commonly used items
pub mod prelude {
    pub use crate::envelope;
    pub use crate::error::{CryptoError, Result};
    pub use crate::keyring::Keyring;
    pub use crate::symmetric;
}
