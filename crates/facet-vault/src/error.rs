use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("key derivation failed: {0}")]
    Derivation(String),

    #[error("registration rejected: {0}")]
    Registration(String),

    #[error("account not found: {0}")]
    NotFound(String),

    #[error("account authority error: {0}")]
    Authority(String),

    #[error("decryption failed: {0}")]
    Decryption(String),

    #[error("decryption failed for field '{field}'")]
    FieldDecryption { field: String },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("vault store error: {0}")]
    Store(String),

    #[error("no identity set - register or check an account first")]
    IdentityNotSet,

    #[error("crypto error: {0}")]
    Crypto(#[from] facet_crypto::CryptoError),
}

pub type Result<T> = std::result::Result<T, Error>;
