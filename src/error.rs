use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("gRPC error: {0}")]
    GrpcError(String),

    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Transaction error: {0}")]
    TransactionError(String),

    #[error("Timeout error: {0}")]
    TimeoutError(String),

    #[error("Signing error: {0}")]
    SigningError(String),

    #[error("Encryption error: {0}")]
    EncryptionError(String),

    #[error("Manifest error: {0}")]
    ManifestError(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::EncodingError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
