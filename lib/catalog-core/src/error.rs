use thiserror::Error;

pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("No such service: {0}")]
    NoSuchService(String),

    #[error("No such service instance: {0}")]
    NoSuchInstance(String),

    #[error("Read-only catalog: API not supported: {0}")]
    Unsupported(&'static str),

    #[error("Directory connection error: {0}")]
    Connect(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification of a `CatalogError`, used by API layers to pick a
/// response class without matching on every variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    NoSuchServiceName,
    NoSuchServiceInstance,
    BadRequest,
    Connect,
    Internal,
}

impl CatalogError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CatalogError::NoSuchService(_) => ErrorCode::NoSuchServiceName,
            CatalogError::NoSuchInstance(_) => ErrorCode::NoSuchServiceInstance,
            CatalogError::Unsupported(_) => ErrorCode::BadRequest,
            CatalogError::Connect(_) => ErrorCode::Connect,
            CatalogError::Serialization(_) | CatalogError::Internal(_) => ErrorCode::Internal,
        }
    }
}
