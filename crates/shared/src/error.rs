use thiserror::Error;

/// Every failure the pin map can run into. All of them are recoverable:
/// callers log or surface them and keep going.
#[derive(Debug, Error)]
pub enum PinError {
    #[error("invalid pin: {0}")]
    Validation(String),

    #[error("stored pins are malformed: {0}")]
    StorageParse(#[from] serde_json::Error),

    #[error("no pin with id {0}")]
    NotFound(String),

    #[error("map image unavailable: {0}")]
    AssetLoad(String),

    #[error("storage failure: {0}")]
    Storage(String),

    #[error("share payload: {0}")]
    Share(String),
}

pub type Result<T> = std::result::Result<T, PinError>;
