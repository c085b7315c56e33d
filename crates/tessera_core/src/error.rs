use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlockError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("invalid field {field}: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },
    #[error("invalid json in {field}: {source}")]
    Json {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable")]
    Unavailable,
    #[error("clipboard write rejected: {0}")]
    Rejected(String),
    #[error("text selection failed: {0}")]
    Selection(String),
}
