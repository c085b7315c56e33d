use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("render cache database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("cannot prepare render cache directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("page '{page_key}' has a {length}-byte fingerprint, expected 32")]
    InvalidFingerprintLength { page_key: String, length: usize },
}
