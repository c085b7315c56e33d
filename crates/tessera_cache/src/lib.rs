mod error;
mod store;

pub use crate::error::CacheError;
pub use crate::store::{CachedPage, RenderCache, SqliteRenderCache, fingerprint};
