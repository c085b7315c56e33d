use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{Connection, OptionalExtension, params};

use crate::error::CacheError;

/// What the last build recorded for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedPage {
    pub page_key: String,
    pub content_hash: [u8; 32],
    pub output_path: String,
    pub block_count: usize,
}

pub trait RenderCache {
    fn get(&mut self, page_key: &str) -> Result<Option<CachedPage>, CacheError>;
    fn put(&mut self, page: &CachedPage) -> Result<(), CacheError>;
}

/// blake3 over every input, each one length-prefixed so that
/// `["ab", "c"]` and `["a", "bc"]` differ.
pub fn fingerprint(inputs: &[&[u8]]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    for input in inputs {
        hasher.update(&(input.len() as u64).to_le_bytes());
        hasher.update(input);
    }
    *hasher.finalize().as_bytes()
}

pub struct SqliteRenderCache {
    conn: Connection,
}

const SCHEMA_VERSION: i64 = 1;

impl SqliteRenderCache {
    pub fn open(path: &Path) -> Result<Self, CacheError> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, CacheError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, CacheError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS meta(\
                key TEXT PRIMARY KEY,\
                value INTEGER NOT NULL\
            );",
        )?;
        let version: Option<i64> = conn
            .query_row(
                "SELECT value FROM meta WHERE key = 'schema_version'",
                [],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(version) = version {
            if version != SCHEMA_VERSION {
                log::warn!(
                    "render cache schema version mismatch (found {version}, expected {SCHEMA_VERSION}), recreating cache"
                );
                conn.execute_batch(
                    "DROP TABLE IF EXISTS pages;\
                    DROP TABLE IF EXISTS meta;",
                )?;
            }
        }
        create_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn len(&self) -> Result<usize, CacheError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM pages", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool, CacheError> {
        Ok(self.len()? == 0)
    }

    /// Drops pages whose key is not in `keep`. Returns how many were removed.
    pub fn retain(&mut self, keep: &[String]) -> Result<usize, CacheError> {
        let tx = self.conn.transaction()?;
        let stale: Vec<String> = {
            let mut stmt = tx.prepare("SELECT page_key FROM pages")?;
            let keys = stmt.query_map([], |row| row.get::<_, String>(0))?;
            let mut stale = Vec::new();
            for key in keys {
                let key = key?;
                if !keep.contains(&key) {
                    stale.push(key);
                }
            }
            stale
        };
        for key in &stale {
            tx.execute("DELETE FROM pages WHERE page_key = ?1", params![key])?;
        }
        tx.commit()?;
        Ok(stale.len())
    }
}

fn create_schema(conn: &Connection) -> Result<(), CacheError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS meta(\
            key TEXT PRIMARY KEY,\
            value INTEGER NOT NULL\
        );\
        CREATE TABLE IF NOT EXISTS pages(\
            page_key TEXT PRIMARY KEY,\
            content_hash BLOB NOT NULL,\
            output_path TEXT NOT NULL,\
            block_count INTEGER NOT NULL,\
            updated_utc INTEGER NULL\
        );",
    )?;
    conn.execute(
        "INSERT OR REPLACE INTO meta (key, value) VALUES ('schema_version', ?1)",
        params![SCHEMA_VERSION],
    )?;
    Ok(())
}

impl RenderCache for SqliteRenderCache {
    fn get(&mut self, page_key: &str) -> Result<Option<CachedPage>, CacheError> {
        let row: Option<(Vec<u8>, String, i64)> = self
            .conn
            .query_row(
                "SELECT content_hash, output_path, block_count FROM pages WHERE page_key = ?1",
                params![page_key],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;
        let Some((blob, output_path, block_count)) = row else {
            return Ok(None);
        };
        if blob.len() != 32 {
            return Err(CacheError::InvalidFingerprintLength {
                page_key: page_key.to_string(),
                length: blob.len(),
            });
        }
        let mut content_hash = [0u8; 32];
        content_hash.copy_from_slice(&blob);
        Ok(Some(CachedPage {
            page_key: page_key.to_string(),
            content_hash,
            output_path,
            block_count: block_count.max(0) as usize,
        }))
    }

    fn put(&mut self, page: &CachedPage) -> Result<(), CacheError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64;
        self.conn.execute(
            "INSERT INTO pages (page_key, content_hash, output_path, block_count, updated_utc)\n\
                VALUES (?1, ?2, ?3, ?4, ?5)\n\
                ON CONFLICT(page_key) DO UPDATE SET\n\
                    content_hash = excluded.content_hash,\n\
                    output_path = excluded.output_path,\n\
                    block_count = excluded.block_count,\n\
                    updated_utc = excluded.updated_utc",
            params![
                page.page_key,
                page.content_hash.to_vec(),
                page.output_path,
                page.block_count as i64,
                now
            ],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_separates_inputs() {
        assert_ne!(fingerprint(&[b"ab", b"c"]), fingerprint(&[b"a", b"bc"]));
        assert_eq!(fingerprint(&[b"x"]), fingerprint(&[b"x"]));
    }

    #[test]
    fn in_memory_round_trip() {
        let mut cache = SqliteRenderCache::open_in_memory().expect("open");
        assert!(cache.is_empty().expect("count"));
        let page = CachedPage {
            page_key: "blog/first".to_string(),
            content_hash: fingerprint(&[b"<p>hi</p>"]),
            output_path: "blog/first/index.html".to_string(),
            block_count: 2,
        };
        cache.put(&page).expect("put");
        assert_eq!(cache.get("blog/first").expect("get"), Some(page));
        assert_eq!(cache.get("missing").expect("get"), None);
    }
}
