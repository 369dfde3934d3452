//! SPC's durable blob tier: immutable artifact storage with public read
//! access (§4.4.4). The trait is the boundary a real deployment swaps for
//! S3/GCS; `FsBlobStore` is the filesystem-backed reference implementation,
//! serving artifacts back out under `public_base_url`.
//!
//! Mirrors the manual `BoxFuture`-returning trait pattern used for
//! [`crate::handler::Handler`] rather than pulling in an async-trait macro,
//! so `Box<dyn BlobStore>` stays usable as a trait object.

use std::path::PathBuf;

use futures_util::future::BoxFuture;

use crate::error::CoreError;

pub trait BlobStore: Send + Sync {
    /// Lists artifact URLs whose storage path starts with `prefix`
    /// (typically a `CachePath`, pre-extension).
    fn list_by_prefix<'a>(&'a self, prefix: &'a str) -> BoxFuture<'a, Result<Vec<String>, CoreError>>;

    /// Writes `bytes` to `path` with public read access and returns its URL.
    fn put<'a>(&'a self, path: &'a str, bytes: Vec<u8>) -> BoxFuture<'a, Result<String, CoreError>>;
}

pub struct FsBlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl FsBlobStore {
    pub fn new(root: PathBuf, public_base_url: impl Into<String>) -> Self {
        Self { root, public_base_url: public_base_url.into() }
    }

    fn fs_path(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }

    fn public_url(&self, relative: &str) -> String {
        format!("{}/{}", self.public_base_url.trim_end_matches('/'), relative)
    }
}

impl BlobStore for FsBlobStore {
    fn list_by_prefix<'a>(&'a self, prefix: &'a str) -> BoxFuture<'a, Result<Vec<String>, CoreError>> {
        Box::pin(async move {
            let full_prefix = self.fs_path(prefix);
            let dir = full_prefix.parent().map(|p| p.to_path_buf()).unwrap_or_else(|| self.root.clone());
            let file_prefix = full_prefix
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();

            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
                Err(e) => return Err(CoreError::StorageFailure(e.to_string())),
            };

            let mut hits = Vec::new();
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| CoreError::StorageFailure(e.to_string()))?
            {
                let name = entry.file_name().to_string_lossy().into_owned();
                if name.starts_with(&file_prefix) {
                    let relative = dir
                        .strip_prefix(&self.root)
                        .unwrap_or(&dir)
                        .join(&name)
                        .to_string_lossy()
                        .into_owned();
                    hits.push(self.public_url(&relative));
                }
            }

            Ok(hits)
        })
    }

    fn put<'a>(&'a self, path: &'a str, bytes: Vec<u8>) -> BoxFuture<'a, Result<String, CoreError>> {
        Box::pin(async move {
            let full = self.fs_path(path);
            if let Some(parent) = full.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| CoreError::StorageFailure(e.to_string()))?;
            }
            tokio::fs::write(&full, bytes)
                .await
                .map_err(|e| CoreError::StorageFailure(e.to_string()))?;
            Ok(self.public_url(path))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_dir(name: &str) -> PathBuf {
        let mut dir = std::env::temp_dir();
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        dir.push(format!("facecache-blob-test-{name}-{nanos}"));
        dir
    }

    #[tokio::test]
    async fn put_then_list_by_prefix_finds_it() {
        let root = tmp_dir("put-list");
        let store = FsBlobStore::new(root, "https://cdn.example.com");

        let url = store.put("cache/v1/m/abc.webp", b"bytes".to_vec()).await.unwrap();
        assert!(url.ends_with("cache/v1/m/abc.webp"));

        let hits = store.list_by_prefix("cache/v1/m/abc").await.unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn list_by_prefix_on_missing_directory_is_empty_not_an_error() {
        let root = tmp_dir("missing-dir");
        let store = FsBlobStore::new(root, "https://cdn.example.com");
        let hits = store.list_by_prefix("cache/v1/m/abc").await.unwrap();
        assert!(hits.is_empty());
    }
}
