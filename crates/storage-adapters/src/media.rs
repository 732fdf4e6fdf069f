//! # Local media store
//!
//! Content-addressable filesystem implementation of `MediaStorage`:
//! SHA-256 of the bytes names the file, sharded two levels deep, which
//! also deduplicates repeat uploads of the same photo.

use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use mime::Mime;
use sha2::{Digest, Sha256};
use tokio::fs;

use domains::{AppError, MediaStorage, Result};

pub struct LocalMediaStore {
    /// Root directory for all uploads (e.g., "./data/uploads")
    root_path: PathBuf,
    /// Public URL prefix (e.g., "/media")
    url_prefix: String,
}

impl LocalMediaStore {
    pub fn new(root: PathBuf, url_prefix: String) -> Self {
        Self {
            root_path: root,
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        }
    }

    /// Generates a sharded path: "ab/cd/abcdef...hash"
    fn sharded_path(&self, hash: &str) -> PathBuf {
        let mut path = self.root_path.clone();
        path.push(&hash[0..2]);
        path.push(&hash[2..4]);
        path.push(hash);
        path
    }

    fn public_url(&self, hash: &str) -> String {
        format!("{}/{}/{}/{}", self.url_prefix, &hash[0..2], &hash[2..4], hash)
    }
}

#[async_trait]
impl MediaStorage for LocalMediaStore {
    async fn store(&self, data: Bytes, content_type: &Mime) -> Result<String> {
        if content_type.type_() != mime::IMAGE {
            return Err(AppError::Validation(format!(
                "unsupported upload type: {content_type}"
            )));
        }

        let mut hasher = Sha256::new();
        hasher.update(&data);
        let hash = hex::encode(hasher.finalize());

        let target = self.sharded_path(&hash);
        let parent = target
            .parent()
            .ok_or_else(|| AppError::internal("media path has no parent"))?;
        fs::create_dir_all(parent).await.map_err(AppError::internal)?;

        // Content-addressed: an existing file is already the same bytes.
        if fs::try_exists(&target).await.map_err(AppError::internal)? {
            return Ok(self.public_url(&hash));
        }
        fs::write(&target, &data).await.map_err(AppError::internal)?;
        Ok(self.public_url(&hash))
    }
}
