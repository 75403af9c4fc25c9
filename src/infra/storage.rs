use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;

/// Image bytes on the local filesystem, addressed by opaque file name.
#[derive(Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn put(&self, file_name: &str, bytes: Bytes) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.root.join(file_name), &bytes).await
    }

    pub async fn exists(&self, file_name: &str) -> bool {
        tokio::fs::try_exists(self.root.join(file_name))
            .await
            .unwrap_or(false)
    }
}
