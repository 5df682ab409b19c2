//! Keyed byte source for portraits, icons and backgrounds

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("no asset stored under '{0}'")]
    NotFound(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("{0}")]
    Other(String),
}

/// Opens the stored bytes for an asset key.
///
/// Implementations may be remote or cached; the engine calls `open_stream`
/// once per static key at load time and once per unique entity or buff id
/// per render.
#[async_trait]
pub trait ImageRepository: Send + Sync {
    async fn open_stream(&self, key: &str) -> Result<Vec<u8>, RepositoryError>;
}

/// Local asset cache: a directory of `{key}` files, with or without an
/// image/font extension.
#[derive(Debug, Clone)]
pub struct DirectoryRepository {
    root: PathBuf,
}

const EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "webp", "ttf"];

impl DirectoryRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn candidates(&self, key: &str) -> Vec<PathBuf> {
        let mut paths = vec![self.root.join(key)];
        paths.extend(EXTENSIONS.iter().map(|ext| self.root.join(format!("{}.{}", key, ext))));
        paths
    }
}

#[async_trait]
impl ImageRepository for DirectoryRepository {
    async fn open_stream(&self, key: &str) -> Result<Vec<u8>, RepositoryError> {
        if key.contains("..") {
            return Err(RepositoryError::Other(format!("invalid key '{}'", key)));
        }
        for path in self.candidates(key) {
            match tokio::fs::read(&path).await {
                Ok(bytes) => return Ok(bytes),
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                // A directory named like the key; keep looking for a file
                Err(_) if path.is_dir() => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(RepositoryError::NotFound(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_reads_with_and_without_extension() {
        let temp = TempDir::new().expect("should create temp dir");
        std::fs::write(temp.path().join("hsr_moc_star.png"), b"star").unwrap();
        std::fs::write(temp.path().join("raw_key"), b"raw").unwrap();

        let repo = DirectoryRepository::new(temp.path());
        assert_eq!(repo.open_stream("hsr_moc_star").await.unwrap(), b"star");
        assert_eq!(repo.open_stream("raw_key").await.unwrap(), b"raw");
    }

    #[tokio::test]
    async fn test_missing_key_is_not_found() {
        let temp = TempDir::new().expect("should create temp dir");
        let repo = DirectoryRepository::new(temp.path());
        assert!(matches!(
            repo.open_stream("hsr_avatar_1").await,
            Err(RepositoryError::NotFound(key)) if key == "hsr_avatar_1"
        ));
    }

    #[tokio::test]
    async fn test_rejects_parent_traversal() {
        let temp = TempDir::new().expect("should create temp dir");
        let repo = DirectoryRepository::new(temp.path());
        assert!(matches!(repo.open_stream("../secret").await, Err(RepositoryError::Other(_))));
    }
}
