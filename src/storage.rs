use std::{fs, path::PathBuf};

use anyhow::{Context, Result};

/// Abstract persist-blob / read-blob capability. The presentation layer
/// decides what a named artifact actually is (a download, a picked file);
/// the session core only needs these two operations.
pub trait BlobStore: Send + Sync {
    fn persist(&self, name: &str, bytes: &[u8]) -> Result<()>;
    fn read(&self, identifier: &str) -> Result<Vec<u8>>;
}

/// Blob store over a directory on the local filesystem.
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: PathBuf) -> Result<Self> {
        fs::create_dir_all(&root)
            .with_context(|| format!("failed to create blob directory {}", root.display()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }
}

impl BlobStore for FsBlobStore {
    fn persist(&self, name: &str, bytes: &[u8]) -> Result<()> {
        let path = self.root.join(name);
        fs::write(&path, bytes)
            .with_context(|| format!("failed to write blob to {}", path.display()))
    }

    fn read(&self, identifier: &str) -> Result<Vec<u8>> {
        let path = self.root.join(identifier);
        fs::read(&path).with_context(|| format!("failed to read blob from {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persist_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path().to_path_buf()).unwrap();
        store.persist("blob.json", b"{\"ok\":true}").unwrap();
        assert_eq!(store.read("blob.json").unwrap(), b"{\"ok\":true}");
    }

    #[test]
    fn read_of_missing_blob_errors() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path().to_path_buf()).unwrap();
        assert!(store.read("missing.json").is_err());
    }
}
