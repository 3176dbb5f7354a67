// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Per-format scratch storage.
//!
//! Each format owns one directory holding one file per sample index
//! (`<root>/<FORMAT>/sample<index>.<ext>`). The serialize phase is the only
//! writer and the deserialize phase the only reader, so no locking is needed.

use std::path::{Path, PathBuf};

use crate::error::{CodecError, CodecResult};
use crate::types::FormatId;

#[derive(Debug, Clone)]
pub struct ScratchStore {
    dir: PathBuf,
    extension: &'static str,
}

impl ScratchStore {
    /// Scratch area for `format` under `root`. Nothing is created until the first write.
    pub fn new(root: impl AsRef<Path>, format: &FormatId, extension: &'static str) -> Self {
        Self {
            dir: root.as_ref().join(format.as_str()),
            extension,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn extension(&self) -> &'static str {
        self.extension
    }

    pub fn sample_path(&self, sample_index: usize) -> PathBuf {
        self.dir
            .join(format!("sample{}.{}", sample_index, self.extension))
    }

    /// Write the encoded bytes for a sample, creating the directory on demand.
    pub async fn write(&self, sample_index: usize, bytes: &[u8]) -> CodecResult<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| CodecError::Io {
                path: self.dir.clone(),
                source,
            })?;

        let path = self.sample_path(sample_index);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| CodecError::Io { path, source })
    }

    /// Read back exactly what `write` stored for a sample.
    pub async fn read(&self, sample_index: usize) -> CodecResult<Vec<u8>> {
        let path = self.sample_path(sample_index);
        tokio::fs::read(&path)
            .await
            .map_err(|source| CodecError::Io { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(root: &Path) -> ScratchStore {
        ScratchStore::new(root, &FormatId::new("JSON").unwrap(), "json")
    }

    #[test]
    fn test_sample_path_layout() {
        let store = store(Path::new("/tmp/scratch"));
        assert_eq!(
            store.sample_path(2),
            PathBuf::from("/tmp/scratch/JSON/sample2.json")
        );
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(temp_dir.path());

        assert!(!store.dir().exists());
        store.write(0, b"{\"x\":1}").await.unwrap();
        assert!(store.dir().exists());

        let bytes = store.read(0).await.unwrap();
        assert_eq!(bytes, b"{\"x\":1}");
    }

    #[tokio::test]
    async fn test_read_missing_sample() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(temp_dir.path());

        let err = store.read(5).await.unwrap_err();
        assert_eq!(err.kind(), "IOError");
        assert!(err.to_string().contains("sample5.json"));
    }
}
