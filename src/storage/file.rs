use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use super::CartStorage;
use crate::error::StorageError;

/// File-backed key-value store: one `<key>.json` file per key inside `dir`.
#[derive(Debug, Clone)]
pub struct FileCartStorage {
    dir: PathBuf,
}

impl FileCartStorage {
    /// Creates `dir` if it does not exist yet.
    pub async fn new(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    /// Keys may contain characters that are awkward in file names (`@RocketShoes:cart`).
    /// ASCII alphanumerics and `-` are kept; every other byte, `_` included, is written
    /// as `_XX` in hex, so distinct keys never share a file.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let mut name = String::with_capacity(key.len());
        for byte in key.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'-' {
                name.push(char::from(byte));
            } else {
                name.push_str(&format!("_{:02X}", byte));
            }
        }
        self.dir.join(format!("{}.json", name))
    }
}

/// Writes through a temp file in the same directory and renames it over `path`,
/// so readers never see a half-written cart.
fn write_atomic(dir: &Path, path: &Path, content: &str) -> Result<(), StorageError> {
    let mut temp_file = tempfile::NamedTempFile::new_in(dir)?;
    temp_file.write_all(content.as_bytes())?;
    temp_file.persist(path).map_err(|e| StorageError::Io(e.error.to_string()))?;
    Ok(())
}

#[async_trait]
impl CartStorage for FileCartStorage {
    async fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path).await {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No stored cart");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, key: &str, blob: &str) -> Result<(), StorageError> {
        let dir = self.dir.clone();
        let path = self.path_for(key);
        let blob = blob.to_owned();
        tokio::task::spawn_blocking(move || write_atomic(&dir, &path, &blob))
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?
    }
}
