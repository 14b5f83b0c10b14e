use crate::core::Storage;
use crate::utils::error::{FetchError, Result};
use std::path::{Path, PathBuf};

/// 以輸出目錄為根的本機檔案儲存
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }
}

impl Storage for LocalStorage {
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        let full_path = self.base_path.join(path);
        tokio::fs::create_dir_all(&full_path)
            .await
            .map_err(|source| FetchError::CreateDirError {
                path: full_path,
                source,
            })
    }

    async fn write_file(&self, path: &Path, data: &[u8]) -> Result<()> {
        let full_path = self.base_path.join(path);
        tokio::fs::write(&full_path, data)
            .await
            .map_err(|source| FetchError::WriteFileError {
                path: full_path,
                source,
            })
    }
}
