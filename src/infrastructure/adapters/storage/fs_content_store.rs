//! Fs Content Store - 文件系统内容存储实现
//!
//! 实现 ContentStorePort trait。对象以相对路径存放在根目录下，
//! 公开 URL 由静态文件服务（进程外）负责实际回源。

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

use crate::application::ports::{ContentStoreError, ContentStorePort};

/// 文件系统内容存储
pub struct FsContentStore {
    /// 存储根目录
    base_dir: PathBuf,
    /// 公开访问 URL 前缀
    public_base_url: String,
}

impl FsContentStore {
    /// 创建新的文件存储，目录在首次上传时按需创建
    pub fn new(base_dir: PathBuf, public_base_url: impl Into<String>) -> Self {
        let public_base_url = public_base_url.into().trim_end_matches('/').to_string();
        Self {
            base_dir,
            public_base_url,
        }
    }

    /// 获取存储根目录
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// 校验并拼接对象的本地路径
    ///
    /// 只接受不带 `..` 的相对路径，防止越出根目录。
    fn resolve(&self, path: &str) -> Result<PathBuf, ContentStoreError> {
        let relative = Path::new(path);
        let valid = !path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !valid {
            return Err(ContentStoreError::InvalidPath(path.to_string()));
        }
        Ok(self.base_dir.join(relative))
    }
}

#[async_trait]
impl ContentStorePort for FsContentStore {
    async fn exists(&self, path: &str) -> Result<bool, ContentStoreError> {
        let local = self.resolve(path)?;
        match fs::metadata(&local).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ContentStoreError::IoError(format!("{}: {}", path, e))),
        }
    }

    async fn download(&self, path: &str) -> Result<Vec<u8>, ContentStoreError> {
        let local = self.resolve(path)?;
        match fs::read(&local).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ContentStoreError::NotFound(path.to_string()))
            }
            Err(e) => Err(ContentStoreError::IoError(format!("{}: {}", path, e))),
        }
    }

    async fn upload(
        &self,
        path: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<(), ContentStoreError> {
        let local = self.resolve(path)?;

        if let Some(parent) = local.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ContentStoreError::IoError(format!("{}: {}", path, e)))?;
        }

        fs::write(&local, bytes)
            .await
            .map_err(|e| ContentStoreError::IoError(format!("{}: {}", path, e)))?;

        tracing::debug!(
            path = %path,
            size = bytes.len(),
            content_type = %content_type,
            "Stored object"
        );
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.public_base_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store(dir: &Path) -> FsContentStore {
        FsContentStore::new(dir.to_path_buf(), "http://localhost:5070/assets/")
    }

    #[tokio::test]
    async fn test_upload_download_exists() {
        let temp_dir = tempdir().unwrap();
        let store = store(temp_dir.path());

        assert!(!store.exists("convo/w1/abc.json").await.unwrap());

        store
            .upload("convo/w1/abc.json", b"{}", "application/json")
            .await
            .unwrap();

        assert!(store.exists("convo/w1/abc.json").await.unwrap());
        assert_eq!(store.download("convo/w1/abc.json").await.unwrap(), b"{}");
    }

    #[tokio::test]
    async fn test_download_missing_is_not_found() {
        let temp_dir = tempdir().unwrap();
        let store = store(temp_dir.path());

        let err = store.download("convo/missing.json").await.unwrap_err();
        assert!(matches!(err, ContentStoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_upload_overwrites() {
        let temp_dir = tempdir().unwrap();
        let store = store(temp_dir.path());

        store.upload("a/b.txt", b"old", "text/plain").await.unwrap();
        store.upload("a/b.txt", b"new", "text/plain").await.unwrap();

        assert_eq!(store.download("a/b.txt").await.unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_io_error_names_attempted_path() {
        let temp_dir = tempdir().unwrap();
        let store = store(temp_dir.path());

        // 父级被普通文件占据，建目录必然失败
        std::fs::write(temp_dir.path().join("a"), b"blocker").unwrap();

        let err = store.upload("a/b.txt", b"x", "text/plain").await.unwrap_err();
        match err {
            ContentStoreError::IoError(msg) => assert!(msg.contains("a/b.txt"), "{msg}"),
            other => panic!("expected io error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_traversal_rejected() {
        let temp_dir = tempdir().unwrap();
        let store = store(temp_dir.path());

        for bad in ["../evil.txt", "/etc/passwd", "a/../../evil", ""] {
            let err = store.exists(bad).await.unwrap_err();
            assert!(matches!(err, ContentStoreError::InvalidPath(_)), "{bad}");
        }
    }

    #[test]
    fn test_public_url_joins_without_double_slash() {
        let store = FsContentStore::new(PathBuf::from("/tmp/x"), "http://localhost:5070/assets/");
        assert_eq!(
            store.public_url("audio/w1/x.mp3"),
            "http://localhost:5070/assets/audio/w1/x.mp3"
        );
    }
}
