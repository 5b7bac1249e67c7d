//! Content Store Port - 出站端口
//!
//! 定义持久内容存储的抽象接口（按内容寻址的 blob 存储）

use async_trait::async_trait;
use thiserror::Error;

/// 内容存储错误
#[derive(Debug, Error)]
pub enum ContentStoreError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

/// Content Store Port - 出站端口
///
/// 以稳定路径存取不可变 blob。路径由调用方通过
/// [`crate::domain::cache_key`] 派生，存储本身不关心语义。
#[async_trait]
pub trait ContentStorePort: Send + Sync {
    /// 检查对象是否存在
    async fn exists(&self, path: &str) -> Result<bool, ContentStoreError>;

    /// 下载对象内容
    async fn download(&self, path: &str) -> Result<Vec<u8>, ContentStoreError>;

    /// 上传对象（覆盖写）
    async fn upload(
        &self,
        path: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<(), ContentStoreError>;

    /// 对象的公开访问 URL（纯路径计算，不校验存在性）
    fn public_url(&self, path: &str) -> String;
}
