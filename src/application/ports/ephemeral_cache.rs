//! Ephemeral Cache Port - 短期缓存抽象
//!
//! 带 TTL 的快速键值缓存。后端不可用时调用方把错误当作未命中处理，
//! 缓存故障绝不能导致业务调用失败。

use std::collections::HashMap;

use async_trait::async_trait;
use futures_util::future::join_all;
use thiserror::Error;

/// 缓存错误
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache backend error: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Ephemeral Cache Port
///
/// 值为不透明字节串，序列化由调用方负责。
/// 过期语义: 条目在 ttl_secs 后对 get 不可见，物理清理由实现自行安排。
#[async_trait]
pub trait EphemeralCachePort: Send + Sync {
    /// 读取缓存值，未命中或已过期返回 None
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// 写入缓存值并设置存活秒数
    async fn set(&self, key: &str, value: &[u8], ttl_secs: u64) -> Result<(), CacheError>;

    /// 删除单个键，返回是否确实存在
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;

    /// 删除所有键名包含 pattern 的条目，返回删除数量
    async fn clear(&self, pattern: &str) -> Result<u64, CacheError>;

    /// 批量读取，结果只包含命中的键
    ///
    /// 默认实现为并发逐键 get，单键失败按未命中跳过。
    async fn get_multi(&self, keys: &[String]) -> Result<HashMap<String, Vec<u8>>, CacheError> {
        let lookups = keys.iter().map(|key| async move {
            match self.get(key).await {
                Ok(Some(value)) => Some((key.clone(), value)),
                _ => None,
            }
        });

        Ok(join_all(lookups).await.into_iter().flatten().collect())
    }

    /// 后端名称（用于日志与启动探测）
    fn name(&self) -> &'static str;
}
