//! Noop Cache - 关闭缓存时的空实现
//!
//! 实现 EphemeralCachePort trait，所有操作都是纯空操作。
//! 缓存禁用或后端探测失败时自动选用，调用方无需感知。

use async_trait::async_trait;

use crate::application::ports::{CacheError, EphemeralCachePort};

/// 空缓存
pub struct NoopCache;

impl NoopCache {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NoopCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EphemeralCachePort for NoopCache {
    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &[u8], _ttl_secs: u64) -> Result<(), CacheError> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<bool, CacheError> {
        Ok(false)
    }

    async fn clear(&self, _pattern: &str) -> Result<u64, CacheError> {
        Ok(0)
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_everything_is_a_miss() {
        let cache = NoopCache::new();

        cache.set("k", b"v", 60).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
        assert!(!cache.delete("k").await.unwrap());
        assert_eq!(cache.clear("").await.unwrap(), 0);
        assert!(cache.get_multi(&["k".to_string()]).await.unwrap().is_empty());
    }
}
