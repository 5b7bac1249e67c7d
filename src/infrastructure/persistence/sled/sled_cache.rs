//! Sled-based Ephemeral Cache Implementation

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sled::Db;
use std::path::Path;
use std::sync::Arc;

use crate::application::ports::{CacheError, EphemeralCachePort};

/// Sled 缓存配置
#[derive(Debug, Clone)]
pub struct SledCacheConfig {
    /// 数据库路径
    pub db_path: String,
}

impl Default for SledCacheConfig {
    fn default() -> Self {
        Self {
            db_path: "data/cache.sled".to_string(),
        }
    }
}

/// 内部缓存条目
#[derive(Debug, Clone, Serialize, Deserialize)]
struct InternalEntry {
    value: Vec<u8>,
    /// 过期时刻（毫秒时间戳），i64::MAX 表示永不过期
    expires_at_ms: i64,
    created_at: i64,
}

impl InternalEntry {
    fn expired(&self, now_ms: i64) -> bool {
        self.expires_at_ms <= now_ms
    }
}

/// Sled 短期缓存
///
/// 进程重启后条目仍在（连同 TTL），过期条目在读到时摘除，
/// 也可通过 [`purge_expired`](Self::purge_expired) 整体清理。
pub struct SledCache {
    db: Db,
}

impl SledCache {
    /// 创建新的缓存实例
    pub fn new(config: &SledCacheConfig) -> Result<Self, CacheError> {
        let db = sled::open(&config.db_path).map_err(|e| CacheError::Backend(e.to_string()))?;

        tracing::info!(
            db_path = %config.db_path,
            entries = db.len(),
            "SledCache initialized"
        );

        Ok(Self { db })
    }

    /// 打开现有缓存
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CacheError> {
        let config = SledCacheConfig {
            db_path: path.as_ref().to_string_lossy().to_string(),
        };
        Self::new(&config)
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn expiry_for(ttl_secs: u64) -> i64 {
        if ttl_secs == 0 {
            i64::MAX
        } else {
            Utc::now().timestamp_millis() + (ttl_secs as i64) * 1000
        }
    }

    /// 整体清理过期条目，返回清理数量
    pub fn purge_expired(&self) -> Result<u64, CacheError> {
        let now_ms = Utc::now().timestamp_millis();
        let mut purged = 0u64;

        for item in self.db.iter() {
            let (key, value) = item.map_err(|e| CacheError::Backend(e.to_string()))?;
            let expired = bincode::deserialize::<InternalEntry>(&value)
                .map(|entry| entry.expired(now_ms))
                // 读不回来的条目当作过期清掉
                .unwrap_or(true);
            if expired {
                self.db
                    .remove(&key)
                    .map_err(|e| CacheError::Backend(e.to_string()))?;
                purged += 1;
            }
        }

        if purged > 0 {
            tracing::info!(purged = purged, "Purged expired cache entries");
        }
        Ok(purged)
    }

    /// 刷新数据库
    pub fn flush(&self) -> Result<(), CacheError> {
        self.db
            .flush()
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl EphemeralCachePort for SledCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        match self.db.get(key) {
            Ok(Some(data)) => {
                let entry: InternalEntry = bincode::deserialize(&data)
                    .map_err(|e| CacheError::Serialization(e.to_string()))?;

                if entry.expired(Utc::now().timestamp_millis()) {
                    let _ = self.db.remove(key);
                    return Ok(None);
                }
                Ok(Some(entry.value))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(CacheError::Backend(e.to_string())),
        }
    }

    async fn set(&self, key: &str, value: &[u8], ttl_secs: u64) -> Result<(), CacheError> {
        let entry = InternalEntry {
            value: value.to_vec(),
            expires_at_ms: Self::expiry_for(ttl_secs),
            created_at: Utc::now().timestamp(),
        };

        let entry_bytes =
            bincode::serialize(&entry).map_err(|e| CacheError::Serialization(e.to_string()))?;
        self.db
            .insert(key, entry_bytes)
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let removed = self
            .db
            .remove(key)
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        Ok(removed.is_some())
    }

    async fn clear(&self, pattern: &str) -> Result<u64, CacheError> {
        let mut removed = 0u64;

        for item in self.db.iter() {
            let (key, _) = item.map_err(|e| CacheError::Backend(e.to_string()))?;
            if String::from_utf8_lossy(&key).contains(pattern) {
                self.db
                    .remove(&key)
                    .map_err(|e| CacheError::Backend(e.to_string()))?;
                removed += 1;
            }
        }

        tracing::debug!(pattern = %pattern, removed = removed, "Cleared cache entries");
        Ok(removed)
    }

    fn name(&self) -> &'static str {
        "sled"
    }
}
