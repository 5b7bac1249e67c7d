//! Memory Cache - 进程内短期缓存实现
//!
//! 实现 EphemeralCachePort trait，DashMap 存储，惰性过期

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use crate::application::ports::{CacheError, EphemeralCachePort};

struct MemoryEntry {
    value: Vec<u8>,
    /// 过期时刻（毫秒时间戳），i64::MAX 表示永不过期
    expires_at_ms: i64,
}

/// 进程内缓存
///
/// 过期条目在下一次 get 时清理，不单独起清理任务。
/// ttl_secs 为 0 表示不过期。
pub struct MemoryCache {
    entries: DashMap<String, MemoryEntry>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    fn expiry_for(ttl_secs: u64) -> i64 {
        if ttl_secs == 0 {
            i64::MAX
        } else {
            Utc::now().timestamp_millis() + (ttl_secs as i64) * 1000
        }
    }

    /// 当前条目数（含未清理的过期条目）
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EphemeralCachePort for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let now = Utc::now().timestamp_millis();
        let expired = match self.entries.get(key) {
            Some(entry) if entry.expires_at_ms > now => return Ok(Some(entry.value.clone())),
            Some(_) => true,
            None => false,
        };
        // 引用已释放，这里 remove 不会和上面的 get 冲突
        if expired {
            self.entries.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &[u8], ttl_secs: u64) -> Result<(), CacheError> {
        self.entries.insert(
            key.to_string(),
            MemoryEntry {
                value: value.to_vec(),
                expires_at_ms: Self::expiry_for(ttl_secs),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.entries.remove(key).is_some())
    }

    async fn clear(&self, pattern: &str) -> Result<u64, CacheError> {
        let mut removed = 0u64;
        self.entries.retain(|key, _| {
            if key.contains(pattern) {
                removed += 1;
                false
            } else {
                true
            }
        });
        Ok(removed)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
