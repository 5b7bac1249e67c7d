//! Sled 存储实现

mod sled_cache;

pub use sled_cache::{SledCache, SledCacheConfig};
