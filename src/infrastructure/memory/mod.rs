//! Memory Layer - 进程内缓存实现
//!
//! 提供 EphemeralCachePort 的内存后端与空后端

mod memory_cache;
mod noop_cache;

pub use memory_cache::MemoryCache;
pub use noop_cache::NoopCache;
