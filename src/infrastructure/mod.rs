//! Infrastructure Layer - 基础设施层
//!
//! 提供所有端口的具体实现与组合根

pub mod adapters;
pub mod memory;
pub mod persistence;
pub mod state;

pub use memory::{MemoryCache, NoopCache};
pub use persistence::{SledCache, SledCacheConfig};
pub use state::AppState;
