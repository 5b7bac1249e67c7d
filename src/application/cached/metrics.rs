//! 缓存命中指标
//!
//! 进程生命周期内单调递增的计数器，不跨重启持久化

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// 单个服务的命中计数器
#[derive(Debug, Default)]
pub struct ServiceCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    total: AtomicU64,
}

impl ServiceCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// 每次调用恰好记一次，与命中与否无关
    pub fn record_call(&self) {
        self.total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ServiceMetrics {
        ServiceMetrics::from_counts(
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
            self.total.load(Ordering::Relaxed),
        )
    }
}

/// 对外暴露的服务指标
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceMetrics {
    pub hits: u64,
    pub misses: u64,
    pub total: u64,
    /// 形如 "66.67%"，total 为 0 时是 "0.00%"
    pub hit_rate: String,
}

impl ServiceMetrics {
    pub fn from_counts(hits: u64, misses: u64, total: u64) -> Self {
        let hit_rate = if total == 0 {
            "0.00%".to_string()
        } else {
            format!("{:.2}%", hits as f64 / total as f64 * 100.0)
        };
        Self {
            hits,
            misses,
            total,
            hit_rate,
        }
    }
}

/// 全量指标快照
///
/// services 按名称排序保证输出稳定，overall 是跨服务合计。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub services: BTreeMap<String, ServiceMetrics>,
    pub overall: ServiceMetrics,
}

impl MetricsSnapshot {
    pub fn from_services(services: BTreeMap<String, ServiceMetrics>) -> Self {
        let (hits, misses, total) = services.values().fold((0, 0, 0), |(h, m, t), s| {
            (h + s.hits, m + s.misses, t + s.total)
        });
        Self {
            services,
            overall: ServiceMetrics::from_counts(hits, misses, total),
        }
    }
}
