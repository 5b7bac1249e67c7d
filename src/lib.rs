//! Huihua - 生词对话生成与缓存编排核心
//!
//! 面向中文生词学习产品：为每个生词生成多轮对话文本并逐轮配音，
//! 所有对外部生成服务（文本生成、语音合成）的昂贵调用都经由本层缓存编排。
//!
//! 架构设计: DDD + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Conversation Context: 对话聚合（3-5 轮、音频填充一次性）
//! - cache_key / turn_parser / prompt: 纯函数（键派生、输出解析、提示词）
//!
//! 应用层 (application/):
//! - Ports: 端口定义（TextGenerator, SpeechSynthesizer, ContentStore, EphemeralCache）
//! - Commands: 生成对话文本 / 填充单轮音频 的命令处理器
//! - Cached: 短期缓存装饰器与命中指标
//!
//! 基础设施层 (infrastructure/):
//! - Adapters: HTTP/Fake 生成与合成客户端、文件系统内容存储
//! - Memory: DashMap 短期缓存与空实现
//! - Persistence: Sled 短期缓存（带 TTL，跨重启）
//! - State: 组合根（AppState），宿主 HTTP 层只依赖它

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use application::ApplicationError;
pub use config::{init_tracing, load_config, AppConfig};
pub use infrastructure::AppState;
