//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（TextGenerator、SpeechSynthesizer、ContentStore、EphemeralCache）
//! - commands: CQRS 命令及处理器
//! - cached: 昂贵生成调用的短期缓存装饰与命中指标
//! - error: 应用层错误定义

pub mod cached;
pub mod commands;
pub mod error;
pub mod ports;

// Re-exports
pub use commands::{
    // Conversation commands
    GenerateConversationCommand,
    // Audio commands
    GenerateTurnAudioCommand,
    TurnAudioResponse,
    // Handlers
    handlers::{GenerateConversationHandler, GenerateTurnAudioHandler},
};

pub use cached::{
    CachedConversationService, CachedSpeechSynthesizer, MetricsSnapshot, ServiceCounters,
    ServiceMetrics,
};

pub use error::ApplicationError;

pub use ports::{
    // Content store
    ContentStoreError,
    ContentStorePort,
    // Ephemeral cache
    CacheError,
    EphemeralCachePort,
    // Speech synthesizer
    SpeechError,
    SpeechOptions,
    SpeechSynthesizerPort,
    // Text generator
    GenerationError,
    GenerationOptions,
    TextGeneratorPort,
};
