//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod content_store;
mod ephemeral_cache;
mod speech_synthesizer;
mod text_generator;

pub use content_store::{ContentStoreError, ContentStorePort};
pub use ephemeral_cache::{CacheError, EphemeralCachePort};
pub use speech_synthesizer::{SpeechError, SpeechOptions, SpeechSynthesizerPort};
pub use text_generator::{GenerationError, GenerationOptions, TextGeneratorPort};
