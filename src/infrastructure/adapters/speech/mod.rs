//! 语音合成适配器

mod fake_speech_synthesizer;
mod http_speech_synthesizer;

pub use fake_speech_synthesizer::FakeSpeechSynthesizer;
pub use http_speech_synthesizer::{HttpSpeechSynthesizer, HttpSpeechSynthesizerConfig};
