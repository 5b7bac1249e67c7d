//! 文本生成适配器

mod fake_text_generator;
mod http_text_generator;

pub use fake_text_generator::FakeTextGenerator;
pub use http_text_generator::{HttpTextGenerator, HttpTextGeneratorConfig};
