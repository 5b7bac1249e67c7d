//! HTTP Speech Synthesizer - 调用 Google 风格的语音合成服务
//!
//! 实现 SpeechSynthesizerPort trait，通过 HTTP 调用外部合成服务
//!
//! 外部合成 API:
//! POST {base_url}/v1/text:synthesize  (X-Goog-Api-Key 鉴权)
//! Request: {"input": {"text": "..."}, "voice": {...}, "audioConfig": {...}}
//! Response: {"audioContent": "<base64>"}

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::application::ports::{SpeechError, SpeechOptions, SpeechSynthesizerPort};

/// 合成请求体 (JSON)
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest {
    input: SynthesisInput,
    voice: VoiceSelection,
    audio_config: AudioConfig,
}

#[derive(Debug, Serialize)]
struct SynthesisInput {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection {
    language_code: String,
    name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: String,
}

/// 合成响应体 (JSON)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    #[serde(default)]
    audio_content: String,
}

/// HTTP 合成客户端配置
#[derive(Debug, Clone)]
pub struct HttpSpeechSynthesizerConfig {
    /// 合成服务基础 URL
    pub base_url: String,
    /// API key (X-Goog-Api-Key)
    pub api_key: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpSpeechSynthesizerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://texttospeech.googleapis.com".to_string(),
            api_key: String::new(),
            timeout_secs: 30,
        }
    }
}

impl HttpSpeechSynthesizerConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP 合成客户端
pub struct HttpSpeechSynthesizer {
    client: Client,
    config: HttpSpeechSynthesizerConfig,
}

impl HttpSpeechSynthesizer {
    /// 创建新的 HTTP 合成客户端
    pub fn new(config: HttpSpeechSynthesizerConfig) -> Result<Self, SpeechError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SpeechError::Network(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn synthesize_url(&self) -> String {
        format!("{}/v1/text:synthesize", self.config.base_url)
    }

    fn voices_url(&self) -> String {
        format!("{}/v1/voices", self.config.base_url)
    }
}

#[async_trait]
impl SpeechSynthesizerPort for HttpSpeechSynthesizer {
    async fn synthesize_speech(
        &self,
        text: &str,
        options: &SpeechOptions,
    ) -> Result<Vec<u8>, SpeechError> {
        let request = SynthesizeRequest {
            input: SynthesisInput {
                text: text.to_string(),
            },
            voice: VoiceSelection {
                language_code: options.language_code.clone(),
                name: options.voice_name.clone(),
            },
            audio_config: AudioConfig {
                audio_encoding: options.audio_encoding.clone(),
            },
        };

        tracing::debug!(
            url = %self.synthesize_url(),
            text_len = text.len(),
            voice = %options.voice_name,
            "Sending synthesis request"
        );

        let response = self
            .client
            .post(&self.synthesize_url())
            .header("X-Goog-Api-Key", &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SpeechError::Timeout
                } else if e.is_connect() {
                    SpeechError::Network(format!("Cannot connect to speech service: {}", e))
                } else {
                    SpeechError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => SpeechError::Auth(format!("HTTP {}: {}", status, error_text)),
                402 | 429 => SpeechError::Quota(format!("HTTP {}: {}", status, error_text)),
                _ => SpeechError::Service(format!("HTTP {}: {}", status, error_text)),
            });
        }

        let body: SynthesizeResponse = response
            .json()
            .await
            .map_err(|e| SpeechError::InvalidResponse(e.to_string()))?;
        if body.audio_content.is_empty() {
            return Err(SpeechError::InvalidResponse(
                "empty audioContent".to_string(),
            ));
        }

        let bytes = BASE64
            .decode(&body.audio_content)
            .map_err(|e| SpeechError::InvalidResponse(format!("bad base64 audio: {}", e)))?;

        tracing::info!(
            voice = %options.voice_name,
            audio_size = bytes.len(),
            "Synthesis completed"
        );

        Ok(bytes)
    }

    async fn health_check(&self) -> bool {
        match self
            .client
            .get(&self.voices_url())
            .header("X-Goog-Api-Key", &self.config.api_key)
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = HttpSpeechSynthesizerConfig::default();
        assert_eq!(config.base_url, "https://texttospeech.googleapis.com");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_config_builder() {
        let config =
            HttpSpeechSynthesizerConfig::new("http://localhost:9880", "test-key").with_timeout(10);
        assert_eq!(config.base_url, "http://localhost:9880");
        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn test_request_uses_camel_case() {
        let request = SynthesizeRequest {
            input: SynthesisInput {
                text: "你好".to_string(),
            },
            voice: VoiceSelection {
                language_code: "cmn-CN".to_string(),
                name: "cmn-CN-Wavenet-A".to_string(),
            },
            audio_config: AudioConfig {
                audio_encoding: "MP3".to_string(),
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["voice"]["languageCode"], "cmn-CN");
        assert_eq!(json["audioConfig"]["audioEncoding"], "MP3");
    }

    #[test]
    fn test_response_decodes_base64() {
        let body: SynthesizeResponse =
            serde_json::from_str(r#"{"audioContent": "bXAz"}"#).unwrap();
        assert_eq!(BASE64.decode(&body.audio_content).unwrap(), b"mp3");
    }
}
