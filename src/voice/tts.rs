//! Text-to-speech (TTS) processing

use std::sync::Arc;

use async_trait::async_trait;

use crate::{Error, Result};

use super::{AudioOut, SpeechSink};

/// Synthesizes speech via an OpenAI-style `/audio/speech` endpoint and
/// plays it through the injected [`AudioOut`]
pub struct Speaker {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
    voice: String,
    speed: f64,
    out: Arc<dyn AudioOut>,
}

/// Request body for speech synthesis
#[derive(serde::Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    speed: f64,
    response_format: &'a str,
}

impl Speaker {
    /// Create a new speaker
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing
    pub fn new(
        api_base: String,
        api_key: String,
        model: String,
        voice: String,
        speed: f64,
        out: Arc<dyn AudioOut>,
    ) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config("API key required for TTS".to_string()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_base,
            api_key,
            model,
            voice,
            speed,
            out,
        })
    }

    /// Synthesize text to encoded audio bytes
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        tracing::debug!(chars = text.len(), "starting synthesis");

        let body = SpeechRequest {
            model: &self.model,
            input: text,
            voice: &self.voice,
            speed: self.speed,
            // WAV so the playback sink can stream it straight to ALSA
            response_format: "wav",
        };

        let response = self
            .client
            .post(format!("{}/audio/speech", self.api_base))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "TTS API error");
            return Err(Error::Tts(format!("TTS API error {status}")));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl SpeechSink for Speaker {
    async fn speak(&self, text: &str) {
        if text.trim().is_empty() {
            return;
        }

        tracing::debug!(text, "speaking");

        let audio = match self.synthesize(text).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(error = %e, "speech synthesis failed");
                return;
            }
        };

        if let Err(e) = self.out.play(&audio).await {
            tracing::error!(error = %e, "audio playback failed");
        }
    }
}
