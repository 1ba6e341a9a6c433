//! Speech-to-text (STT) processing

use std::sync::Arc;

use async_trait::async_trait;

use super::{AudioFeed, CaptureOpts, CaptureOutcome, Transcriber};
use crate::{Error, Result};

/// Response from a Whisper-style transcription API
#[derive(serde::Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Transcribes captured audio via a Whisper-style HTTP API
///
/// Audio bytes come from the injected [`AudioFeed`]; this type owns only
/// the network half of a capture attempt and the mapping of failures onto
/// [`CaptureOutcome`] variants.
pub struct RemoteTranscriber {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
    feed: Arc<dyn AudioFeed>,
}

impl RemoteTranscriber {
    /// Create a new transcriber
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing
    pub fn new(
        api_base: String,
        api_key: String,
        model: String,
        feed: Arc<dyn AudioFeed>,
    ) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "API key required for transcription".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_base,
            api_key,
            model,
            feed,
        })
    }

    /// Transcribe WAV audio bytes to text
    async fn transcribe(&self, audio: Vec<u8>, language: &str) -> Result<String> {
        tracing::debug!(audio_bytes = audio.len(), "starting transcription");

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(audio)
                    .file_name("audio.wav")
                    .mime_str("audio/wav")
                    .map_err(|e| Error::Stt(e.to_string()))?,
            )
            .text("model", self.model.clone())
            .text("language", language.to_string());

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.api_base))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "transcription API error");
            return Err(Error::Stt(format!("transcription API error {status}")));
        }

        let result: TranscriptionResponse = response.json().await?;
        tracing::debug!(transcript = %result.text, "transcription complete");
        Ok(result.text)
    }
}

#[async_trait]
impl Transcriber for RemoteTranscriber {
    async fn capture(&self, opts: CaptureOpts) -> CaptureOutcome {
        let audio = match self.feed.record(opts.timeout, opts.phrase_limit).await {
            Ok(Some(bytes)) if !bytes.is_empty() => bytes,
            Ok(_) => return CaptureOutcome::Timeout,
            Err(e) => {
                tracing::warn!(error = %e, "audio capture failed");
                return CaptureOutcome::RecognitionFailed;
            }
        };

        match self.transcribe(audio, opts.language).await {
            Ok(text) => {
                let text = text.trim().to_string();
                if text.is_empty() {
                    CaptureOutcome::NoSpeech
                } else {
                    CaptureOutcome::Text(text)
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "transcription failed");
                CaptureOutcome::RecognitionFailed
            }
        }
    }
}
