//! ALSA subprocess audio endpoints
//!
//! Microphone capture and playback delegated to `arecord`/`aplay` child
//! processes. Keeps the binary free of audio-device bindings while still
//! producing real WAV bytes for the transcription endpoint.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::{Error, Result};

use super::{AudioFeed, AudioOut};

/// Capture sample rate expected by the transcription endpoint
const SAMPLE_RATE: u32 = 16_000;

/// Extra grace on top of the capture window before the recorder is killed
const RECORD_GRACE: Duration = Duration::from_secs(2);

/// Microphone feed backed by an `arecord` child process
pub struct MicFeed;

#[async_trait]
impl AudioFeed for MicFeed {
    async fn record(&self, timeout: Duration, phrase_limit: Duration) -> Result<Option<Vec<u8>>> {
        let window = timeout + phrase_limit;
        let seconds = window.as_secs().max(1);

        let child = Command::new("arecord")
            .arg("-q")
            .args(["-f", "S16_LE"])
            .args(["-r", &SAMPLE_RATE.to_string()])
            .args(["-c", "1"])
            .args(["-t", "wav"])
            .args(["-d", &seconds.to_string()])
            .arg("-")
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::Stt(format!("failed to start arecord: {e}")))?;

        let output = match tokio::time::timeout(window + RECORD_GRACE, child.wait_with_output())
            .await
        {
            Ok(result) => result?,
            Err(_) => {
                tracing::warn!("recorder did not finish within its window");
                return Ok(None);
            }
        };

        if !output.status.success() {
            return Err(Error::Stt(format!(
                "arecord exited with {}",
                output.status
            )));
        }

        // A bare WAV header with no frames means the device produced nothing.
        if output.stdout.len() <= 44 {
            return Ok(None);
        }

        Ok(Some(output.stdout))
    }
}

/// Playback sink backed by an `aplay` child process
pub struct SpeakerOut;

#[async_trait]
impl AudioOut for SpeakerOut {
    async fn play(&self, audio: &[u8]) -> Result<()> {
        let mut child = Command::new("aplay")
            .arg("-q")
            .args(["-t", "wav"])
            .arg("-")
            .stdin(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::Tts(format!("failed to start aplay: {e}")))?;

        if let Some(stdin) = child.stdin.as_mut() {
            stdin.write_all(audio).await?;
            stdin.shutdown().await?;
        }

        let status = child.wait().await?;
        if !status.success() {
            return Err(Error::Tts(format!("aplay exited with {status}")));
        }

        Ok(())
    }
}
