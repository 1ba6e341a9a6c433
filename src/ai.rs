//! AI fallback — the resolver's last resort
//!
//! A single-turn chat completion against an OpenAI-compatible endpoint.
//! The contract is infallible: any transport or API failure is logged and
//! collapses to a fixed apology sentinel, so the resolver can promise that
//! every command produces *some* spoken reply.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{Language, LanguageSetting, LlmConfig};
use crate::{Error, Result};

/// Spoken when the completion service fails for any reason
pub const FALLBACK_SENTINEL: &str = "AI error, sir.";

/// Sampling temperature for fallback completions
const TEMPERATURE: f64 = 0.4;

/// Output cap for fallback completions
const MAX_TOKENS: u32 = 300;

/// Bound on the blocking window for the single dispatcher task
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Language-model completion backend
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Complete a prompt; never fails, always returns some string
    async fn complete(&self, prompt: &str) -> String;
}

/// OpenAI-compatible chat-completion client
pub struct AiFallback {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
    assistant_name: String,
    language: LanguageSetting,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

impl AiFallback {
    /// Create a new fallback client
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing or the HTTP client cannot
    /// be built
    pub fn new(
        llm: &LlmConfig,
        api_key: String,
        assistant_name: String,
        language: LanguageSetting,
    ) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "API key required for AI fallback".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            api_base: llm.api_base.clone(),
            api_key,
            model: llm.model.clone(),
            assistant_name,
            language,
        })
    }

    /// System instruction fixing persona and reply language
    fn system_prompt(&self) -> String {
        let name = &self.assistant_name;
        match self.language.get() {
            Language::English => {
                format!("You are {name}, concise and professional.")
            }
            Language::Hindi => format!(
                "You are {name}. Reply in Hindi (Devanagari script). Be concise and professional."
            ),
        }
    }

    async fn request(&self, prompt: &str) -> Result<String> {
        let system = self.system_prompt();
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "completion API error");
            return Err(Error::Completion(format!("completion API error {status}")));
        }

        let parsed: ChatResponse = response.json().await?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::Completion("empty completion response".to_string()))?;

        Ok(text.trim().to_string())
    }
}

#[async_trait]
impl CompletionBackend for AiFallback {
    async fn complete(&self, prompt: &str) -> String {
        match self.request(prompt).await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => {
                tracing::warn!("completion returned empty text");
                FALLBACK_SENTINEL.to_string()
            }
            Err(e) => {
                tracing::error!(error = %e, "completion failed");
                FALLBACK_SENTINEL.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_key_is_rejected() {
        let result = AiFallback::new(
            &LlmConfig::default(),
            String::new(),
            "Valet".to_string(),
            LanguageSetting::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn system_prompt_follows_language_setting() {
        let language = LanguageSetting::default();
        let ai = AiFallback::new(
            &LlmConfig::default(),
            "sk-test".to_string(),
            "Valet".to_string(),
            language.clone(),
        )
        .unwrap();

        assert!(ai.system_prompt().contains("concise and professional"));
        assert!(!ai.system_prompt().contains("Hindi"));

        language.set(Language::Hindi);
        assert!(ai.system_prompt().contains("Hindi"));
    }
}
