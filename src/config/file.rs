//! TOML configuration file loading
//!
//! Supports `~/.config/valet/config.toml` as a persistent config source.
//! All fields are optional — the file is a partial overlay on top of defaults.

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct ValetConfigFile {
    /// Assistant display name (used in the persona prompt)
    #[serde(default)]
    pub assistant_name: Option<String>,

    /// Wake phrase (e.g. "valet")
    #[serde(default)]
    pub wake_word: Option<String>,

    /// Reply language ("en" or "hi")
    #[serde(default)]
    pub language: Option<String>,

    /// LLM configuration
    #[serde(default)]
    pub llm: LlmFileConfig,

    /// Voice/audio configuration
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// Skills configuration
    #[serde(default)]
    pub skills: SkillsFileConfig,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,
}

/// LLM-related configuration
#[derive(Debug, Default, Deserialize)]
pub struct LlmFileConfig {
    /// Model identifier (e.g. "gpt-4o-mini")
    pub model: Option<String>,

    /// API base URL for OpenAI-compatible endpoints
    pub api_base: Option<String>,
}

/// Voice-related configuration
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    /// Enable voice input
    pub enabled: Option<bool>,

    /// STT model (e.g. "whisper-1")
    pub stt_model: Option<String>,

    /// TTS model (e.g. "tts-1")
    pub tts_model: Option<String>,

    /// TTS voice identifier
    pub tts_voice: Option<String>,

    /// TTS speed multiplier
    pub tts_speed: Option<f64>,
}

/// Skills-related configuration
#[derive(Debug, Default, Deserialize)]
pub struct SkillsFileConfig {
    /// Extra directories to scan for skill manifests
    #[serde(default)]
    pub dirs: Vec<PathBuf>,
}

/// API keys
#[derive(Debug, Default, Deserialize)]
pub struct ApiKeysFileConfig {
    /// OpenAI-compatible API key
    pub openai: Option<String>,
}

impl ValetConfigFile {
    /// Load the config file if it exists, otherwise return defaults
    ///
    /// A missing file is not an error; a malformed file is.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed
    pub fn load() -> crate::Result<Self> {
        let Some(path) = Self::default_path() else {
            return Ok(Self::default());
        };

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let parsed: Self = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(parsed)
    }

    /// Default config file path: `~/.config/valet/config.toml`
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        directories::BaseDirs::new().map(|d| d.config_dir().join("valet").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_file() {
        let toml = r#"
            assistant_name = "Valet"
            wake_word = "valet"
            language = "hi"

            [llm]
            model = "gpt-4o-mini"

            [voice]
            enabled = true
            stt_model = "whisper-1"
            tts_voice = "onyx"

            [skills]
            dirs = ["/opt/valet/skills"]

            [api_keys]
            openai = "sk-test"
        "#;

        let parsed: ValetConfigFile = toml::from_str(toml).unwrap();
        assert_eq!(parsed.wake_word.as_deref(), Some("valet"));
        assert_eq!(parsed.language.as_deref(), Some("hi"));
        assert_eq!(parsed.llm.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(parsed.voice.enabled, Some(true));
        assert_eq!(parsed.skills.dirs.len(), 1);
        assert_eq!(parsed.api_keys.openai.as_deref(), Some("sk-test"));
    }

    #[test]
    fn parse_empty_file() {
        let parsed: ValetConfigFile = toml::from_str("").unwrap();
        assert!(parsed.wake_word.is_none());
        assert!(parsed.voice.enabled.is_none());
        assert!(parsed.skills.dirs.is_empty());
    }
}
