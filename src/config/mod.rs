//! Configuration management for valet

pub mod file;

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use crate::{Error, Result};
use file::ValetConfigFile;

/// Default LLM model for the fallback stage
const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";

/// Default OpenAI-compatible API base
const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Valet configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Assistant display name, used in the persona prompt and spoken replies
    pub assistant_name: String,

    /// Wake phrase that activates the conversation gate
    pub wake_word: String,

    /// Reply language, shared between STT hints and the AI fallback
    pub language: LanguageSetting,

    /// Path to data directory (database, cache)
    pub data_dir: PathBuf,

    /// Voice configuration
    pub voice: VoiceConfig,

    /// LLM configuration
    pub llm: LlmConfig,

    /// Directories scanned for skill manifests
    pub skill_dirs: Vec<PathBuf>,

    /// API keys
    pub api_keys: ApiKeys,
}

/// Voice processing configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// Enable voice input
    pub enabled: bool,

    /// STT model (e.g. "whisper-1")
    pub stt_model: String,

    /// TTS model (e.g. "tts-1")
    pub tts_model: String,

    /// TTS voice identifier
    pub tts_voice: String,

    /// TTS speed multiplier (0.25 to 4.0)
    pub tts_speed: f64,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            stt_model: "whisper-1".to_string(),
            tts_model: "tts-1".to_string(),
            tts_voice: "onyx".to_string(),
            tts_speed: 1.0,
        }
    }
}

/// LLM fallback configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Model identifier for chat completions
    pub model: String,

    /// OpenAI-compatible API base URL
    pub api_base: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_LLM_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

/// API keys for external services
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    /// OpenAI-compatible API key (STT, TTS, completions)
    pub openai: Option<String>,
}

/// Reply language for STT hints and completion prompts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    /// English
    #[default]
    English,
    /// Hindi
    Hindi,
}

impl Language {
    /// BCP-47 code passed to the transcription service
    #[must_use]
    pub const fn stt_code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Hindi => "hi",
        }
    }

    /// Parse a config value ("en"/"hi"); unknown values default to English
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "hi" | "hindi" => Self::Hindi,
            _ => Self::English,
        }
    }
}

/// Process-wide mutable language setting
///
/// Written by the language-switch skill, read by the AI fallback and the
/// listener's transcription hints.
#[derive(Debug, Clone, Default)]
pub struct LanguageSetting {
    inner: Arc<RwLock<Language>>,
}

impl LanguageSetting {
    /// Create a setting with an initial language
    #[must_use]
    pub fn new(language: Language) -> Self {
        Self {
            inner: Arc::new(RwLock::new(language)),
        }
    }

    /// Current language
    #[must_use]
    pub fn get(&self) -> Language {
        self.inner.read().map(|g| *g).unwrap_or_default()
    }

    /// Switch the language
    pub fn set(&self, language: Language) {
        if let Ok(mut guard) = self.inner.write() {
            *guard = language;
        }
    }
}

impl Config {
    /// Load configuration: defaults, then TOML file, then environment
    ///
    /// # Errors
    ///
    /// Returns an error if the config file is malformed or the data
    /// directory cannot be created
    pub fn load() -> Result<Self> {
        Self::load_with_options(None, false)
    }

    /// Load configuration with CLI overrides
    ///
    /// # Errors
    ///
    /// Returns an error if the config file is malformed or the data
    /// directory cannot be created
    pub fn load_with_options(wake_word: Option<&str>, disable_voice: bool) -> Result<Self> {
        let fc = ValetConfigFile::load()?;

        let api_keys = ApiKeys {
            openai: std::env::var("OPENAI_API_KEY").ok().or(fc.api_keys.openai),
        };

        let data_dir = default_data_dir();
        std::fs::create_dir_all(&data_dir)?;

        let mut voice = VoiceConfig::default();
        if let Some(enabled) = fc.voice.enabled {
            voice.enabled = enabled;
        }
        if disable_voice {
            voice.enabled = false;
        }
        if let Some(m) = fc.voice.stt_model {
            voice.stt_model = m;
        }
        if let Some(m) = fc.voice.tts_model {
            voice.tts_model = m;
        }
        if let Some(v) = fc.voice.tts_voice {
            voice.tts_voice = v;
        }
        if let Some(s) = fc.voice.tts_speed {
            voice.tts_speed = s;
        }

        let llm = LlmConfig {
            model: std::env::var("VALET_LLM_MODEL")
                .ok()
                .or(fc.llm.model)
                .unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            api_base: std::env::var("VALET_API_BASE")
                .ok()
                .or(fc.llm.api_base)
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        };

        let mut skill_dirs = vec![default_skills_dir()];
        skill_dirs.extend(fc.skills.dirs);

        let language = LanguageSetting::new(
            fc.language
                .as_deref()
                .map(Language::parse)
                .unwrap_or_default(),
        );

        let config = Self {
            assistant_name: fc.assistant_name.unwrap_or_else(|| "Valet".to_string()),
            wake_word: wake_word
                .map(str::to_string)
                .or(fc.wake_word)
                .unwrap_or_else(|| "valet".to_string())
                .to_lowercase(),
            language,
            data_dir,
            voice,
            llm,
            skill_dirs,
            api_keys,
        };

        config.check_startup_preconditions()?;
        Ok(config)
    }

    /// Verify required credentials are present for the enabled surfaces
    ///
    /// The AI fallback and remote STT/TTS cannot run without a key, and a
    /// missing key at dispatch time would degrade every command to the
    /// apology sentinel. Failing here is the only fatal error category.
    fn check_startup_preconditions(&self) -> Result<()> {
        if self.api_keys.openai.is_none() {
            return Err(Error::Config(
                "OPENAI_API_KEY is required (env var or [api_keys] in config.toml)".to_string(),
            ));
        }
        Ok(())
    }
}

/// Default data directory: `~/.local/share/valet/`
#[must_use]
pub fn default_data_dir() -> PathBuf {
    directories::BaseDirs::new().map_or_else(
        || PathBuf::from(".local/share/valet"),
        |d| d.data_dir().join("valet"),
    )
}

/// Default skills directory: `~/.config/valet/skills/`
#[must_use]
pub fn default_skills_dir() -> PathBuf {
    directories::BaseDirs::new().map_or_else(
        || PathBuf::from(".config/valet/skills"),
        |d| d.config_dir().join("valet").join("skills"),
    )
}
