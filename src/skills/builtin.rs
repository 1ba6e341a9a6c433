//! Built-in skills
//!
//! These ship compiled into the binary and sit at the front of the
//! dispatch order, before any manifest-discovered skills.

use chrono::Local;

use super::Skill;
use crate::config::{Language, LanguageSetting};
use crate::Result;

/// Answers clock questions ("what time is it", "what's the time")
pub struct ClockSkill;

impl Skill for ClockSkill {
    fn name(&self) -> &str {
        "clock"
    }

    fn handle(&self, command: &str) -> Result<Option<String>> {
        let is_time_question = command.contains("what time is it")
            || command.contains("what's the time")
            || command.contains("what is the time")
            || command == "time";

        if !is_time_question {
            return Ok(None);
        }

        let now = Local::now();
        Ok(Some(format!("It is {}, sir.", now.format("%-I:%M %p"))))
    }
}

/// Claims `gaming mode` for its setup side effect
///
/// The resolver speaks the fixed mode acknowledgment itself; this skill
/// only performs whatever gaming-specific preparation is wanted and logs
/// it. The reply is still returned so direct dispatch works too.
pub struct GamingSetupSkill;

impl Skill for GamingSetupSkill {
    fn name(&self) -> &str {
        "gaming-setup"
    }

    fn handle(&self, command: &str) -> Result<Option<String>> {
        if command != "gaming mode" {
            return Ok(None);
        }

        tracing::info!("gaming setup triggered");
        Ok(Some("Game environment ready, sir.".to_string()))
    }
}

/// Switches the process-wide reply language
///
/// Shares a [`LanguageSetting`] with the AI fallback and the listener's
/// transcription hints.
pub struct LanguageSkill {
    language: LanguageSetting,
}

impl LanguageSkill {
    /// Create a language skill bound to the shared setting
    #[must_use]
    pub fn new(language: LanguageSetting) -> Self {
        Self { language }
    }
}

impl Skill for LanguageSkill {
    fn name(&self) -> &str {
        "language"
    }

    fn handle(&self, command: &str) -> Result<Option<String>> {
        match command {
            "switch to hindi" => {
                self.language.set(Language::Hindi);
                Ok(Some("अब मैं हिंदी में बात करूँगा।".to_string()))
            }
            "switch to english" => {
                self.language.set(Language::English);
                Ok(Some("Switching back to English, sir.".to_string()))
            }
            _ => Ok(None),
        }
    }
}
