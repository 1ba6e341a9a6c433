//! Log/HUD sink
//!
//! The display surface is a collaborator: the core hands it log lines and
//! mode changes and never renders anything itself.

use std::sync::{Arc, Mutex};

use crate::resolve::Mode;

/// Display/log sink contract
pub trait Hud: Send + Sync {
    /// Append a line to the activity log
    fn log(&self, line: &str);

    /// Switch the display mode
    fn set_mode(&self, mode: Mode);
}

/// Tracing-backed HUD
///
/// Forwards log lines to `tracing` and remembers the current mode so
/// diagnostics (and tests) can read it back.
#[derive(Debug, Clone, Default)]
pub struct LogHud {
    mode: Arc<Mutex<Mode>>,
}

impl LogHud {
    /// Create a HUD in the default (normal) mode
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current display mode
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode.lock().map(|m| *m).unwrap_or_default()
    }
}

impl Hud for LogHud {
    fn log(&self, line: &str) {
        tracing::info!(target: "valet::hud", "{line}");
    }

    fn set_mode(&self, mode: Mode) {
        tracing::info!(target: "valet::hud", mode = %mode, "mode changed");
        if let Ok(mut guard) = self.mode.lock() {
            *guard = mode;
        }
    }
}
