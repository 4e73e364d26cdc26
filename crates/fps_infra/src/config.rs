//! Runtime configuration: shared-memory root resolution, UI mode
//! selection, and the handful of numeric knobs an operator may override.
//!
//! Values are resolved with the same fail-closed discipline as the rest
//! of this stack: known knobs fall back to a compiled-in default: unknown
//! environment overrides (anything that fails to parse) are rejected
//! rather than silently ignored.

use std::env;
use std::fmt;
use std::path::PathBuf;

use fps_core::limits;

/// Tunable knobs an operator may override via environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKnob {
    ConfWaitUs,
    ConfwUpdateTimeoutUs,
    RunwaitTimeoutUs,
    KeyboardPollMs,
}

impl ConfigKnob {
    fn env_var(self) -> &'static str {
        match self {
            ConfigKnob::ConfWaitUs => "FPS_CONFWAITUS",
            ConfigKnob::ConfwUpdateTimeoutUs => "FPS_CONFWUPDATE_TIMEOUT_US",
            ConfigKnob::RunwaitTimeoutUs => "FPS_RUNWAIT_TIMEOUT_US",
            ConfigKnob::KeyboardPollMs => "FPS_KEYBOARD_POLL_MS",
        }
    }

    fn default_value(self) -> u64 {
        match self {
            ConfigKnob::ConfWaitUs => limits::DEFAULT_CONFWAITUS,
            ConfigKnob::ConfwUpdateTimeoutUs => limits::CONFWUPDATE_TIMEOUT_US,
            ConfigKnob::RunwaitTimeoutUs => limits::RUNWAIT_TIMEOUT_US,
            ConfigKnob::KeyboardPollMs => limits::KEYBOARD_POLL_MS,
        }
    }
}

/// Error resolving a configuration value from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub var: &'static str,
    pub reason: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error for {}: {}", self.var, self.reason)
    }
}

impl std::error::Error for ConfigError {}

/// Resolve one numeric knob: environment override if present and valid,
/// compiled-in default otherwise.
pub fn resolve_knob(knob: ConfigKnob) -> Result<u64, ConfigError> {
    match env::var(knob.env_var()) {
        Ok(raw) => raw.parse::<u64>().map_err(|_| ConfigError {
            var: knob.env_var(),
            reason: format!("'{raw}' is not a valid unsigned integer"),
        }),
        Err(env::VarError::NotPresent) => Ok(knob.default_value()),
        Err(env::VarError::NotUnicode(_)) => Err(ConfigError {
            var: knob.env_var(),
            reason: "value is not valid UTF-8".to_string(),
        }),
    }
}

/// Which renderer [`crate::ui`] should select, driven by `FPS_UI_MODE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiMode {
    Stdio,
    Silent,
}

/// Resolve the UI mode, defaulting to `Stdio` when unset or unrecognized
/// (never silently disables output an operator didn't ask to suppress).
pub fn resolve_ui_mode() -> UiMode {
    match env::var("FPS_UI_MODE").as_deref() {
        Ok("silent") => UiMode::Silent,
        _ => UiMode::Stdio,
    }
}

/// Resolve the shared-memory root directory from `MILK_SHM_DIR`, falling
/// back to `/milk/shm`. Fails closed if neither exists on disk: an FPS
/// backed by a missing root is a configuration error, not something to
/// paper over by creating directories implicitly.
pub fn resolve_shm_root() -> Result<PathBuf, ConfigError> {
    let root = match env::var("MILK_SHM_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(env::VarError::NotPresent) => PathBuf::from("/milk/shm"),
        Err(env::VarError::NotUnicode(_)) => {
            return Err(ConfigError {
                var: "MILK_SHM_DIR",
                reason: "value is not valid UTF-8".to_string(),
            });
        }
    };
    if !root.is_dir() {
        return Err(ConfigError {
            var: "MILK_SHM_DIR",
            reason: format!("shared-memory root {} does not exist", root.display()),
        });
    }
    Ok(root)
}
