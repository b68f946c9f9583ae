//! Process-wide default settings, mergeable per handler instance.
//!
//! The globals live behind an [`ArcSwap`] so the execute path reads a
//! lock-free snapshot. Effective flags are resolved fresh on every
//! `execute` call from the global defaults merged with the instance patch,
//! so configuration changes between handler construction and execution take
//! effect.

use arc_swap::ArcSwap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Resolved settings governing the validation gates.
///
/// Logging is not part of this struct: the pipeline emits through the
/// `tracing` facade and the subscriber choice belongs to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Run the input validation stage. On by default.
    pub validate_input: bool,

    /// Run the output validation stage. On in debug builds, off in release.
    pub validate_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self { validate_input: true, validate_output: cfg!(debug_assertions) }
    }
}

impl Config {
    /// Returns a copy of `self` with the set fields of `patch` applied.
    pub fn apply(&self, patch: &ConfigPatch) -> Config {
        Config {
            validate_input: patch.validate_input.unwrap_or(self.validate_input),
            validate_output: patch.validate_output.unwrap_or(self.validate_output),
        }
    }
}

/// A partial [`Config`]: unset fields fall back to the value being patched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigPatch {
    pub validate_input: Option<bool>,
    pub validate_output: Option<bool>,
}

impl ConfigPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate_input(mut self, on: bool) -> Self {
        self.validate_input = Some(on);
        self
    }

    pub fn validate_output(mut self, on: bool) -> Self {
        self.validate_output = Some(on);
        self
    }
}

static GLOBAL_CONFIG: Lazy<ArcSwap<Config>> = Lazy::new(|| ArcSwap::from_pointee(Config::default()));

/// Merges `patch` into the process-wide defaults.
pub fn configure(patch: ConfigPatch) {
    let merged = GLOBAL_CONFIG.load().apply(&patch);
    GLOBAL_CONFIG.store(Arc::new(merged));
}

/// Returns a defensive copy of the process-wide defaults.
pub fn get_config() -> Config {
    GLOBAL_CONFIG.load().as_ref().clone()
}

/// Restores the hard-coded defaults. Test/reset utility.
pub fn reset_config() {
    GLOBAL_CONFIG.store(Arc::new(Config::default()));
}
