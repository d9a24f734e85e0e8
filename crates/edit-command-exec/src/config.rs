//! Executor configuration.

use serde::{Deserialize, Serialize};

/// Knobs shared by the batch and interactive executors.
///
/// Missing fields take their defaults when loading from JSON:
///
/// ```rust
/// use edit_command_exec::ExecutorConfig;
///
/// let config = ExecutorConfig::from_json(r#"{ "batch_choose_first": false }"#).unwrap();
/// assert!(!config.batch_choose_first);
/// assert!(config.translate_sessions);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// In batch mode, resolve a choose-one step with its first action. Otherwise the step
    /// makes the result INTERACTIVE.
    pub batch_choose_first: bool,
    /// In batch mode, accept default selections and default options where allowed.
    pub batch_accept_defaults: bool,
    /// In interactive mode, move session carets, selections and highlights through applied
    /// text updates.
    pub translate_sessions: bool,
    /// Merge adjacent text updates of the same file before executing.
    pub merge_adjacent_updates: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            batch_choose_first: true,
            batch_accept_defaults: true,
            translate_sessions: true,
            merge_adjacent_updates: true,
        }
    }
}

impl ExecutorConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
