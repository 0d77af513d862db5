//! Migration runner behaviour.

use lats_core::SplitMode;
use serde::{Deserialize, Serialize};

/// Default statement preview length in log lines.
const fn default_preview_chars() -> usize {
    160
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunnerConfig {
    /// How SQL text is cut into statements.
    #[serde(default)]
    pub split_mode: SplitMode,

    /// Stop at the first failing statement instead of continuing.
    #[serde(default)]
    pub stop_on_error: bool,

    /// Maximum characters of a statement shown in logs and console output.
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            split_mode: SplitMode::default(),
            stop_on_error: false,
            preview_chars: default_preview_chars(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = RunnerConfig::default();
        assert_eq!(config.split_mode, SplitMode::Naive);
        assert!(!config.stop_on_error);
        assert_eq!(config.preview_chars, 160);
    }
}
