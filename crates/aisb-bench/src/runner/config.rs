//! Runner configuration
//!
//! All values are supplied at process start; nothing here is mutated at
//! runtime.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the evaluation runner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Directory holding the task catalog records
    pub catalog_dir: PathBuf,

    /// Root against which evaluator `code_path`s are resolved
    pub evaluators_root: PathBuf,

    /// Root for write-once evaluation log artifacts
    pub log_root: PathBuf,

    /// Execution timeout applied around each evaluator run, in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// How long a cancelled run may keep executing before a forced kill
    #[serde(default = "default_grace_period")]
    pub grace_period_secs: u64,
}

fn default_timeout() -> u64 {
    1800
}

fn default_grace_period() -> u64 {
    5
}

impl RunnerConfig {
    /// Create a config with the three required roots
    pub fn new(
        catalog_dir: impl Into<PathBuf>,
        evaluators_root: impl Into<PathBuf>,
        log_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            catalog_dir: catalog_dir.into(),
            evaluators_root: evaluators_root.into(),
            log_root: log_root.into(),
            timeout_secs: default_timeout(),
            grace_period_secs: default_grace_period(),
        }
    }

    /// Set the execution timeout
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the cancellation grace period
    pub fn with_grace_period(mut self, secs: u64) -> Self {
        self.grace_period_secs = secs;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn grace_period(&self) -> Duration {
        Duration::from_secs(self.grace_period_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RunnerConfig::new("/tasks", "/evaluators", "/logs");
        assert_eq!(config.timeout_secs, 1800);
        assert_eq!(config.grace_period_secs, 5);
    }

    #[test]
    fn test_builder() {
        let config = RunnerConfig::new("/tasks", "/evaluators", "/logs")
            .with_timeout(60)
            .with_grace_period(2);
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert_eq!(config.grace_period(), Duration::from_secs(2));
    }

    #[test]
    fn test_serde_defaults_applied() {
        let json = r#"{
            "catalog_dir": "/tasks",
            "evaluators_root": "/evaluators",
            "log_root": "/logs"
        }"#;
        let config: RunnerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.timeout_secs, 1800);
    }
}
