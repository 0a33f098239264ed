use crate::orchestrator::OrchestratorConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    #[serde(default = "default_max_reauth_attempts")]
    pub max_reauth_attempts: u32,
    /// Appended to the title of a duplicated form
    #[serde(default = "default_duplicate_title_suffix")]
    pub duplicate_title_suffix: String,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

fn default_settle_delay_ms() -> u64 {
    300
}

fn default_max_reauth_attempts() -> u32 {
    1
}

fn default_duplicate_title_suffix() -> String {
    " (Copy)".to_string()
}

fn default_http_timeout_secs() -> u64 {
    30
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: default_settle_delay_ms(),
            max_reauth_attempts: default_max_reauth_attempts(),
            duplicate_title_suffix: default_duplicate_title_suffix(),
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}

impl EngineConfig {
    pub fn orchestrator(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            max_reauth_attempts: self.max_reauth_attempts,
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

pub fn load_config(path: &PathBuf) -> anyhow::Result<EngineConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: EngineConfig = toml::from_str(&content)?;
    Ok(config)
}
