use crate::action::Action;
use crate::error::{ActionError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.yaml";

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_command_timeout() -> u64 {
    300
}

/// Daemon configuration, loaded once at startup.
///
/// Unknown top-level keys are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Shared secret every request must present in `X-Auth-Token`.
    pub token: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Upper bound on a single `runcommand` invocation.
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,
    #[serde(default)]
    pub items: Vec<Action>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| ActionError::ConfigLoad(format!("{}: {e}", path.display())))?;
        Self::parse(&data).map_err(|e| {
            let reason = match e {
                ActionError::ConfigLoad(msg) => msg,
                other => other.to_string(),
            };
            ActionError::ConfigLoad(format!("{}: {reason}", path.display()))
        })
    }

    pub fn parse(data: &str) -> Result<Self> {
        let cfg: Config = serde_yaml::from_str(data)?;
        if cfg.token.is_empty() {
            return Err(ActionError::ConfigLoad("token must not be empty".into()));
        }
        if cfg.command_timeout_secs == 0 {
            return Err(ActionError::ConfigLoad(
                "command_timeout_secs must be at least 1".into(),
            ));
        }
        Ok(cfg)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// `config.yaml` next to the running executable.
pub fn default_config_path() -> PathBuf {
    exe_dir().join(CONFIG_FILE)
}

/// Directory containing the running executable, or `.` if unknown.
pub fn exe_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}
