//! Device credentials and process settings.
//!
//! The device profile is resolved once at startup, in this order:
//!
//! 1. **Device list file** - the first usable record in `devices.yaml`
//! 2. **Environment variables** - `DEVICE_TYPE`, `DEVICE_HOST`,
//!    `DEVICE_USERNAME`, `DEVICE_PASSWORD`
//!
//! Timeouts are resolved with a parameter -> env var -> default priority:
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `DEVICE_CONNECT_TIMEOUT` | 30s | Connection timeout in seconds |
//! | `DEVICE_COMMAND_TIMEOUT` | 60s | Command execution timeout in seconds |
//! | `OPENAI_MODEL` | gpt-4o-mini | Model driving the agent loop |
//!
//! A missing API key or unusable device profile is a fatal
//! [`AgentError::Configuration`]; no tool is constructed after that.

use std::env;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use super::error::AgentError;

/// Default SSH connection timeout in seconds
pub(crate) const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default remote command execution timeout in seconds
pub(crate) const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 60;

/// Default model driving the agent loop
pub(crate) const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Environment variable name for the connection timeout
pub(crate) const CONNECT_TIMEOUT_ENV_VAR: &str = "DEVICE_CONNECT_TIMEOUT";

/// Environment variable name for the command execution timeout
pub(crate) const COMMAND_TIMEOUT_ENV_VAR: &str = "DEVICE_COMMAND_TIMEOUT";

/// Environment variable name for the agent model
pub(crate) const MODEL_ENV_VAR: &str = "OPENAI_MODEL";

/// File name of the optional ordered device list
pub(crate) const DEVICE_LIST_FILE: &str = "devices.yaml";

/// Managed device families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    CiscoIos,
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceType::CiscoIos => write!(f, "cisco_ios"),
        }
    }
}

impl FromStr for DeviceType {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cisco_ios" => Ok(DeviceType::CiscoIos),
            other => Err(AgentError::configuration(format!(
                "unsupported device type: {}",
                other
            ))),
        }
    }
}

/// Connection parameters identifying and authenticating to one managed
/// device. Immutable for the process lifetime.
#[derive(Debug, Clone)]
pub struct DeviceProfile {
    pub device_type: DeviceType,
    pub host: String,
    pub username: String,
    pub password: String,
}

impl DeviceProfile {
    fn from_env() -> Result<Self, AgentError> {
        let device_type = env::var("DEVICE_TYPE").unwrap_or_else(|_| "cisco_ios".to_string());

        let mut missing = Vec::new();
        let host = non_empty_env("DEVICE_HOST", &mut missing);
        let username = non_empty_env("DEVICE_USERNAME", &mut missing);
        let password = non_empty_env("DEVICE_PASSWORD", &mut missing);

        if !missing.is_empty() {
            return Err(AgentError::configuration(format!(
                "missing device parameters: {}",
                missing.join(", ")
            )));
        }

        Ok(DeviceProfile {
            device_type: device_type.parse()?,
            host,
            username,
            password,
        })
    }
}

fn non_empty_env(name: &'static str, missing: &mut Vec<&'static str>) -> String {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => {
            missing.push(name);
            String::new()
        }
    }
}

/// Raw record of the `devices.yaml` list. Fields are optional so that an
/// incomplete record is skipped instead of failing the whole list.
#[derive(Debug, Deserialize)]
struct DeviceRecord {
    #[serde(default)]
    device_type: Option<String>,
    #[serde(default)]
    host: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

impl DeviceRecord {
    fn into_profile(self) -> Option<DeviceProfile> {
        let device_type = self.device_type?.parse().ok()?;
        let host = self.host.filter(|v| !v.trim().is_empty())?;
        let username = self.username.filter(|v| !v.trim().is_empty())?;
        let password = self.password.filter(|v| !v.trim().is_empty())?;
        Some(DeviceProfile {
            device_type,
            host,
            username,
            password,
        })
    }
}

/// Load the first usable record from a YAML device list, if the file
/// exists. A present but malformed file is a configuration error.
fn load_device_from_yaml(path: &Path) -> Result<Option<DeviceProfile>, AgentError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|e| {
        AgentError::configuration(format!("cannot read {}: {}", path.display(), e))
    })?;
    let records: Vec<DeviceRecord> = serde_yaml::from_str(&raw).map_err(|e| {
        AgentError::configuration(format!("malformed device list {}: {}", path.display(), e))
    })?;
    Ok(records.into_iter().find_map(DeviceRecord::into_profile))
}

pub(crate) fn load_device_profile(dir: &Path) -> Result<DeviceProfile, AgentError> {
    if let Some(profile) = load_device_from_yaml(&dir.join(DEVICE_LIST_FILE))? {
        return Ok(profile);
    }
    DeviceProfile::from_env()
}

/// Resolve the connection timeout value with priority: parameter -> env var -> default
pub(crate) fn resolve_connect_timeout(timeout_param: Option<u64>) -> u64 {
    if let Some(timeout) = timeout_param {
        return timeout;
    }

    if let Ok(env_timeout) = env::var(CONNECT_TIMEOUT_ENV_VAR)
        && let Ok(timeout) = env_timeout.parse::<u64>()
    {
        return timeout;
    }

    DEFAULT_CONNECT_TIMEOUT_SECS
}

/// Resolve the command execution timeout value with priority: parameter -> env var -> default
pub(crate) fn resolve_command_timeout(timeout_param: Option<u64>) -> u64 {
    if let Some(timeout) = timeout_param {
        return timeout;
    }

    if let Ok(env_timeout) = env::var(COMMAND_TIMEOUT_ENV_VAR)
        && let Ok(timeout) = env_timeout.parse::<u64>()
    {
        return timeout;
    }

    DEFAULT_COMMAND_TIMEOUT_SECS
}

/// Process-wide settings, loaded once and passed explicitly to the parts
/// that need them.
#[derive(Debug, Clone)]
pub struct Settings {
    pub device: DeviceProfile,
    pub openai_api_key: String,
    pub model: String,
    pub connect_timeout: Duration,
    pub command_timeout: Duration,
}

impl Settings {
    /// Load settings from the current working directory and environment.
    pub fn load() -> Result<Self, AgentError> {
        Self::load_from(Path::new("."))
    }

    /// Load settings, looking for the device list under `dir`.
    pub fn load_from(dir: &Path) -> Result<Self, AgentError> {
        let openai_api_key = env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                AgentError::configuration("OPENAI_API_KEY is not set in environment or .env file")
            })?;

        let device = load_device_profile(dir)?;

        Ok(Settings {
            device,
            openai_api_key,
            model: env::var(MODEL_ENV_VAR).unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            connect_timeout: Duration::from_secs(resolve_connect_timeout(None)),
            command_timeout: Duration::from_secs(resolve_command_timeout(None)),
        })
    }
}
