//! Layered settings.
//!
//! # Sources (lowest precedence first)
//!
//! ```text
//! <dir>/recruiter.yaml                  base settings (optional)
//! <dir>/recruiter.<environment>.yaml    per-environment overrides (optional)
//! RECRUITER_AZURE_AI__<FIELD>           environment variables
//! <home>/.recruiter/secrets.yaml        user secrets, e.g. the bearer token (optional)
//! ```
//!
//! Layers are merged field by field: a later layer that sets only
//! `azure_ai.token` keeps the endpoint from an earlier one.
//!
//! # API pattern
//!
//! `load_at(dir, home, lookup)` takes every input explicitly and is what tests
//! call. `load()` derives them from the process (cwd, `dirs::home_dir()`,
//! `std::env::var`) and delegates.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{io_err, ConfigError};

pub const DEFAULT_API_VERSION: &str = "2025-05-01";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
pub const DEFAULT_RUN_TIMEOUT_SECS: u64 = 120;

pub const ENVIRONMENT_VAR: &str = "RECRUITER_ENVIRONMENT";
pub const DEFAULT_ENVIRONMENT: &str = "development";

const ENV_ENDPOINT: &str = "RECRUITER_AZURE_AI__ENDPOINT";
const ENV_AGENT_ID: &str = "RECRUITER_AZURE_AI__AGENT_ID";
const ENV_API_VERSION: &str = "RECRUITER_AZURE_AI__API_VERSION";
const ENV_TOKEN: &str = "RECRUITER_AZURE_AI__TOKEN";
const ENV_POLL_INTERVAL: &str = "RECRUITER_AZURE_AI__POLL_INTERVAL_MS";
const ENV_RUN_TIMEOUT: &str = "RECRUITER_AZURE_AI__RUN_TIMEOUT_SECS";

// ---------------------------------------------------------------------------
// Resolved settings
// ---------------------------------------------------------------------------

/// Fully merged settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub azure_ai: AzureAiOptions,
}

/// Connection options for the Azure AI Foundry agents service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AzureAiOptions {
    pub endpoint: String,
    pub agent_id: String,
    pub api_version: String,
    #[serde(skip_serializing)]
    pub token: Option<String>,
    pub poll_interval_ms: u64,
    pub run_timeout_secs: u64,
}

impl Default for AzureAiOptions {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            agent_id: String::new(),
            api_version: DEFAULT_API_VERSION.to_string(),
            token: None,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            run_timeout_secs: DEFAULT_RUN_TIMEOUT_SECS,
        }
    }
}

impl AzureAiOptions {
    /// Check that the endpoint is an absolute URL and an agent id is set.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_endpoint()?;
        if self.agent_id.trim().is_empty() {
            return Err(ConfigError::MissingField {
                key: "azure_ai.agent_id",
            });
        }
        Ok(())
    }

    /// Endpoint-only check, for administration calls that create their own agent.
    pub fn validate_endpoint(&self) -> Result<(), ConfigError> {
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::MissingField {
                key: "azure_ai.endpoint",
            });
        }
        Url::parse(self.endpoint.trim()).map_err(|e| ConfigError::InvalidEndpoint {
            value: self.endpoint.clone(),
            reason: e.to_string(),
        })?;
        Ok(())
    }

    /// The bearer token, required only once a remote call is about to be made.
    pub fn require_token(&self) -> Result<&str, ConfigError> {
        match self.token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(ConfigError::MissingField {
                key: "azure_ai.token",
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Partial layers
// ---------------------------------------------------------------------------

/// One settings source before merging; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SettingsLayer {
    #[serde(default)]
    pub azure_ai: Option<AzureAiLayer>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AzureAiLayer {
    pub endpoint: Option<String>,
    pub agent_id: Option<String>,
    pub api_version: Option<String>,
    pub token: Option<String>,
    pub poll_interval_ms: Option<u64>,
    pub run_timeout_secs: Option<u64>,
}

impl SettingsLayer {
    fn apply(self, settings: &mut Settings) {
        let Some(layer) = self.azure_ai else { return };
        let target = &mut settings.azure_ai;
        if let Some(v) = layer.endpoint {
            target.endpoint = v;
        }
        if let Some(v) = layer.agent_id {
            target.agent_id = v;
        }
        if let Some(v) = layer.api_version {
            target.api_version = v;
        }
        if let Some(v) = layer.token {
            target.token = Some(v);
        }
        if let Some(v) = layer.poll_interval_ms {
            target.poll_interval_ms = v;
        }
        if let Some(v) = layer.run_timeout_secs {
            target.run_timeout_secs = v;
        }
    }
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// `<dir>/recruiter.yaml`
pub fn base_path_at(dir: &Path) -> PathBuf {
    dir.join("recruiter.yaml")
}

/// `<dir>/recruiter.<environment>.yaml`
pub fn environment_path_at(dir: &Path, environment: &str) -> PathBuf {
    dir.join(format!("recruiter.{environment}.yaml"))
}

/// `<home>/.recruiter/secrets.yaml`
pub fn secrets_path_at(home: &Path) -> PathBuf {
    home.join(".recruiter").join("secrets.yaml")
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Read one YAML layer. A missing file is `Ok(None)`; an empty file is an
/// empty layer.
pub fn read_layer(path: &Path) -> Result<Option<SettingsLayer>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    if contents.trim().is_empty() {
        return Ok(Some(SettingsLayer::default()));
    }
    serde_yaml::from_str(&contents)
        .map(Some)
        .map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Build the environment-variable layer from `lookup`.
pub fn env_layer(lookup: &dyn Fn(&str) -> Option<String>) -> Result<SettingsLayer, ConfigError> {
    let parse_u64 = |var: &str| -> Result<Option<u64>, ConfigError> {
        match lookup(var) {
            None => Ok(None),
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Some)
                .map_err(|_| ConfigError::InvalidValue {
                    var: var.to_string(),
                    value: raw,
                }),
        }
    };

    let layer = AzureAiLayer {
        endpoint: lookup(ENV_ENDPOINT),
        agent_id: lookup(ENV_AGENT_ID),
        api_version: lookup(ENV_API_VERSION),
        token: lookup(ENV_TOKEN),
        poll_interval_ms: parse_u64(ENV_POLL_INTERVAL)?,
        run_timeout_secs: parse_u64(ENV_RUN_TIMEOUT)?,
    };
    if layer == AzureAiLayer::default() {
        return Ok(SettingsLayer::default());
    }
    Ok(SettingsLayer {
        azure_ai: Some(layer),
    })
}

/// Merge every layer found under `dir` / `home` plus the environment.
///
/// Does not validate; call [`AzureAiOptions::validate`] once the caller knows which
/// fields it needs.
pub fn load_at(
    dir: &Path,
    home: Option<&Path>,
    lookup: &dyn Fn(&str) -> Option<String>,
) -> Result<Settings, ConfigError> {
    let environment = lookup(ENVIRONMENT_VAR)
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string());

    let mut settings = Settings {
        azure_ai: AzureAiOptions::default(),
    };

    for path in [base_path_at(dir), environment_path_at(dir, environment.trim())] {
        if let Some(layer) = read_layer(&path)? {
            layer.apply(&mut settings);
        }
    }

    env_layer(lookup)?.apply(&mut settings);

    if let Some(home) = home {
        if let Some(layer) = read_layer(&secrets_path_at(home))? {
            layer.apply(&mut settings);
        }
    }
    Ok(settings)
}

/// `load_at` convenience wrapper using the current directory, the user's home
/// directory and the process environment.
pub fn load() -> Result<Settings, ConfigError> {
    let cwd = std::env::current_dir().map_err(|e| io_err(".", e))?;
    let home = dirs::home_dir();
    load_at(&cwd, home.as_deref(), &|var| std::env::var(var).ok())
}
