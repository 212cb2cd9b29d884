//! Agent configuration and resolution.
//!
//! Resolution order for every setting: CLI flag > environment variable >
//! config file > built-in default. Environment fallbacks are declared on
//! the CLI flags themselves (clap `env` attributes), so by the time values
//! reach this module the first two layers are already collapsed into
//! [`ConfigOverrides`].
//!
//! The merged [`AgentConfig`] is constructed once per invocation and passed
//! by reference into the lifecycle manager. Core logic never reads flags or
//! the environment ambiently.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Default installation directory for the agent jar.
pub const DEFAULT_DEST_DIR: &str = "/opt/splunk-java-agent";

/// Version sentinel that triggers release-metadata resolution.
pub const LATEST_VERSION: &str = "latest";

/// File name of the config file looked up in the home directory.
const DEFAULT_CONFIG_FILE: &str = ".oam.yaml";

/// Fully resolved configuration for one lifecycle operation.
///
/// `access_token`, `otlp_endpoint`, `java_home`, and `service_name` are
/// pass-through metadata recorded in operation results; the manager's own
/// logic never consults them.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Directory the agent jar is installed into.
    pub dest_dir: PathBuf,
    /// Backup directory; defaults to `<dest_dir>/backup` at manager
    /// construction when unset.
    pub backup_dir: Option<PathBuf>,
    /// Requested agent version, `"latest"` or explicit.
    pub agent_version: String,
    /// Splunk access token.
    pub access_token: Option<String>,
    /// OTLP endpoint URL.
    pub otlp_endpoint: Option<String>,
    /// Keep backup files after uninstall.
    pub keep_backup: bool,
    /// Java home directory.
    pub java_home: Option<String>,
    /// Logical service name for the instrumented application.
    pub service_name: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        AgentConfig::resolve(ConfigOverrides::default(), FileConfig::default())
    }
}

impl AgentConfig {
    /// Merge CLI/env overrides, config-file settings, and built-in defaults.
    pub fn resolve(overrides: ConfigOverrides, file: FileConfig) -> Self {
        AgentConfig {
            dest_dir: overrides
                .dest_dir
                .or(file.dest_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DEST_DIR)),
            backup_dir: overrides.backup_dir.or(file.backup_dir),
            agent_version: overrides
                .agent_version
                .or(file.agent_version)
                .unwrap_or_else(|| LATEST_VERSION.to_string()),
            access_token: overrides.access_token.or(file.access_token),
            otlp_endpoint: overrides.otlp_endpoint.or(file.otlp_endpoint),
            keep_backup: overrides.keep_backup.or(file.keep_backup).unwrap_or(true),
            java_home: overrides.java_home.or(file.java_home),
            service_name: overrides.service_name.or(file.service_name),
        }
    }
}

/// Settings supplied on the command line or via environment variables.
/// Highest precedence; every field optional.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub dest_dir: Option<PathBuf>,
    pub backup_dir: Option<PathBuf>,
    pub agent_version: Option<String>,
    pub access_token: Option<String>,
    pub otlp_endpoint: Option<String>,
    pub keep_backup: Option<bool>,
    pub java_home: Option<String>,
    pub service_name: Option<String>,
}

/// On-disk configuration file contents (YAML).
///
/// Unknown keys are ignored so a shared config file can carry settings for
/// other tooling.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub dest_dir: Option<PathBuf>,
    pub backup_dir: Option<PathBuf>,
    pub agent_version: Option<String>,
    pub access_token: Option<String>,
    pub otlp_endpoint: Option<String>,
    pub keep_backup: Option<bool>,
    pub java_home: Option<String>,
    pub service_name: Option<String>,
}

impl FileConfig {
    /// Default config file location (`~/.oam.yaml`).
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(DEFAULT_CONFIG_FILE))
    }

    /// Load from an explicit path. The file must exist and parse.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        serde_yaml::from_str(&content)
            .map_err(|e| Error::Config(format!("invalid config file {}: {e}", path.display())))
    }

    /// Load from the default location. A missing file is a normal
    /// zero-config condition, not an error.
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(FileConfig::default()),
        }
    }
}
