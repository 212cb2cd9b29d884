//! Lifecycle orchestration for the managed agent artifact.
//!
//! The manager has no persistent internal state; each operation is a
//! short-lived transaction over the filesystem, re-reading its state
//! directly. Every operation returns exactly one [`OperationResult`],
//! which is also the only document printed per invocation.
//!
//! Pre-operation backups are best-effort: a failure there is logged as a
//! warning and never blocks the operation the user actually asked for.

use oam_common::{AgentConfig, Error, ErrorCategory};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::backup::BackupStore;
use crate::fetch::ArtifactFetcher;
use crate::resolver::VersionResolver;
use crate::AGENT_JAR_NAME;

/// Outcome record produced once per lifecycle operation.
///
/// Optional fields are omitted from the serialized document when empty.
#[derive(Debug, Clone, Serialize)]
pub struct OperationResult {
    pub success: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
    pub operation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Category of the fatal error, when one aborted the operation. Not
    /// part of the serialized document; the CLI maps it to an exit code.
    #[serde(skip)]
    failure: Option<ErrorCategory>,
}

impl OperationResult {
    fn new(operation: &str) -> Self {
        OperationResult {
            success: false,
            message: String::new(),
            operation: operation.to_string(),
            version: None,
            path: None,
            backup_path: None,
            details: BTreeMap::new(),
            error: None,
            failure: None,
        }
    }

    fn fail(mut self, context: &str, err: Error) -> Self {
        self.success = false;
        self.error = Some(format!("{context}: {err}"));
        self.failure = Some(err.category());
        self
    }

    /// Category of the fatal error that aborted the operation, if any.
    pub fn failure_category(&self) -> Option<ErrorCategory> {
        self.failure
    }
}

/// Orchestrates install, uninstall, rollback, and upgrade of the agent jar.
pub struct AgentManager {
    config: AgentConfig,
    resolver: VersionResolver,
    fetcher: ArtifactFetcher,
    backups: BackupStore,
}

impl AgentManager {
    /// Create a manager talking to the real release endpoints.
    pub fn new(config: AgentConfig) -> Self {
        Self::with_sources(config, VersionResolver::new(), ArtifactFetcher::new())
    }

    /// Create a manager with explicit resolver and fetcher (tests point
    /// these at a local fixture server).
    pub fn with_sources(
        mut config: AgentConfig,
        resolver: VersionResolver,
        fetcher: ArtifactFetcher,
    ) -> Self {
        // Default the backup directory under the destination.
        let default_dir = config.dest_dir.join("backup");
        let backup_dir = config.backup_dir.get_or_insert(default_dir).clone();

        AgentManager {
            config,
            resolver,
            fetcher,
            backups: BackupStore::new(backup_dir),
        }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Path of the managed artifact inside the destination directory.
    pub fn artifact_path(&self) -> PathBuf {
        self.config.dest_dir.join(AGENT_JAR_NAME)
    }

    /// Download and install the agent jar, backing up any existing one
    /// first.
    pub fn install(&self) -> OperationResult {
        info!(
            version = %self.config.agent_version,
            dest_dir = %self.config.dest_dir.display(),
            "starting agent installation"
        );

        let mut result = OperationResult::new("install");
        result.version = Some(self.config.agent_version.clone());

        if let Err(err) = fs::create_dir_all(&self.config.dest_dir) {
            let err = Error::fs(&self.config.dest_dir, err);
            return result.fail("failed to create destination directory", err);
        }

        let version = match self.resolver.resolve(&self.config.agent_version) {
            Ok(version) => version,
            Err(err) => return result.fail("failed to resolve agent version", err),
        };
        result.version = Some(version.clone());

        let artifact_path = self.artifact_path();
        if artifact_path.exists() {
            if let Err(err) = self.backups.create_backup(&artifact_path) {
                warn!(error = %err, "failed to back up existing agent before install");
            }
        }

        if let Err(err) = self.fetcher.fetch(&version, &artifact_path) {
            return result.fail("failed to download agent", err);
        }

        result.success = true;
        result.message = format!("Successfully installed Java agent version {version}");
        result.path = Some(artifact_path.clone());
        result
            .details
            .insert("download_url".into(), json!(self.fetcher.download_url(&version)));
        if let Some(java_home) = &self.config.java_home {
            result.details.insert("java_home".into(), json!(java_home));
        }
        if let Some(service_name) = &self.config.service_name {
            result
                .details
                .insert("service_name".into(), json!(service_name));
        }

        info!(
            version = %version,
            path = %artifact_path.display(),
            "agent installation completed"
        );
        result
    }

    /// Remove the agent jar. Removing an absent artifact is a success,
    /// not an error.
    pub fn uninstall(&self) -> OperationResult {
        info!("starting agent uninstallation");

        let mut result = OperationResult::new("uninstall");
        let artifact_path = self.artifact_path();

        if !artifact_path.exists() {
            result.success = true;
            result.message = "Java agent is not installed".to_string();
            return result;
        }

        if self.config.keep_backup {
            if let Err(err) = self.backups.create_backup(&artifact_path) {
                warn!(error = %err, "failed to back up agent before uninstall");
            }
        }

        if let Err(err) = fs::remove_file(&artifact_path) {
            let err = Error::fs(&artifact_path, err);
            return result.fail("failed to remove agent", err);
        }

        result.success = true;
        result.message = "Successfully uninstalled Java agent".to_string();
        result.path = Some(artifact_path);

        // The uninstall itself has already succeeded; losing the purge is
        // only worth a warning.
        if !self.config.keep_backup {
            if let Err(err) = self.backups.purge_all() {
                warn!(error = %err, "failed to remove backup directory after uninstall");
            }
        }

        info!("agent uninstallation completed");
        result
    }

    /// Restore the most recent backup over the destination.
    pub fn rollback(&self) -> OperationResult {
        info!("starting agent rollback");

        let mut result = OperationResult::new("rollback");
        let artifact_path = self.artifact_path();

        let backup_path = match self.backups.latest_backup() {
            Ok(Some(path)) => path,
            Ok(None) => return result.fail("rollback not possible", Error::NoBackup),
            Err(err) => return result.fail("failed to inspect backup history", err),
        };

        if artifact_path.exists() {
            if let Err(err) = self.backups.create_backup(&artifact_path) {
                warn!(error = %err, "failed to back up current agent before rollback");
            }
        }

        if let Err(err) = fs::copy(&backup_path, &artifact_path) {
            let err = Error::fs(&artifact_path, err);
            return result.fail("failed to restore from backup", err);
        }

        result.success = true;
        result.message = "Successfully rolled back Java agent".to_string();
        result.path = Some(artifact_path);
        result.backup_path = Some(backup_path.clone());

        info!(backup_path = %backup_path.display(), "agent rollback completed");
        result
    }

    /// Upgrade the agent to the requested version.
    ///
    /// Identical to install: the backup-before-overwrite step inside
    /// install is the upgrade safety net, so there is no separate code
    /// path.
    pub fn upgrade(&self) -> OperationResult {
        info!(version = %self.config.agent_version, "starting agent upgrade");
        self.install()
    }
}
