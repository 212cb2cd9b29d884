//! Artifact retrieval.
//!
//! Downloads the agent jar for a concrete version and writes it to a
//! destination path, overwriting any existing file. A single attempt is
//! made; retrying is deliberately left to the operator.

use oam_common::{Error, Result};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::AGENT_JAR_NAME;

/// Base URL the versioned download path is appended to.
const DOWNLOAD_URL_BASE: &str =
    "https://github.com/signalfx/splunk-otel-java/releases/download";

/// Request timeout for artifact downloads, so a stalled transfer cannot
/// block the invocation indefinitely.
const FETCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Downloads the agent artifact for a concrete version.
pub struct ArtifactFetcher {
    base_url: String,
    user_agent: String,
}

impl ArtifactFetcher {
    pub fn new() -> Self {
        Self::with_base_url(DOWNLOAD_URL_BASE)
    }

    /// Create a fetcher downloading from a custom base URL (tests point
    /// this at a local fixture server).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        ArtifactFetcher {
            base_url: base_url.into(),
            user_agent: format!("oam/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Fully qualified download URL for `version`.
    pub fn download_url(&self, version: &str) -> String {
        format!(
            "{}/v{}/{}",
            self.base_url.trim_end_matches('/'),
            version,
            AGENT_JAR_NAME
        )
    }

    /// Download the artifact for `version` and write it to `dest`,
    /// overwriting any existing file. Missing parent directories of `dest`
    /// are created first.
    pub fn fetch(&self, version: &str, dest: &Path) -> Result<()> {
        let url = self.download_url(version);
        info!(url = %url, dest = %dest.display(), "downloading agent");

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::fs(parent, e))?;
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| Error::Fetch(e.to_string()))?;

        let response = client
            .get(&url)
            .header("User-Agent", &self.user_agent)
            .send()
            .map_err(|e| Error::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::FetchStatus {
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().map_err(|e| Error::Fetch(e.to_string()))?;
        fs::write(dest, &bytes).map_err(|e| Error::fs(dest, e))?;

        Ok(())
    }
}

impl Default for ArtifactFetcher {
    fn default() -> Self {
        Self::new()
    }
}
