//! Symbolic version resolution.
//!
//! Turns a requested version into a concrete one. Only the sentinel
//! `"latest"` touches the network; anything else resolves to itself.

use oam_common::config::LATEST_VERSION;
use oam_common::{Error, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Release-metadata endpoint for the Splunk OTel Java agent.
const LATEST_RELEASE_URL: &str =
    "https://api.github.com/repos/signalfx/splunk-otel-java/releases/latest";

/// Request timeout for release-metadata lookups.
const RESOLVE_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Deserialize)]
struct ReleaseMetadata {
    #[serde(default)]
    tag_name: String,
}

/// Resolves symbolic version requests against a release-metadata endpoint.
pub struct VersionResolver {
    endpoint: String,
    user_agent: String,
}

impl VersionResolver {
    pub fn new() -> Self {
        Self::with_endpoint(LATEST_RELEASE_URL)
    }

    /// Create a resolver querying a custom endpoint (tests point this at a
    /// local fixture server).
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        VersionResolver {
            endpoint: endpoint.into(),
            user_agent: format!("oam/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Resolve a requested version to a concrete version string.
    ///
    /// `"latest"` queries the release endpoint; any other request is
    /// returned unchanged without a network call.
    pub fn resolve(&self, requested: &str) -> Result<String> {
        if requested != LATEST_VERSION {
            return Ok(requested.to_string());
        }
        self.resolve_latest()
    }

    fn resolve_latest(&self) -> Result<String> {
        debug!(endpoint = %self.endpoint, "querying latest release");

        let client = reqwest::blocking::Client::builder()
            .timeout(RESOLVE_TIMEOUT)
            .build()
            .map_err(|e| Error::Resolution(e.to_string()))?;

        let response = client
            .get(&self.endpoint)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", &self.user_agent)
            .send()
            .map_err(|e| Error::Resolution(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::ResolutionStatus {
                status: status.as_u16(),
            });
        }

        let release: ReleaseMetadata = response
            .json()
            .map_err(|e| Error::Resolution(e.to_string()))?;

        let tag = release.tag_name.trim();
        if tag.is_empty() {
            return Err(Error::EmptyReleaseTag);
        }

        Ok(tag.strip_prefix('v').unwrap_or(tag).to_string())
    }
}

impl Default for VersionResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_version_is_identity() {
        // Unroutable endpoint proves no network call happens.
        let resolver = VersionResolver::with_endpoint("http://127.0.0.1:1/latest");
        assert_eq!(resolver.resolve("2.10.0").unwrap(), "2.10.0");
        assert_eq!(resolver.resolve("v2.10.0").unwrap(), "v2.10.0");
        assert_eq!(resolver.resolve("").unwrap(), "");
    }

    #[test]
    fn test_latest_against_unreachable_endpoint_fails() {
        let resolver = VersionResolver::with_endpoint("http://127.0.0.1:1/latest");
        let err = resolver.resolve("latest").unwrap_err();
        assert_eq!(err.category(), oam_common::ErrorCategory::Resolution);
    }
}
