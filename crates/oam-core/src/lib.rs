//! OTel Java Agent Manager core library.
//!
//! This library manages the lifecycle of the Splunk OpenTelemetry Java
//! agent jar on a host filesystem:
//! - Version resolution against the release-metadata endpoint
//! - Artifact download
//! - Timestamped backup history and restore
//! - Install / uninstall / rollback / upgrade orchestration
//!
//! The binary entry point is in `main.rs`.

pub mod backup;
pub mod exit_codes;
pub mod fetch;
pub mod logging;
pub mod manager;
pub mod resolver;

/// Fixed file name of the managed agent artifact.
pub const AGENT_JAR_NAME: &str = "splunk-otel-javaagent.jar";
