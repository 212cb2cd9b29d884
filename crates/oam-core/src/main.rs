//! OTel Java Agent Manager CLI.
//!
//! Manages the Splunk OpenTelemetry Java agent jar on the local host:
//! install, uninstall, rollback to a prior backup, and upgrade. Every
//! invocation prints exactly one result document to stdout; logs go to
//! stderr.

use clap::{Args, Parser, Subcommand};
use oam_common::{AgentConfig, ConfigOverrides, FileConfig, OutputFormat};
use oam_core::exit_codes::ExitCode;
use oam_core::logging::{init_logging, LogFormat};
use oam_core::manager::{AgentManager, OperationResult};
use std::path::PathBuf;
use std::process;
use tracing::error;

/// Splunk OpenTelemetry Java agent lifecycle manager
#[derive(Parser)]
#[command(name = "oam")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Path to the config file (default: ~/.oam.yaml)
    #[arg(long, global = true, env = "OAM_CONFIG")]
    config: Option<PathBuf>,

    /// Destination directory for the agent jar
    #[arg(long, global = true)]
    dest_dir: Option<PathBuf>,

    /// Backup directory (default: <dest-dir>/backup)
    #[arg(long, global = true)]
    backup_dir: Option<PathBuf>,

    /// Agent version to install or upgrade to ("latest" or explicit)
    #[arg(long, global = true)]
    agent_version: Option<String>,

    /// Splunk access token (recorded in results, not used for downloads)
    #[arg(long, global = true, env = "SPLUNK_ACCESS_TOKEN")]
    access_token: Option<String>,

    /// OTLP endpoint URL
    #[arg(long, global = true, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    otlp_endpoint: Option<String>,

    /// Keep backup files after uninstall (the default)
    #[arg(long, global = true, overrides_with = "no_keep_backup")]
    keep_backup: bool,

    /// Remove the backup directory after uninstall
    #[arg(long, global = true, overrides_with = "keep_backup")]
    no_keep_backup: bool,

    /// Java home directory
    #[arg(long, global = true, env = "JAVA_HOME")]
    java_home: Option<String>,

    /// Service name for the instrumented application
    #[arg(long, global = true, env = "OTEL_SERVICE_NAME")]
    service_name: Option<String>,

    /// Result output format
    #[arg(long, short = 'f', global = true, default_value = "json")]
    format: OutputFormat,

    /// Log output format
    #[arg(long, global = true, default_value = "human")]
    log_format: LogFormat,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl GlobalOpts {
    /// Tri-state retention override: unset unless one of the flags was
    /// given.
    fn keep_backup_override(&self) -> Option<bool> {
        if self.keep_backup {
            Some(true)
        } else if self.no_keep_backup {
            Some(false)
        } else {
            None
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Download and install the agent jar
    Install,

    /// Remove the agent jar
    Uninstall,

    /// Restore the most recent backup of the agent jar
    Rollback,

    /// Upgrade the agent jar to the requested version
    Upgrade,

    /// Print version information
    Version,
}

fn load_config(opts: &GlobalOpts) -> oam_common::Result<AgentConfig> {
    let file = match &opts.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::load_default()?,
    };

    let overrides = ConfigOverrides {
        dest_dir: opts.dest_dir.clone(),
        backup_dir: opts.backup_dir.clone(),
        agent_version: opts.agent_version.clone(),
        access_token: opts.access_token.clone(),
        otlp_endpoint: opts.otlp_endpoint.clone(),
        keep_backup: opts.keep_backup_override(),
        java_home: opts.java_home.clone(),
        service_name: opts.service_name.clone(),
    };

    Ok(AgentConfig::resolve(overrides, file))
}

fn print_result(result: &OperationResult, format: OutputFormat) -> ExitCode {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(result),
        OutputFormat::Compact => serde_json::to_string(result),
    };

    match rendered {
        Ok(doc) => {
            println!("{doc}");
            match result.failure_category() {
                None => ExitCode::Ok,
                Some(category) => ExitCode::from_category(category),
            }
        }
        Err(err) => {
            error!(error = %err, "failed to serialize result document");
            ExitCode::InternalError
        }
    }
}

fn run(cli: Cli) -> ExitCode {
    if let Commands::Version = cli.command {
        println!("oam {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::Ok;
    }

    let config = match load_config(&cli.global) {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "failed to load configuration");
            return ExitCode::ConfigError;
        }
    };

    let manager = AgentManager::new(config);

    let result = match cli.command {
        Commands::Install => manager.install(),
        Commands::Uninstall => manager.uninstall(),
        Commands::Rollback => manager.rollback(),
        Commands::Upgrade => manager.upgrade(),
        Commands::Version => unreachable!("handled above"),
    };

    print_result(&result, cli.global.format)
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.global.log_format, cli.global.verbose);

    let code = run(cli);
    process::exit(code.as_i32());
}
