//! Command-line interface for stackview.
//!
//! # Available Commands
//!
//! - `resolve` - Resolve a template tree and print the resulting stack
//! - `deps` - Show resource dependencies and load order of one template
//! - `config` - Manage the global configuration
//!
//! # Global Options
//!
//! - `--verbose` / `-v` - Debug logging on stderr
//! - `--quiet` / `-q` - Only errors on stderr
//! - `--config` / `-c` - Use a specific global configuration file
//!
//! Without either flag only warnings and errors are logged. When `RUST_LOG` is set
//! it takes precedence over all of these.
//!
//! # Examples
//!
//! ```bash
//! stackview resolve root.json -p Env=prod
//! stackview --verbose resolve https://example.com/root.yaml --format yaml
//! stackview deps root.json
//! stackview --config ./stackview.toml config show
//! ```

mod common;
mod config;
mod deps;
mod resolve;

pub use common::{CommandContext, OutputFormat, parse_parameter};

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Runtime configuration derived from the global flags.
///
/// Built by [`Cli::build_config`] and applied by [`Cli::execute_with_config`];
/// tests can construct one directly.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log level used when `RUST_LOG` is not set (e.g. `"warn"`, `"debug"`)
    pub log_level: Option<String>,

    /// Custom path to the global configuration file
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    /// Create a configuration with no log level and the default config path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the stderr logging subscriber.
    ///
    /// `RUST_LOG` wins over [`log_level`](Self::log_level). Installing twice is a
    /// no-op, so this is safe to call from tests.
    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(self.log_level.as_deref().unwrap_or("warn"))
        });

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Main CLI structure for stackview.
#[derive(Parser, Debug)]
#[command(
    name = "stackview",
    about = "Resolve CloudFormation-style template trees into concrete stacks",
    version,
    long_about = "stackview fetches a root template, resolves parameters, intrinsic functions and nested stacks, and prints the fully resolved stack tree."
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to a custom global configuration file
    ///
    /// Overrides `STACKVIEW_CONFIG` and the default `~/.stackview/config.toml`.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve a root template and all nested stacks
    Resolve(resolve::ResolveCommand),

    /// Show resource dependencies and load order of a template
    Deps(deps::DepsCommand),

    /// Manage the global configuration
    Config(config::ConfigCommand),
}

impl Cli {
    /// Execute the parsed command.
    ///
    /// # Errors
    ///
    /// Returns the command's error for the caller to report.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Build a [`CliConfig`] from the parsed global flags.
    ///
    /// - `--verbose`: `debug`
    /// - `--quiet`: `error`
    /// - otherwise: `warn`
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        };

        CliConfig {
            log_level: Some(log_level.to_string()),
            config_path: self.config.clone(),
        }
    }

    /// Execute the command with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns the command's error for the caller to report.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();

        match self.command {
            Commands::Resolve(cmd) => cmd.execute(config.config_path).await,
            Commands::Deps(cmd) => cmd.execute(config.config_path).await,
            Commands::Config(cmd) => cmd.execute(config.config_path).await,
        }
    }
}
