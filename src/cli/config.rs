//! Manage the global stackview configuration.
//!
//! # Examples
//!
//! ```bash
//! stackview config init            # write an example config
//! stackview config init --force    # overwrite an existing one
//! stackview config show            # print the effective configuration
//! stackview config                 # same as `show`
//! stackview config path            # print the config file location
//! ```

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};

use crate::config::GlobalConfig;

/// Command to manage the global configuration file.
#[derive(Args, Debug)]
pub struct ConfigCommand {
    /// Configuration management operation to perform
    #[command(subcommand)]
    command: Option<ConfigSubcommands>,
}

#[derive(Subcommand, Debug)]
enum ConfigSubcommands {
    /// Write an example global configuration.
    ///
    /// Refuses to overwrite an existing file unless `--force` is given.
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Show the effective global configuration.
    ///
    /// Missing keys are shown with their default values. This is the default
    /// when no subcommand is given.
    Show,

    /// Print the path of the global configuration file.
    Path,
}

impl ConfigCommand {
    /// Execute the config command with an optional config path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be read or written.
    pub async fn execute(self, config_path: Option<PathBuf>) -> Result<()> {
        let config_path = GlobalConfig::resolve_path(config_path)?;
        match self.command {
            Some(ConfigSubcommands::Init {
                force,
            }) => Self::init(force, &config_path).await,
            Some(ConfigSubcommands::Show) | None => Self::show(&config_path).await,
            Some(ConfigSubcommands::Path) => {
                println!("{}", config_path.display());
                Ok(())
            }
        }
    }

    async fn init(force: bool, config_path: &Path) -> Result<()> {
        if config_path.exists() && !force {
            anyhow::bail!(
                "Global config already exists at {}. Use --force to overwrite",
                config_path.display()
            );
        }

        let config = GlobalConfig::init_example();
        config.save_to(config_path).await?;

        println!("✅ Created global config at: {}", config_path.display());
        println!("\n{}", "Example configuration:".bold());
        println!("{}", toml::to_string_pretty(&config).context("Failed to serialize config")?);
        Ok(())
    }

    async fn show(config_path: &Path) -> Result<()> {
        let config = GlobalConfig::load_with_optional(Some(config_path.to_path_buf())).await?;

        println!("{}", "Global Configuration".bold());
        if config_path.exists() {
            println!("Location: {}\n", config_path.display());
        } else {
            println!("Location: {} {}\n", config_path.display(), "(not created, showing defaults)".yellow());
        }
        println!("{}", toml::to_string_pretty(&config).context("Failed to serialize config")?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_config_init() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.toml");

        ConfigCommand::init(false, &config_path).await.unwrap();
        assert!(config_path.exists());

        // Existing file is kept without --force
        assert!(ConfigCommand::init(false, &config_path).await.is_err());
        assert!(ConfigCommand::init(true, &config_path).await.is_ok());

        let loaded = GlobalConfig::load_from(&config_path).await.unwrap();
        assert_eq!(loaded, GlobalConfig::init_example());
    }

    #[tokio::test]
    async fn test_config_show_missing_file() {
        let temp = TempDir::new().unwrap();
        let result = ConfigCommand::show(&temp.path().join("config.toml")).await;
        assert!(result.is_ok());
    }
}
