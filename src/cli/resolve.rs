//! Resolve a template tree and print the resulting stack.
//!
//! # Examples
//!
//! ```bash
//! stackview resolve root.json
//! stackview resolve root.yaml -p Env=prod -p Port=8080 --format yaml
//! stackview resolve https://example.com/templates/root.json
//! stackview resolve root.json --base-dir ./templates
//! ```
//!
//! The resolved stack is written to stdout; logging goes to stderr.

use anyhow::Result;
use clap::Args;
use serde_json::Value;
use std::path::PathBuf;

use super::common::{CommandContext, OutputFormat, parse_parameter};
use crate::resolver::ParameterSet;

/// Command to resolve a root template and all of its nested stacks.
#[derive(Args, Debug)]
pub struct ResolveCommand {
    /// Location of the root template (path, `file://` or `http(s)://` URL)
    location: String,

    /// Root parameter value, as NAME=VALUE (repeatable)
    ///
    /// Values that parse as JSON are used as JSON, anything else as a string.
    /// These take the place of inherited values for the root template, so an
    /// explicit `Value` in the template still wins over them.
    #[arg(short = 'p', long = "parameter", value_name = "NAME=VALUE", value_parser = parse_parameter)]
    parameters: Vec<(String, Value)>,

    /// Output format (json, yaml)
    #[arg(short = 'f', long, default_value = "json")]
    format: String,

    /// Directory that relative template paths are read from
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Print only the root stack's outputs
    #[arg(long)]
    outputs_only: bool,
}

impl ResolveCommand {
    /// Execute the command with an optional global config path.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid format or configuration, or when resolution
    /// fails anywhere in the stack tree.
    pub async fn execute(self, config_path: Option<PathBuf>) -> Result<()> {
        let format = OutputFormat::parse(&self.format)?;
        let context = CommandContext::load(config_path).await?;
        let resolver = context.resolver(self.base_dir)?;

        let inherited: ParameterSet = self.parameters.into_iter().collect();
        let stack = resolver.resolve_location(&self.location, &inherited).await?;

        let rendered = if self.outputs_only {
            format.render(&stack.outputs)?
        } else {
            format.render(&stack)?
        };
        println!("{}", rendered.trim_end());
        Ok(())
    }
}
