//! Show how a template's resources depend on each other.
//!
//! Only the given template is read; nested stacks are listed as single
//! resources and their templates are not fetched.
//!
//! # Examples
//!
//! ```bash
//! stackview deps root.json                # tree view plus load order
//! stackview deps root.json --format json  # dependencies and order as JSON
//! ```
//!
//! # Output Format
//!
//! ```text
//! Resources of root.json:
//! └── Consumer
//!     └── Child
//!
//! 2 resources, 1 references
//! Load order: Child, Consumer
//! ```

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use super::common::CommandContext;
use crate::resolver::LoadPlan;

/// Command to display resource dependencies and load order.
#[derive(Args, Debug)]
pub struct DepsCommand {
    /// Location of the template (path, `file://` or `http(s)://` URL)
    location: String,

    /// Output format (tree, json)
    #[arg(short = 'f', long, default_value = "tree")]
    format: String,

    /// Directory that relative template paths are read from
    #[arg(long)]
    base_dir: Option<PathBuf>,
}

#[derive(Serialize)]
struct DepsReport<'a> {
    dependencies: &'a BTreeMap<String, BTreeSet<String>>,
    order: &'a [String],
}

impl DepsCommand {
    /// Execute the command with an optional global config path.
    ///
    /// # Errors
    ///
    /// Returns an error if the template cannot be loaded, the format is invalid, or
    /// the resources reference each other in a cycle.
    pub async fn execute(self, config_path: Option<PathBuf>) -> Result<()> {
        if !matches!(self.format.as_str(), "tree" | "json") {
            anyhow::bail!("Invalid format '{}'. Valid formats are: tree, json", self.format);
        }

        let context = CommandContext::load(config_path).await?;
        let resolver = context.resolver(self.base_dir.clone())?;
        let template = resolver.load_template(&self.location).await?;
        let plan = resolver.plan(&template)?;

        if self.format == "json" {
            let report = DepsReport {
                dependencies: &plan.dependencies,
                order: &plan.order,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print!("{}", render_tree(&self.location, &plan));
        }
        Ok(())
    }
}

fn render_tree(location: &str, plan: &LoadPlan) -> String {
    let graph = plan.graph();
    if graph.is_empty() {
        return format!("{} declares no resources\n", location.bold());
    }

    let mut out = format!("Resources of {}:\n", location.bold());
    for root in graph.roots() {
        out.push_str(&graph.to_tree_string(&root));
    }
    out.push_str(&format!(
        "\n{} resources, {} references\n",
        graph.node_count(),
        graph.edge_count()
    ));
    out.push_str(&format!("{} {}\n", "Load order:".cyan(), plan.order.join(", ")));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{FunctionRegistry, Template};
    use serde_json::json;

    #[test]
    fn test_render_tree() {
        colored::control::set_override(false);
        let template = Template::from_value(
            &json!({
                "Resources": {
                    "Child": {"Type": "AWS::CloudFormation::Stack"},
                    "Consumer": {"Type": "T", "Properties": {"Url": {"Fn::GetAtt": ["Child", "Outputs.Url"]}}}
                }
            }),
            &FunctionRegistry::standard(),
        )
        .unwrap();
        let plan = LoadPlan::for_template(&template).unwrap();

        let rendered = render_tree("root.json", &plan);
        assert!(rendered.contains("└── Consumer\n    └── Child\n"));
        assert!(rendered.contains("\n2 resources, 1 references\n"));
        assert!(rendered.ends_with("Load order: Child, Consumer\n"));
    }

    #[test]
    fn test_render_empty() {
        colored::control::set_override(false);
        let plan = LoadPlan {
            dependencies: BTreeMap::new(),
            order: Vec::new(),
        };
        assert!(render_tree("empty.json", &plan).contains("declares no resources"));
    }
}
