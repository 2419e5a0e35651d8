//! Output resolution, run once every resource of a stack is resolved.

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::BTreeMap;

use super::evaluator::{ResolutionContext, evaluate};
use crate::template::Template;

/// Evaluate every declared output of `template` against the final context.
///
/// # Errors
///
/// Returns the first evaluation error, naming the output it occurred in.
pub fn resolve_outputs(template: &Template, ctx: &ResolutionContext<'_>) -> Result<BTreeMap<String, Value>> {
    template
        .outputs
        .iter()
        .map(|(name, output)| {
            let value = evaluate(&output.value, ctx)
                .with_context(|| format!("Failed to resolve output '{name}'"))?;
            Ok((name.clone(), value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{StackError, find_stack_error};
    use crate::resolver::evaluator::ResourceMap;
    use crate::resolver::parameters::ParameterSet;
    use crate::template::FunctionRegistry;
    use serde_json::json;

    #[test]
    fn test_outputs_evaluated_against_context() {
        let template = Template::from_value(
            &json!({
                "Outputs": {
                    "Name": {"Value": {"Fn::Join": ["-", ["app", {"Ref": "Env"}]]}},
                    "Literal": {"Value": 7}
                }
            }),
            &FunctionRegistry::standard(),
        )
        .unwrap();
        let parameters = ParameterSet::new().with("Env", json!("prod"));
        let resources = ResourceMap::new();
        let pseudo = BTreeMap::new();
        let ctx = ResolutionContext::new(&parameters, &resources, &pseudo);

        let outputs = resolve_outputs(&template, &ctx).unwrap();
        assert_eq!(outputs["Name"], json!("app-prod"));
        assert_eq!(outputs["Literal"], json!(7));
    }

    #[test]
    fn test_output_error_names_output() {
        let template = Template::from_value(
            &json!({"Outputs": {"Broken": {"Value": {"Ref": "Nothing"}}}}),
            &FunctionRegistry::standard(),
        )
        .unwrap();
        let parameters = ParameterSet::new();
        let resources = ResourceMap::new();
        let pseudo = BTreeMap::new();
        let ctx = ResolutionContext::new(&parameters, &resources, &pseudo);

        let error = resolve_outputs(&template, &ctx).unwrap_err();
        assert!(error.to_string().contains("Broken"));
        assert!(matches!(find_stack_error(&error), Some(StackError::UnresolvedReference { .. })));
    }
}
