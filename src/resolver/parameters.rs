//! Parameter resolution for one template instantiation.
//!
//! Each declared parameter gets its effective value from three tiers, highest first:
//! 1. the explicit `Value` declared in the template
//! 2. the value inherited from the caller (the parent stack, or the command line)
//! 3. the declared `Default`
//!
//! A parameter with none of the three stays absent. That is not an error here; it
//! only fails once something references it.

use serde_json::Value;
use std::collections::BTreeMap;

use crate::template::Template;

/// Effective value of one parameter.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParameterValue {
    /// The value, or `None` if no tier supplied one
    pub value: Option<Value>,
}

impl ParameterValue {
    /// A present value. JSON `null` counts as absent.
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self {
            value: (!value.is_null()).then_some(value),
        }
    }

    /// An absent value.
    #[must_use]
    pub const fn absent() -> Self {
        Self {
            value: None,
        }
    }
}

/// Parameters keyed by name.
///
/// Used both for the inherited values handed to a template and for the resolved
/// parameters of a stack.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParameterSet {
    values: BTreeMap<String, ParameterValue>,
}

impl ParameterSet {
    /// Create an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name` to `value` (JSON `null` is stored as absent).
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), ParameterValue::new(value));
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.insert(name, value);
        self
    }

    /// Entry for `name`, present or not.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.values.get(name)
    }

    /// Present value of `name`.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name).and_then(|parameter| parameter.value.as_ref())
    }

    /// Whether `name` has an entry, present or not.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the set has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterValue)> {
        self.values.iter().map(|(name, parameter)| (name.as_str(), parameter))
    }

    /// Parameters a nested stack inherits from its resource's resolved
    /// `Parameters` property.
    ///
    /// Anything other than an object (including a missing property) inherits nothing.
    #[must_use]
    pub fn from_properties(parameters: Option<&Value>) -> Self {
        match parameters {
            Some(Value::Object(map)) => map
                .iter()
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
            _ => Self::new(),
        }
    }

    /// Consume into a name → value map, absent values as `None`.
    #[must_use]
    pub fn into_values(self) -> BTreeMap<String, Option<Value>> {
        self.values.into_iter().map(|(name, parameter)| (name, parameter.value)).collect()
    }
}

impl FromIterator<(String, Value)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (name, value) in iter {
            set.insert(name, value);
        }
        set
    }
}

/// Build the parameter set of one template instantiation.
///
/// Only parameters declared by the template appear in the result; inherited values
/// for undeclared names are ignored.
#[must_use]
pub fn resolve_parameters(template: &Template, inherited: &ParameterSet) -> ParameterSet {
    let values = template
        .parameters
        .iter()
        .map(|(name, spec)| {
            let value = spec
                .value
                .clone()
                .or_else(|| inherited.value(name).cloned())
                .or_else(|| spec.default.clone());
            (
                name.clone(),
                ParameterValue {
                    value,
                },
            )
        })
        .collect();

    ParameterSet {
        values,
    }
}
