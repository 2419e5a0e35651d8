//! Registry of intrinsic functions recognised when decoding templates.
//!
//! The registry is an explicit value carried by [`ResolverConfig`](crate::config::ResolverConfig)
//! rather than a process-wide table, so a caller can disable functions (or register an
//! alias for one) per resolver.

use std::collections::BTreeMap;

/// Intrinsic functions with an `Fn::` key that the evaluator implements.
///
/// `Ref` is not listed here: it is the reference form itself and is always recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intrinsic {
    /// `Fn::GetAtt` - attribute of a resource, or an output of a nested stack
    GetAtt,
    /// `Fn::Join` - concatenate evaluated parts with a separator
    Join,
}

impl Intrinsic {
    /// The canonical template key of this function.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::GetAtt => "Fn::GetAtt",
            Self::Join => "Fn::Join",
        }
    }
}

/// Mapping of `Fn::*` keys to the function they decode into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionRegistry {
    functions: BTreeMap<String, Intrinsic>,
}

impl FunctionRegistry {
    /// Registry with every implemented function under its canonical key.
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register(Intrinsic::GetAtt.key(), Intrinsic::GetAtt);
        registry.register(Intrinsic::Join.key(), Intrinsic::Join);
        registry
    }

    /// Registry that recognises no `Fn::*` function at all.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            functions: BTreeMap::new(),
        }
    }

    /// Register `key` as a name for `function`.
    pub fn register(&mut self, key: impl Into<String>, function: Intrinsic) {
        self.functions.insert(key.into(), function);
    }

    /// Stop recognising `key`. Returns whether it was registered.
    pub fn disable(&mut self, key: &str) -> bool {
        self.functions.remove(key).is_some()
    }

    /// Look up the function registered under `key`.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<Intrinsic> {
        self.functions.get(key).copied()
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry() {
        let registry = FunctionRegistry::standard();
        assert_eq!(registry.lookup("Fn::GetAtt"), Some(Intrinsic::GetAtt));
        assert_eq!(registry.lookup("Fn::Join"), Some(Intrinsic::Join));
        assert_eq!(registry.lookup("Fn::Split"), None);
        assert_eq!(registry.keys().collect::<Vec<_>>(), vec!["Fn::GetAtt", "Fn::Join"]);
    }

    #[test]
    fn test_disable_and_alias() {
        let mut registry = FunctionRegistry::default();
        assert!(registry.disable("Fn::Join"));
        assert!(!registry.disable("Fn::Join"));
        assert_eq!(registry.lookup("Fn::Join"), None);

        registry.register("Fn::Concat", Intrinsic::Join);
        assert_eq!(registry.lookup("Fn::Concat"), Some(Intrinsic::Join));
    }
}
