//! Test utilities for stackview
//!
//! Helpers shared by unit and integration tests: one-time logging setup and
//! template fixtures.
//!
//! # Example
//!
//! ```rust,no_run
//! use stackview_cli::test_utils::{TemplateFixture, resolver_for};
//! use stackview_cli::resolver::ParameterSet;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let resolver = resolver_for(&[TemplateFixture::root(), TemplateFixture::child()]);
//! let stack = resolver.resolve_location("root.json", &ParameterSet::new()).await?;
//! assert_eq!(stack.outputs["Endpoint"], "http://x");
//! # Ok(())
//! # }
//! ```

pub mod fixtures;

pub use fixtures::{TemplateFixture, source_with};

use std::sync::{Arc, Once};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::resolver::StackResolver;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` when given, otherwise `RUST_LOG`; with neither, logging stays off.
/// Only the first call has any effect.
///
/// ```bash
/// RUST_LOG=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

/// Resolver with the default configuration over the given fixtures.
pub fn resolver_for(fixtures: &[TemplateFixture]) -> StackResolver {
    init_test_logging(None);
    StackResolver::new(Arc::new(source_with(fixtures)))
}
