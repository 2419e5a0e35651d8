//! Integration test suite for stackview
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **resolution**: Library-level resolution of template trees from files
//! - **errors**: Failure propagation through nested stacks
//! - **cli_resolve**: The `resolve` command
//! - **cli_deps**: The `deps` command
//! - **cli_config**: The `config` command and config file handling

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod cli_config;
mod cli_deps;
mod cli_resolve;
mod errors;
mod resolution;
