//! Core types and error handling for stackview
//!
//! This module holds the pieces every other module builds on: the [`StackError`]
//! taxonomy and the user-facing [`ErrorContext`] reporting used by the CLI.

pub mod error;

pub use error::{ErrorContext, StackError, find_stack_error, user_friendly_error};
