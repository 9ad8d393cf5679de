//! Core domain models for monover
//!
//! This module contains the fundamental types used throughout the application:
//! - Semantic version model and version arithmetic
//! - Module identity
//! - Execution context and options
//! - Per-module execution results and summary helpers

mod context;
mod execution_result;
mod module;
pub mod version;

pub use context::{ExecutionContext, ExecutionMode, ExecutionOptions};
pub use execution_result::{
    failure_count, has_failures, success_count, total_duration, ExecutionResult,
};
pub use module::{module_name_for, Module, UNKNOWN_VERSION};
pub use version::{BumpKind, SemVersion};
