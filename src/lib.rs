//! monover - Multi-module version lifecycle manager library
//!
//! This library provides the core functionality for managing `.version`
//! markers across a workspace:
//! - Discovery of modules under a root directory
//! - Resolution of a selection into an execution context
//! - Sequential and concurrent execution with fail-fast or continue-on-error
//! - Version operations (bump, pre-release, set, show, validate)
//! - Text, table and JSON result formatting

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod executor;
pub mod logging;
pub mod operation;
pub mod output;
pub mod progress;
pub mod prompt;
pub mod resolver;
pub mod workspace;

pub use config::Config;
pub use domain::{ExecutionContext, ExecutionOptions, ExecutionResult, Module, SemVersion};
pub use error::AppError;
pub use executor::Executor;
pub use operation::{Operation, VersionOperation};
pub use resolver::{Resolver, Selection};
