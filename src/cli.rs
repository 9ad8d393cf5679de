//! CLI argument parsing module for monover

use crate::config::{Config, ExecutionConfig};
use crate::domain::{BumpKind, ExecutionOptions};
use crate::error::VersionError;
use crate::operation::VersionOperation;
use crate::output::{OutputFormat, Verbosity};
use crate::resolver::Selection;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// Multi-module version lifecycle manager
#[derive(Parser, Debug, Clone)]
#[command(
    name = "monover",
    version,
    about = "Multi-module version lifecycle manager"
)]
pub struct CliArgs {
    /// Workspace root to discover modules in
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Configuration file (default: <root>/.monover.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Enable quiet mode - summary only
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format (overrides the configuration file)
    #[arg(long, global = true, value_enum)]
    pub format: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Bump the version (patch, minor, major, release or auto)
    Bump {
        /// Which component to bump
        kind: BumpKind,

        /// Attach a pre-release label to the bumped version
        #[arg(long)]
        pre: Option<String>,

        /// Attach build metadata to the bumped version
        #[arg(long)]
        meta: Option<String>,

        /// Keep the existing build metadata
        #[arg(long, conflicts_with = "meta")]
        preserve_meta: bool,

        #[command(flatten)]
        selection: SelectionArgs,

        #[command(flatten)]
        execution: ExecutionArgs,
    },

    /// Set or increment the pre-release label
    Pre {
        /// Pre-release label, e.g. alpha, beta, rc
        #[arg(long)]
        label: String,

        /// Increment the counter after the label (rc.1 -> rc.2)
        #[arg(long)]
        inc: bool,

        #[command(flatten)]
        selection: SelectionArgs,

        #[command(flatten)]
        execution: ExecutionArgs,
    },

    /// Write an explicit version
    Set {
        /// Version to write
        version: String,

        /// Override the pre-release label
        #[arg(long)]
        pre: Option<String>,

        /// Override the build metadata
        #[arg(long)]
        meta: Option<String>,

        #[command(flatten)]
        selection: SelectionArgs,

        #[command(flatten)]
        execution: ExecutionArgs,
    },

    /// Show the current version
    Show {
        #[command(flatten)]
        selection: SelectionArgs,

        #[command(flatten)]
        execution: ExecutionArgs,
    },

    /// Check that every version is strict semver
    Validate {
        #[command(flatten)]
        selection: SelectionArgs,

        #[command(flatten)]
        execution: ExecutionArgs,
    },

    /// Inspect the workspace's modules
    Modules {
        #[command(subcommand)]
        action: ModulesCommand,
    },
}

/// `modules` subcommands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModulesCommand {
    /// Configured modules, or discovered ones when none are configured
    List,
    /// Walk the workspace and list every module found
    Discover,
}

/// Options choosing which modules to act on
#[derive(Args, Debug, Clone, Default)]
pub struct SelectionArgs {
    /// Act on every module
    #[arg(short, long, conflicts_with_all = ["module", "modules", "pattern", "path"])]
    pub all: bool,

    /// Act on the named module (can be specified multiple times)
    #[arg(short, long, action = ArgAction::Append)]
    pub module: Vec<String>,

    /// Act on a comma-separated list of modules
    #[arg(long)]
    pub modules: Option<String>,

    /// Act on modules matching a glob pattern
    #[arg(long, conflicts_with_all = ["module", "modules", "path"])]
    pub pattern: Option<String>,

    /// Operate on this version file only
    #[arg(long, conflicts_with_all = ["module", "modules"])]
    pub path: Option<PathBuf>,

    /// Select every module instead of prompting
    #[arg(short, long)]
    pub yes: bool,

    /// Never prompt
    #[arg(long)]
    pub non_interactive: bool,

    /// Fail instead of creating a missing version file
    #[arg(long)]
    pub strict: bool,
}

impl SelectionArgs {
    /// Translate the flags into a module selection
    pub fn selection(&self) -> Selection {
        if let Some(path) = &self.path {
            return Selection::Single {
                path: Some(path.clone()),
            };
        }
        if self.all {
            return Selection::All;
        }
        if !self.module.is_empty() || self.modules.is_some() {
            return Selection::named(self.module.iter().chain(self.modules.iter()));
        }
        if let Some(pattern) = &self.pattern {
            return Selection::Pattern(pattern.clone());
        }
        Selection::Auto
    }

    /// Check if prompting is allowed at all
    pub fn allows_prompt(&self) -> bool {
        !self.yes && !self.non_interactive
    }
}

/// Options controlling how the operation runs
#[derive(Args, Debug, Clone, Default)]
pub struct ExecutionArgs {
    /// Run modules concurrently
    #[arg(long)]
    pub parallel: bool,

    /// Stop starting new modules after the first failure
    #[arg(long)]
    pub fail_fast: bool,

    /// Run every module even if some fail
    #[arg(long)]
    pub continue_on_error: bool,

    /// Maximum number of modules processed at once
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    pub jobs: Option<u64>,
}

impl ExecutionArgs {
    /// Merge the flags over the `[execution]` table.
    ///
    /// An explicit `--fail-fast` cancels `continue_on_error` from the
    /// configuration; `--continue-on-error` always wins.
    pub fn options(&self, config: &ExecutionConfig) -> ExecutionOptions {
        let continue_on_error =
            self.continue_on_error || (config.continue_on_error && !self.fail_fast);
        let fail_fast = self.fail_fast || config.fail_fast;
        let jobs = self
            .jobs
            .and_then(|n| usize::try_from(n).ok())
            .or(config.jobs);

        ExecutionOptions::new(self.parallel || config.parallel, fail_fast, continue_on_error)
            .with_max_concurrency(jobs)
    }
}

impl CliArgs {
    /// Output format: `--format`, else the configuration file
    pub fn output_format(&self, config: &Config) -> OutputFormat {
        self.format.unwrap_or(config.execution.format)
    }

    /// Output verbosity from `--quiet` and `--verbose`
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }

    /// Colors are off with `--no-color` or a non-empty `NO_COLOR`
    pub fn color_enabled(&self) -> bool {
        !self.no_color && std::env::var_os("NO_COLOR").map_or(true, |v| v.is_empty())
    }
}

impl Command {
    /// The version operation this command runs, `None` for `modules`
    pub fn operation(&self) -> Result<Option<VersionOperation>, VersionError> {
        let operation = match self {
            Command::Bump {
                kind,
                pre,
                meta,
                preserve_meta,
                ..
            } => VersionOperation::bump(*kind, pre.clone(), meta.clone(), *preserve_meta)?,
            Command::Pre { label, inc, .. } => VersionOperation::pre_release(label, *inc)?,
            Command::Set {
                version, pre, meta, ..
            } => VersionOperation::set(version, pre.as_deref(), meta.as_deref())?,
            Command::Show { .. } => VersionOperation::Show,
            Command::Validate { .. } => VersionOperation::Validate,
            Command::Modules { .. } => return Ok(None),
        };
        Ok(Some(operation))
    }

    /// Selection and execution flags of an operation command
    pub fn run_args(&self) -> Option<(&SelectionArgs, &ExecutionArgs)> {
        match self {
            Command::Bump {
                selection,
                execution,
                ..
            }
            | Command::Pre {
                selection,
                execution,
                ..
            }
            | Command::Set {
                selection,
                execution,
                ..
            }
            | Command::Show {
                selection,
                execution,
            }
            | Command::Validate {
                selection,
                execution,
            } => Some((selection, execution)),
            Command::Modules { .. } => None,
        }
    }
}
