//! monover - Multi-module version lifecycle manager CLI tool
//!
//! Bumps, sets, shows and validates `.version` markers for one module or
//! for every module discovered under a workspace root.

use anyhow::bail;
use clap::Parser;
use monover::cli::{CliArgs, Command, ModulesCommand, SelectionArgs};
use monover::config::Config;
use monover::domain::{has_failures, ExecutionContext, ExecutionResult};
use monover::error::ExecutorError;
use monover::executor::Executor;
use monover::logging::init_logging;
use monover::operation::{Operation, VersionFile, VersionOperation};
use monover::output::{create_formatter, OutputConfig, OutputFormatter, Report};
use monover::progress::Progress;
use monover::prompt::StdinPrompt;
use monover::resolver::{AutoSelectAll, ModulePrompt, Resolver};
use monover::workspace::workspace_modules;
use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info};

/// At least one module failed
const EXIT_MODULE_FAILED: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    let color = args.color_enabled();
    if !color {
        colored::control::set_override(false);
    }
    init_logging(args.verbose, args.quiet, color && io::stderr().is_terminal());

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_from_dir(&args.root)?,
    };
    debug!(root = %args.root.display(), format = %args.output_format(&config), "starting");

    let format = args.output_format(&config);
    let output_config = OutputConfig::new(format, args.verbosity(), color);
    let formatter = create_formatter(&output_config);

    if let Command::Modules { action } = &args.command {
        return list_modules(&args, &config, *action, formatter.as_ref());
    }

    let (Some(operation), Some((selection, execution))) =
        (args.command.operation()?, args.command.run_args())
    else {
        bail!("command does not run a version operation");
    };

    let options = execution
        .options(&config.execution)
        .with_format(format)
        .with_quiet(args.quiet);

    let mut progress = Progress::for_output(args.quiet, format);
    progress.spinner("Resolving modules...");
    let resolver = Resolver::new(&args.root, &config);
    let ctx = resolver.resolve(selection.selection(), options, Some(prompt_for(selection)));
    progress.finish_and_clear();
    let ctx = ctx?;

    if !ctx.disabled.is_empty() {
        info!(count = ctx.disabled.len(), modules = ?ctx.disabled, "skipping disabled modules");
    }
    prepare_single_marker(&ctx, selection, &operation)?;

    let operation_name = operation.name();
    let action_verb = operation.action_verb();
    let executor = Executor::new(Arc::new(operation)).with_progress(progress.is_enabled());

    let (results, halted) = match executor.run(&ctx).await {
        Ok(results) => (results, None),
        Err(err @ ExecutorError::Halted { .. }) => {
            let message = err.to_string();
            (err.into_partial_results(), Some(message))
        }
        Err(err) => return Err(err.into()),
    };

    write_report(
        formatter.as_ref(),
        &Report::new(&operation_name, action_verb, &results),
        &args,
    )?;

    if let Some(message) = halted {
        eprintln!("Error: {}", message);
    }

    Ok(exit_code(&results))
}

/// Prompt used when several modules are found and nothing was selected
fn prompt_for(selection: &SelectionArgs) -> &'static dyn ModulePrompt {
    static STDIN: StdinPrompt = StdinPrompt;
    static ALL: AutoSelectAll = AutoSelectAll;

    if selection.allows_prompt() && io::stdin().is_terminal() && io::stderr().is_terminal() {
        &STDIN
    } else {
        &ALL
    }
}

/// Creates a missing single-mode marker unless `--strict` is given
fn prepare_single_marker(
    ctx: &ExecutionContext,
    selection: &SelectionArgs,
    operation: &VersionOperation,
) -> anyhow::Result<()> {
    if !ctx.is_single() || selection.strict || operation.is_read_only() {
        return Ok(());
    }
    if let Some(module) = ctx.modules.first() {
        VersionFile::initialize(&module.version_path)?;
    }
    Ok(())
}

/// Handles `modules list` and `modules discover`
fn list_modules(
    args: &CliArgs,
    config: &Config,
    action: ModulesCommand,
    formatter: &dyn OutputFormatter,
) -> anyhow::Result<ExitCode> {
    let mut progress = Progress::for_output(args.quiet, args.output_format(config));
    progress.spinner("Discovering modules...");
    let modules = workspace_modules(&args.root, config, action == ModulesCommand::Discover);
    progress.finish_and_clear();
    let modules = modules?;

    let mut stdout = io::stdout().lock();
    formatter.format_modules(&modules, &mut stdout)?;
    stdout.flush()?;
    Ok(ExitCode::SUCCESS)
}

fn write_report(
    formatter: &dyn OutputFormatter,
    report: &Report<'_>,
    args: &CliArgs,
) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    formatter.write_report(report, args.verbosity(), &mut stdout)?;
    stdout.flush()
}

fn exit_code(results: &[ExecutionResult]) -> ExitCode {
    if has_failures(results) {
        ExitCode::from(EXIT_MODULE_FAILED)
    } else {
        ExitCode::SUCCESS
    }
}
