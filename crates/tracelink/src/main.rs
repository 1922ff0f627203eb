//! tracelink - Requirement tracing for CI
//!
//! Imports specification items from markdown documents and coverage tags
//! from source files, links them and fails the run when the trace has
//! defects.

use eyre::{Result, WrapErr};
use figue as args;
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracelink::config::{Config, DEFAULT_CONFIG_PATH};
use tracelink::filter::ItemFilter;
use tracelink::importer::ImporterRegistry;
use tracelink::report::{Newline, ReportFormat, ReportSettings, Verbosity, render_report};
use tracelink::{ExitStatus, TraceJob, find_project_root, load_config_or_default};
use tracing_subscriber::EnvFilter;

/// CLI arguments
#[derive(Debug, facet::Facet)]
struct Args {
    /// Files or directories to trace (default: inputs from config, or the project root)
    #[facet(args::positional, default)]
    paths: Vec<PathBuf>,

    /// Path to config file (default: .config/tracelink/config.yaml)
    #[facet(args::named, args::short = 'c', default)]
    config: Option<PathBuf>,

    /// Output format: plain, json, html, specobject
    #[facet(args::named, args::short = 'f', default)]
    format: Option<String>,

    /// Report verbosity: quiet, minimal, summary, failures, failure_summaries, failure_details, all
    #[facet(args::named, args::short = 'v', default)]
    verbosity: Option<String>,

    /// Line ending of the plain report: unix, windows, oldmac
    #[facet(args::named, default)]
    newline: Option<String>,

    /// Show file and line of items and link ends
    #[facet(args::named, default)]
    show_origin: bool,

    /// Only trace these artifact types (comma separated)
    #[facet(args::named, args::short = 'a', default)]
    artifact_types: Option<String>,

    /// Only trace items with one of these tags (comma separated)
    #[facet(args::named, args::short = 't', default)]
    tags: Option<String>,

    /// Write the report to this file instead of stdout
    #[facet(args::named, args::short = 'o', default)]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    init_tracing();

    let args: Args = match figue::from_std_args().into_result() {
        Ok(output) => output.value,
        Err(err) => {
            eprintln!("{} {}", "error:".red().bold(), err);
            return ExitStatus::CliError.into();
        }
    };

    match run(args) {
        Ok(status) => status.into(),
        Err(err) => {
            eprintln!("{} {:?}", "error:".red().bold(), err);
            ExitStatus::CliError.into()
        }
    }
}

/// Diagnostics go to stderr, filtered by `TRACELINK_LOG` (default: warnings)
fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("TRACELINK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: Args) -> Result<ExitStatus> {
    let project_root = find_project_root()?;

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| project_root.join(DEFAULT_CONFIG_PATH));
    let config = load_config_or_default(&config_path)?;

    let settings = report_settings(&args, &config)?;
    let quiet = settings.verbosity() == Verbosity::Quiet;

    // config inputs are relative to the project root, command line paths to the cwd
    let inputs = if args.paths.is_empty() {
        config.inputs.iter().map(PathBuf::from).collect()
    } else {
        let cwd = std::env::current_dir().wrap_err("Failed to get current directory")?;
        args.paths.iter().map(|path| cwd.join(path)).collect()
    };
    let filter = ItemFilter::new(
        list_or(&args.artifact_types, &config.filter.artifact_types),
        list_or(&args.tags, &config.filter.tags),
    );

    if !quiet {
        eprintln!(
            "{} Tracing {}...",
            "->".blue().bold(),
            project_root.display().to_string().cyan()
        );
    }

    let job = TraceJob {
        root: project_root,
        inputs,
        exclude: config.exclude.clone(),
        filter,
    };
    let trace = job.run(&ImporterRegistry::with_defaults())?;

    if !quiet {
        let defects = trace.count_defects();
        let defects = if defects == 0 {
            defects.to_string().green().to_string()
        } else {
            defects.to_string().red().to_string()
        };
        eprintln!(
            "   Linked {} items, {} defects",
            trace.count().to_string().green(),
            defects
        );
    }

    let report = render_report(&trace, settings);
    match &args.output {
        Some(path) => {
            std::fs::write(path, &report)
                .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
            if !quiet {
                eprintln!(
                    "{} Wrote report to {}",
                    "OK".green().bold(),
                    path.display()
                );
            }
        }
        None => print!("{}", report),
    }

    Ok(ExitStatus::for_trace(&trace))
}

/// Command line flags win over config values; unknown names are errors
fn report_settings(args: &Args, config: &Config) -> Result<ReportSettings> {
    let mut builder = ReportSettings::builder();

    if let Some(name) = args.format.as_ref().or(config.report.format.as_ref()) {
        let format = ReportFormat::from_str(name)
            .ok_or_else(|| eyre::eyre!("Unknown report format '{}'", name))?;
        builder = builder.format(format);
    }
    if let Some(name) = args.verbosity.as_ref().or(config.report.verbosity.as_ref()) {
        let verbosity = Verbosity::from_str(name)
            .ok_or_else(|| eyre::eyre!("Unknown report verbosity '{}'", name))?;
        builder = builder.verbosity(verbosity);
    }
    if let Some(name) = args.newline.as_ref().or(config.report.newline.as_ref()) {
        let newline = Newline::from_str(name)
            .ok_or_else(|| eyre::eyre!("Unknown newline format '{}'", name))?;
        builder = builder.newline(newline);
    }

    let show_origin = args.show_origin || config.report.show_origin.unwrap_or(false);
    Ok(builder.show_origin(show_origin).build())
}

fn list_or(flag: &Option<String>, configured: &[String]) -> Vec<String> {
    match flag {
        Some(list) => list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        None => configured.to_vec(),
    }
}
