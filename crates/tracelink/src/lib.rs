//! tracelink library - Requirement tracing from the command line
//!
//! Finds specification items in markdown documents and coverage tags in
//! source files, links them with `tracelink-core` and reports the result.
//! The binary is a thin layer over these pieces; they are exposed for
//! testing and embedding.

pub mod config;
pub mod filter;
pub mod importer;
pub mod report;

use config::{Config, DEFAULT_CONFIG_PATH};
use eyre::{Result, WrapErr};
use filter::ItemFilter;
use globset::{Glob, GlobSet, GlobSetBuilder};
use importer::ImporterRegistry;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracelink_core::Trace;

/// Process exit status of a trace run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// The trace has no defects
    Ok,
    /// The trace has at least one defect
    Failure,
    /// Bad arguments, unreadable config or malformed input
    CliError,
}

impl ExitStatus {
    pub fn code(self) -> u8 {
        match self {
            ExitStatus::Ok => 0,
            ExitStatus::Failure => 1,
            ExitStatus::CliError => 2,
        }
    }

    pub fn for_trace(trace: &Trace) -> Self {
        if trace.has_no_defects() {
            ExitStatus::Ok
        } else {
            ExitStatus::Failure
        }
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status.code())
    }
}

/// One trace run: where to look and what to keep
#[derive(Debug, Clone)]
pub struct TraceJob {
    pub root: PathBuf,
    pub inputs: Vec<PathBuf>,
    pub exclude: Vec<String>,
    pub filter: ItemFilter,
}

impl TraceJob {
    /// Import, filter and link everything the job names
    pub fn run(&self, registry: &ImporterRegistry) -> Result<Trace> {
        let inputs = if self.inputs.is_empty() {
            vec![self.root.clone()]
        } else {
            self.inputs.clone()
        };

        let files = importer::discover(&self.root, &inputs, &self.exclude, registry)?;
        let items = importer::import_files(&self.root, &files, registry)?;
        let items = self.filter.apply(items);
        Ok(tracelink_core::link(items))
    }
}

/// Compile exclude patterns into one matcher.
///
/// Paths are matched relative to the project root. A pattern that names a
/// directory also excludes everything below it, so `target` and `target/**`
/// behave the same.
pub fn exclude_matcher(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let pattern = pattern.replace('\\', "/");
        let pattern = pattern.trim_end_matches('/');
        if pattern.is_empty() {
            continue;
        }
        for glob in [pattern.to_string(), format!("{pattern}/**")] {
            builder.add(
                Glob::new(&glob)
                    .wrap_err_with(|| format!("Invalid exclude pattern '{}'", pattern))?,
            );
        }
    }
    builder.build().wrap_err("Failed to compile exclude patterns")
}

/// Walk up from the current directory to the first one holding a tracelink
/// config; fall back to the current directory.
pub fn find_project_root() -> Result<PathBuf> {
    let mut current = std::env::current_dir()?;

    loop {
        if current.join(DEFAULT_CONFIG_PATH).exists() {
            return Ok(current);
        }

        if !current.pop() {
            return std::env::current_dir().wrap_err("Failed to get current directory");
        }
    }
}

/// Load config if it exists, otherwise return the default config.
///
/// A config file that exists but cannot be read or parsed is an error.
pub fn load_config_or_default(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = facet_yaml::from_str(&content)
        .wrap_err_with(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}
