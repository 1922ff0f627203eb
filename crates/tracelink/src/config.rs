//! Configuration schema for tracelink
//!
//! Config lives at `.config/tracelink/config.yaml` relative to the project root.
//! Every field is optional; command line flags take precedence.

use facet::Facet;

/// Default config location relative to the project root
pub const DEFAULT_CONFIG_PATH: &str = ".config/tracelink/config.yaml";

/// Root configuration for tracelink
#[derive(Debug, Clone, Default, Facet)]
pub struct Config {
    /// Files or directories to import, relative to the project root.
    /// Defaults to the project root itself.
    #[facet(default)]
    pub inputs: Vec<String>,

    /// Path prefixes or glob patterns skipped during discovery
    /// e.g., "target/**"
    #[facet(default)]
    pub exclude: Vec<String>,

    /// How the trace result is rendered
    #[facet(default)]
    pub report: ReportConfig,

    /// Which items take part in the trace
    #[facet(default)]
    pub filter: FilterConfig,
}

#[derive(Debug, Clone, Default, Facet)]
pub struct ReportConfig {
    /// quiet, minimal, summary, failures, failure_summaries, failure_details or all
    #[facet(default)]
    pub verbosity: Option<String>,

    /// plain, json or html
    #[facet(default)]
    pub format: Option<String>,

    /// unix, windows or oldmac
    #[facet(default)]
    pub newline: Option<String>,

    /// Print file and line of every item and link end
    #[facet(default)]
    pub show_origin: Option<bool>,
}

#[derive(Debug, Clone, Default, Facet)]
pub struct FilterConfig {
    /// Only trace these artifact types
    #[facet(default)]
    pub artifact_types: Vec<String>,

    /// Only trace items carrying one of these tags
    #[facet(default)]
    pub tags: Vec<String>,
}
