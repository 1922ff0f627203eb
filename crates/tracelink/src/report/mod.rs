//! Rendering a linked trace for people and machines

mod html;
mod json;
mod plain;
mod specobject;

pub use html::HtmlReporter;
pub use json::JsonReporter;
pub use plain::PlainTextReporter;
pub use specobject::SpecobjectReporter;

use tracelink_core::Trace;

/// How much of the trace a report shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// No output at all, only the exit code
    Quiet,
    /// `ok` or `not ok`
    Minimal,
    /// Result and item counts
    Summary,
    /// Identifiers of defect items
    Failures,
    /// One line per defect item
    FailureSummaries,
    /// Defect items with description and links
    #[default]
    FailureDetails,
    /// Every item with description and links
    All,
}

impl Verbosity {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "quiet" => Some(Self::Quiet),
            "minimal" => Some(Self::Minimal),
            "summary" => Some(Self::Summary),
            "failures" => Some(Self::Failures),
            "failure_summaries" => Some(Self::FailureSummaries),
            "failure_details" => Some(Self::FailureDetails),
            "all" => Some(Self::All),
            _ => None,
        }
    }
}

/// Line ending written after every report line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Newline {
    #[default]
    Unix,
    Windows,
    OldMac,
}

impl Newline {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "unix" => Some(Self::Unix),
            "windows" => Some(Self::Windows),
            "oldmac" => Some(Self::OldMac),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Newline::Unix => "\n",
            Newline::Windows => "\r\n",
            Newline::OldMac => "\r",
        }
    }
}

/// Output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Plain,
    Json,
    Html,
    /// SpecObject XML export of the imported items
    Specobject,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "plain" | "text" => Some(Self::Plain),
            "json" => Some(Self::Json),
            "html" => Some(Self::Html),
            "specobject" | "xml" => Some(Self::Specobject),
            _ => None,
        }
    }
}

/// Everything that controls how a trace is reported
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportSettings {
    verbosity: Verbosity,
    format: ReportFormat,
    newline: Newline,
    show_origin: bool,
}

impl ReportSettings {
    pub fn builder() -> ReportSettingsBuilder {
        ReportSettingsBuilder::default()
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    pub fn format(&self) -> ReportFormat {
        self.format
    }

    pub fn newline(&self) -> Newline {
        self.newline
    }

    pub fn show_origin(&self) -> bool {
        self.show_origin
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReportSettingsBuilder {
    settings: ReportSettings,
}

impl ReportSettingsBuilder {
    pub fn verbosity(mut self, verbosity: Verbosity) -> Self {
        self.settings.verbosity = verbosity;
        self
    }

    pub fn format(mut self, format: ReportFormat) -> Self {
        self.settings.format = format;
        self
    }

    pub fn newline(mut self, newline: Newline) -> Self {
        self.settings.newline = newline;
        self
    }

    pub fn show_origin(mut self, show_origin: bool) -> Self {
        self.settings.show_origin = show_origin;
        self
    }

    pub fn build(self) -> ReportSettings {
        self.settings
    }
}

/// A renderer for one output format
pub trait Reporter {
    fn render(&self, trace: &Trace) -> String;
}

/// Render a trace with the reporter selected by `settings`
pub fn render_report(trace: &Trace, settings: ReportSettings) -> String {
    match settings.format() {
        ReportFormat::Plain => PlainTextReporter::new(settings).render(trace),
        ReportFormat::Json => JsonReporter.render(trace),
        ReportFormat::Html => HtmlReporter::new(settings).render(trace),
        ReportFormat::Specobject => SpecobjectReporter.render(trace),
    }
}
