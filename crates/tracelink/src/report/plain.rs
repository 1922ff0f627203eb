//! Line-oriented text report
//!
//! The format is stable and meant to be diffed and grepped, so it carries
//! no colors.

use super::{ReportSettings, Reporter, Verbosity};
use tracelink_core::{ItemStatus, LinkDirection, LinkStatus, LinkedItem, Trace, TracedLink};

pub struct PlainTextReporter {
    settings: ReportSettings,
}

impl PlainTextReporter {
    pub fn new(settings: ReportSettings) -> Self {
        Self { settings }
    }
}

impl Reporter for PlainTextReporter {
    fn render(&self, trace: &Trace) -> String {
        let mut out = Lines {
            text: String::new(),
            newline: self.settings.newline().as_str(),
        };

        match self.settings.verbosity() {
            Verbosity::Quiet => {}
            Verbosity::Minimal => out.line(verdict(trace.has_no_defects())),
            Verbosity::Summary => summary(&mut out, trace),
            Verbosity::Failures => {
                for id in trace.defect_ids() {
                    out.line(&id.to_string());
                }
            }
            Verbosity::FailureSummaries => {
                self.items(&mut out, trace, trace.defect_items(), false);
            }
            Verbosity::FailureDetails => {
                self.items(&mut out, trace, trace.defect_items(), true);
            }
            Verbosity::All => {
                let mut items: Vec<&LinkedItem> = trace.items().iter().collect();
                items.sort_by(|a, b| a.id().cmp(b.id()));
                self.items(&mut out, trace, items, true);
            }
        }

        out.text
    }
}

impl PlainTextReporter {
    fn items<'a>(
        &self,
        out: &mut Lines,
        trace: &Trace,
        items: impl IntoIterator<Item = &'a LinkedItem>,
        details: bool,
    ) {
        let mut printed = false;
        for item in items {
            item_summary(out, item);
            if details {
                self.item_details(out, trace, item);
            }
            printed = true;
        }
        if printed {
            out.line("");
        }
        summary(out, trace);
    }

    fn item_details(&self, out: &mut Lines, trace: &Trace, item: &LinkedItem) {
        out.line("|");

        let description = item.description().trim_end_matches(['\r', '\n']);
        if !description.is_empty() {
            for line in split_lines(description) {
                out.line(&format!("| {line}"));
            }
            out.line("|");
        }

        if self.settings.show_origin()
            && let Some(location) = item.location()
        {
            out.line(&format!("| ({location})"));
            out.line("|");
        }

        if item.has_links() {
            let mut links: Vec<&TracedLink> = item.links().iter().collect();
            links.sort_by(|a, b| {
                b.is_incoming()
                    .cmp(&a.is_incoming())
                    .then_with(|| a.other_id().cmp(b.other_id()))
            });
            for link in links {
                out.line(&format!(
                    "{} ({}) {}",
                    arrow(link.direction()),
                    marker(link.status()),
                    link.other_id()
                ));
                if self.settings.show_origin()
                    && let Some(location) = trace.resolve(link).and_then(LinkedItem::location)
                {
                    out.line(&format!("|        ({location})"));
                }
            }
            out.line("|");
        }

        if !item.tags().is_empty() {
            out.line(&format!("| #: {}", item.tags().join(", ")));
            out.line("|");
        }
    }
}

struct Lines {
    text: String,
    newline: &'static str,
}

impl Lines {
    fn line(&mut self, line: &str) {
        self.text.push_str(line);
        self.text.push_str(self.newline);
    }
}

fn summary(out: &mut Lines, trace: &Trace) {
    let mut line = format!(
        "{} - {} total",
        verdict(trace.has_no_defects()),
        trace.count()
    );
    if trace.count_defects() > 0 {
        line.push_str(&format!(", {} defect", trace.count_defects()));
    }
    out.line(&line);
}

fn item_summary(out: &mut Lines, item: &LinkedItem) {
    let status = match item.status() {
        ItemStatus::Approved => String::new(),
        other => format!(" [{other}]"),
    };
    out.line(&format!(
        "{} - {}/{}>{}>{}/{} - {}{} ({})",
        verdict(!item.is_defect()),
        item.count_incoming_bad_links(),
        item.count_incoming_links(),
        item.count_duplicate_links(),
        item.count_outgoing_bad_links(),
        item.count_outgoing_links(),
        item.id(),
        status,
        artifact_types(item)
    ));
}

/// Covered types bare, uncovered with `-`, over-covered with `+`, ordered by type
fn artifact_types(item: &LinkedItem) -> String {
    let mut entries: Vec<(&str, &str)> = item
        .covered_artifact_types()
        .iter()
        .map(|t| ("", t.as_str()))
        .chain(item.uncovered_artifact_types().iter().map(|t| ("-", t.as_str())))
        .chain(item.over_covered_artifact_types().iter().map(|t| ("+", t.as_str())))
        .collect();
    entries.sort_by_key(|&(_, name)| name);
    entries
        .iter()
        .map(|(prefix, name)| format!("{prefix}{name}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn verdict(ok: bool) -> &'static str {
    if ok { "ok" } else { "not ok" }
}

fn arrow(direction: LinkDirection) -> &'static str {
    match direction {
        LinkDirection::Incoming => "|<--",
        LinkDirection::Outgoing => "|-->",
        LinkDirection::Sibling => "|<->",
    }
}

fn marker(status: LinkStatus) -> char {
    match status {
        LinkStatus::Covers | LinkStatus::CoveredShallow => ' ',
        LinkStatus::Unwanted => '+',
        LinkStatus::Outdated => '<',
        LinkStatus::Predated => '>',
        LinkStatus::Orphaned => '/',
        LinkStatus::Duplicate => 'd',
    }
}

/// Split on any of `\r\n`, `\n` or `\r`
fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split("\r\n").flat_map(|part| part.split(['\n', '\r']))
}
