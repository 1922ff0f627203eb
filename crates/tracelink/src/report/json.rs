use super::Reporter;
use facet::Facet;
use std::collections::BTreeSet;
use tracelink_core::{LinkedItem, Trace};

/// Machine-readable report of every item, independent of verbosity
pub struct JsonReporter;

#[derive(Facet)]
struct JsonReport {
    summary: JsonSummary,
    items: Vec<JsonItem>,
}

#[derive(Facet)]
struct JsonSummary {
    ok: bool,
    total: usize,
    defects: usize,
}

#[derive(Facet)]
struct JsonItem {
    id: String,
    status: String,
    title: String,
    location: Option<String>,
    defect: bool,
    needed_artifact_types: Vec<String>,
    covered_artifact_types: Vec<String>,
    uncovered_artifact_types: Vec<String>,
    over_covered_artifact_types: Vec<String>,
    incoming_links: usize,
    incoming_bad_links: usize,
    outgoing_links: usize,
    outgoing_bad_links: usize,
    duplicate_links: usize,
    links: Vec<JsonLink>,
}

#[derive(Facet)]
struct JsonLink {
    direction: String,
    status: String,
    other_id: String,
}

impl Reporter for JsonReporter {
    fn render(&self, trace: &Trace) -> String {
        let report = JsonReport {
            summary: JsonSummary {
                ok: trace.has_no_defects(),
                total: trace.count(),
                defects: trace.count_defects(),
            },
            items: trace.items().iter().map(json_item).collect(),
        };

        facet_json::to_string_pretty(&report).expect("JSON serialization failed")
    }
}

fn json_item(item: &LinkedItem) -> JsonItem {
    let types = |set: &BTreeSet<String>| -> Vec<String> { set.iter().cloned().collect() };
    JsonItem {
        id: item.id().to_string(),
        status: item.status().as_str().to_string(),
        title: item.title().to_string(),
        location: item.location().map(ToString::to_string),
        defect: item.is_defect(),
        needed_artifact_types: types(item.needed_artifact_types()),
        covered_artifact_types: types(item.covered_artifact_types()),
        uncovered_artifact_types: types(item.uncovered_artifact_types()),
        over_covered_artifact_types: types(item.over_covered_artifact_types()),
        incoming_links: item.count_incoming_links(),
        incoming_bad_links: item.count_incoming_bad_links(),
        outgoing_links: item.count_outgoing_links(),
        outgoing_bad_links: item.count_outgoing_bad_links(),
        duplicate_links: item.count_duplicate_links(),
        links: item
            .links()
            .iter()
            .map(|link| JsonLink {
                direction: link.direction().as_str().to_string(),
                status: link.status().as_str().to_string(),
                other_id: link.other_id().to_string(),
            })
            .collect(),
    }
}
