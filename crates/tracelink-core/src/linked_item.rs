//! Items augmented with their resolved links

use crate::identifier::Identifier;
use crate::item::{ItemStatus, Location, SpecificationItem};
use crate::link::{LinkDirection, LinkStatus, TracedLink};
use std::collections::BTreeSet;

/// A raw item plus everything the linker learned about it.
///
/// Other items are referenced by identifier and arena position only; resolve
/// them through the owning [`Trace`](crate::Trace).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedItem {
    pub(crate) item: SpecificationItem,
    pub(crate) links: Vec<TracedLink>,
    pub(crate) covered_artifact_types: BTreeSet<String>,
    pub(crate) uncovered_artifact_types: BTreeSet<String>,
    pub(crate) over_covered_artifact_types: BTreeSet<String>,
}

impl LinkedItem {
    pub(crate) fn new(item: SpecificationItem) -> Self {
        Self {
            item,
            links: Vec::new(),
            covered_artifact_types: BTreeSet::new(),
            uncovered_artifact_types: BTreeSet::new(),
            over_covered_artifact_types: BTreeSet::new(),
        }
    }

    pub fn item(&self) -> &SpecificationItem {
        &self.item
    }

    pub fn id(&self) -> &Identifier {
        self.item.id()
    }

    pub fn status(&self) -> ItemStatus {
        self.item.status()
    }

    pub fn title(&self) -> &str {
        self.item.title()
    }

    pub fn description(&self) -> &str {
        self.item.description()
    }

    pub fn tags(&self) -> &[String] {
        self.item.tags()
    }

    pub fn location(&self) -> Option<&Location> {
        self.item.location()
    }

    pub fn needed_artifact_types(&self) -> &BTreeSet<String> {
        self.item.needed_artifact_types()
    }

    /// Artifact types with at least one good incoming link
    pub fn covered_artifact_types(&self) -> &BTreeSet<String> {
        &self.covered_artifact_types
    }

    /// Needed artifact types without a good incoming link
    pub fn uncovered_artifact_types(&self) -> &BTreeSet<String> {
        &self.uncovered_artifact_types
    }

    /// Artifact types that cover this item without being needed, or that
    /// cover it more than once
    pub fn over_covered_artifact_types(&self) -> &BTreeSet<String> {
        &self.over_covered_artifact_types
    }

    /// All links in the order the linker resolved them
    pub fn links(&self) -> &[TracedLink] {
        &self.links
    }

    pub fn has_links(&self) -> bool {
        !self.links.is_empty()
    }

    pub fn count_incoming_links(&self) -> usize {
        self.count(|l| l.direction == LinkDirection::Incoming)
    }

    pub fn count_incoming_bad_links(&self) -> usize {
        self.count(|l| l.direction == LinkDirection::Incoming && l.status.is_bad())
    }

    pub fn count_outgoing_links(&self) -> usize {
        self.count(|l| l.direction == LinkDirection::Outgoing)
    }

    pub fn count_outgoing_bad_links(&self) -> usize {
        self.count(|l| l.direction == LinkDirection::Outgoing && l.status.is_bad())
    }

    /// Links of any direction marked [`LinkStatus::Duplicate`]
    pub fn count_duplicate_links(&self) -> usize {
        self.count(|l| l.status == LinkStatus::Duplicate)
    }

    /// Defective items have a bad or duplicate link, or miss needed coverage.
    pub fn is_defect(&self) -> bool {
        self.count_incoming_bad_links() > 0
            || self.count_outgoing_bad_links() > 0
            || self.count_duplicate_links() > 0
            || !self.uncovered_artifact_types.is_empty()
    }

    fn count(&self, predicate: impl Fn(&TracedLink) -> bool) -> usize {
        self.links.iter().filter(|&l| predicate(l)).count()
    }
}
