//! Narrow the imported items before linking

use std::collections::BTreeSet;
use tracelink_core::SpecificationItem;

/// Selects which items take part in a trace.
///
/// With artifact types set, items of other types are dropped and those
/// types no longer count as needed coverage. With tags set, only items
/// carrying at least one of them are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    artifact_types: BTreeSet<String>,
    tags: BTreeSet<String>,
}

impl ItemFilter {
    pub fn new(
        artifact_types: impl IntoIterator<Item = impl Into<String>>,
        tags: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            artifact_types: artifact_types.into_iter().map(Into::into).collect(),
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.artifact_types.is_empty() && self.tags.is_empty()
    }

    pub fn apply(&self, items: Vec<SpecificationItem>) -> Vec<SpecificationItem> {
        if self.is_empty() {
            return items;
        }
        items
            .into_iter()
            .filter(|item| self.keeps(item))
            .map(|item| {
                if self.artifact_types.is_empty() {
                    item
                } else {
                    item.retain_needed_artifact_types(|t| self.artifact_types.contains(t))
                }
            })
            .collect()
    }

    fn keeps(&self, item: &SpecificationItem) -> bool {
        let type_wanted =
            self.artifact_types.is_empty() || self.artifact_types.contains(item.artifact_type());
        let tag_wanted =
            self.tags.is_empty() || item.tags().iter().any(|tag| self.tags.contains(tag));
        type_wanted && tag_wanted
    }
}
