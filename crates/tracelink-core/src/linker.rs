//! Resolves coverage declarations into a classified trace graph

use crate::identifier::Identifier;
use crate::item::SpecificationItem;
use crate::link::{ItemRef, LinkDirection, LinkStatus, TracedLink};
use crate::linked_item::LinkedItem;
use crate::trace::Trace;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tracing::{debug, warn};

/// Link a complete set of raw items into a [`Trace`].
///
/// Never fails: every anomaly in the input becomes a link status.
pub fn link(items: Vec<SpecificationItem>) -> Trace {
    Linker::new(items).link()
}

/// Single-use linker owning one run's items and their read-only indexes.
pub struct Linker {
    items: Vec<SpecificationItem>,
    /// concrete identifier -> every item carrying it
    by_id: HashMap<Identifier, Vec<usize>>,
    /// wildcard identifier -> items at the highest revision of that name
    latest: HashMap<Identifier, Latest>,
}

struct Latest {
    revision: u32,
    items: Vec<usize>,
}

struct Edge {
    source: usize,
    declared: Identifier,
    target: Option<usize>,
    /// final once over-coverage has been marked
    status: LinkStatus,
}

impl Linker {
    pub fn new(items: Vec<SpecificationItem>) -> Self {
        let mut by_id: HashMap<Identifier, Vec<usize>> = HashMap::with_capacity(items.len());
        let mut latest: HashMap<Identifier, Latest> = HashMap::new();

        for (index, item) in items.iter().enumerate() {
            by_id.entry(item.id().clone()).or_default().push(index);

            let Some(revision) = item.id().revision_number() else {
                continue;
            };
            match latest.entry(item.id().to_wildcard()) {
                Entry::Vacant(entry) => {
                    entry.insert(Latest {
                        revision,
                        items: vec![index],
                    });
                }
                Entry::Occupied(mut entry) => {
                    let current = entry.get_mut();
                    match revision.cmp(&current.revision) {
                        Ordering::Greater => {
                            current.revision = revision;
                            current.items = vec![index];
                        }
                        Ordering::Equal => current.items.push(index),
                        Ordering::Less => {}
                    }
                }
            }
        }

        debug!(
            items = items.len(),
            distinct_ids = by_id.len(),
            "indexed specification items"
        );

        Self {
            items,
            by_id,
            latest,
        }
    }

    pub fn link(self) -> Trace {
        let mut edges = self.resolve_edges();
        let over_covered = self.mark_over_coverage(&mut edges);
        debug!(edges = edges.len(), "resolved coverage edges");

        let trace = Trace::new(self.assemble(edges, over_covered));
        debug!(
            items = trace.count(),
            defects = trace.count_defects(),
            "linked trace"
        );
        trace
    }

    fn resolve_edges(&self) -> Vec<Edge> {
        let mut edges = Vec::new();
        for (source, item) in self.items.iter().enumerate() {
            for declared in item.covered_ids() {
                self.resolve_edge(source, declared, &mut edges);
            }
        }
        edges
    }

    fn resolve_edge(&self, source: usize, declared: &Identifier, edges: &mut Vec<Edge>) {
        let (targets, via_wildcard) = if declared.is_wildcard() {
            (self.latest_items(declared), true)
        } else if let Some(exact) = self.by_id.get(declared) {
            (exact.as_slice(), false)
        } else {
            // name exists under another revision: outdated or predated
            (self.latest_items(&declared.to_wildcard()), false)
        };

        if targets.is_empty() {
            edges.push(Edge {
                source,
                declared: declared.clone(),
                target: None,
                status: LinkStatus::Orphaned,
            });
            return;
        }

        let ambiguous = targets.len() > 1;
        for &target in targets {
            let status = if ambiguous {
                LinkStatus::Duplicate
            } else {
                self.classify(source, declared, target, via_wildcard)
            };
            edges.push(Edge {
                source,
                declared: declared.clone(),
                target: Some(target),
                status,
            });
        }
    }

    fn latest_items(&self, wildcard: &Identifier) -> &[usize] {
        self.latest
            .get(wildcard)
            .map_or(&[][..], |latest| latest.items.as_slice())
    }

    fn classify(
        &self,
        source: usize,
        declared: &Identifier,
        target: usize,
        via_wildcard: bool,
    ) -> LinkStatus {
        let covering_type = self.items[source].artifact_type();
        let covered = &self.items[target];

        if !covered.needs_artifact_type(covering_type) {
            return LinkStatus::Unwanted;
        }

        match (declared.revision_number(), covered.id().revision_number()) {
            (Some(declared), Some(current)) if declared < current => LinkStatus::Outdated,
            (Some(declared), Some(current)) if declared > current => LinkStatus::Predated,
            _ if via_wildcard => LinkStatus::CoveredShallow,
            _ => LinkStatus::Covers,
        }
    }

    /// A target accepts one good edge per covering artifact type. When more
    /// arrive, all of them become duplicates and the type is over-covered.
    fn mark_over_coverage(&self, edges: &mut [Edge]) -> Vec<(usize, String)> {
        let mut groups: HashMap<(usize, &str), Vec<usize>> = HashMap::new();
        for (index, edge) in edges.iter().enumerate() {
            if let Some(target) = edge.target
                && edge.status.is_good()
            {
                let covering_type = self.items[edge.source].artifact_type();
                groups.entry((target, covering_type)).or_default().push(index);
            }
        }

        let mut over_covered = Vec::new();
        for ((target, covering_type), group) in groups {
            if group.len() < 2 {
                continue;
            }
            for index in group {
                edges[index].status = LinkStatus::Duplicate;
            }
            over_covered.push((target, covering_type.to_string()));
        }
        over_covered
    }

    fn assemble(self, edges: Vec<Edge>, over_covered: Vec<(usize, String)>) -> Vec<LinkedItem> {
        let Linker { items, by_id, .. } = self;
        let mut linked: Vec<LinkedItem> = items.into_iter().map(LinkedItem::new).collect();

        for edge in edges {
            let source_id = linked[edge.source].id().clone();
            let other_id = match edge.target {
                Some(target) => linked[target].id().clone(),
                None => edge.declared.clone(),
            };

            if let Some(target) = edge.target {
                let covering_type = source_id.artifact_type().to_string();
                let covered = &mut linked[target];
                if edge.status.is_good() {
                    covered.covered_artifact_types.insert(covering_type);
                } else if edge.status == LinkStatus::Unwanted {
                    covered.over_covered_artifact_types.insert(covering_type);
                }
                covered.links.push(TracedLink {
                    direction: LinkDirection::Incoming,
                    status: edge.status,
                    declared_id: Some(edge.declared.clone()),
                    other_id: source_id,
                    other: Some(ItemRef(edge.source)),
                });
            }

            linked[edge.source].links.push(TracedLink {
                direction: LinkDirection::Outgoing,
                status: edge.status,
                declared_id: Some(edge.declared),
                other_id,
                other: edge.target.map(ItemRef),
            });
        }

        for (target, covering_type) in over_covered {
            linked[target].over_covered_artifact_types.insert(covering_type);
        }

        for index in 0..linked.len() {
            let Some(group) = by_id.get(linked[index].id()) else {
                continue;
            };
            if group.len() < 2 {
                continue;
            }
            if group[0] == index {
                warn!(
                    "specification item id {} is defined {} times",
                    linked[index].id(),
                    group.len()
                );
            }
            for &other in group.iter().filter(|&&other| other != index) {
                let other_id = linked[other].id().clone();
                linked[index].links.push(TracedLink {
                    direction: LinkDirection::Sibling,
                    status: LinkStatus::Duplicate,
                    declared_id: None,
                    other_id,
                    other: Some(ItemRef(other)),
                });
            }
        }

        for item in &mut linked {
            item.uncovered_artifact_types = item
                .item
                .needed_artifact_types()
                .difference(&item.covered_artifact_types)
                .cloned()
                .collect();
        }

        linked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemBuilder;

    fn id(s: &str) -> Identifier {
        Identifier::parse(s).expect("valid id")
    }

    #[test]
    fn empty_input_yields_empty_trace() {
        let trace = link(Vec::new());
        assert_eq!(trace.count(), 0);
        assert!(trace.has_no_defects());
    }

    #[test]
    fn latest_index_keeps_only_highest_revision() {
        let items = ["req~x~1", "req~x~3", "req~x~2"]
            .into_iter()
            .map(|s| ItemBuilder::new().id(id(s)).build().expect("builds"))
            .collect();
        let linker = Linker::new(items);
        assert_eq!(linker.latest_items(&id("req~x~9").to_wildcard()), &[1]);
        assert!(linker.latest_items(&id("req~y~1").to_wildcard()).is_empty());
    }

    #[test]
    fn self_coverage_follows_normal_rules() {
        let wanted = ItemBuilder::new()
            .id(id("req~self~1"))
            .needs("req")
            .covers(id("req~self~1"))
            .build()
            .expect("builds");
        let trace = link(vec![wanted]);
        let item = &trace.items()[0];
        assert_eq!(item.links().len(), 2);
        assert!(item.links().iter().all(|l| l.status() == LinkStatus::Covers));
        assert!(trace.has_no_defects());

        let unwanted = ItemBuilder::new()
            .id(id("dsn~self~1"))
            .covers(id("dsn~self~1"))
            .build()
            .expect("builds");
        let trace = link(vec![unwanted]);
        assert!(
            trace.items()[0]
                .links()
                .iter()
                .all(|l| l.status() == LinkStatus::Unwanted)
        );
        assert_eq!(trace.count_defects(), 1);
    }
}
