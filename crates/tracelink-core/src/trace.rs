//! Aggregate result of a linking run

use crate::identifier::Identifier;
use crate::link::{ItemRef, TracedLink};
use crate::linked_item::LinkedItem;

/// All linked items of one run plus precomputed defect bookkeeping.
///
/// Immutable once built. Defect views are sorted by identifier, which is the
/// order reporters render in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace {
    items: Vec<LinkedItem>,
    defects: Vec<ItemRef>,
}

impl Trace {
    pub(crate) fn new(items: Vec<LinkedItem>) -> Self {
        let mut defects: Vec<ItemRef> = items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.is_defect())
            .map(|(index, _)| ItemRef(index))
            .collect();
        // stable: items sharing an identifier keep input order
        defects.sort_by(|a, b| items[a.0].id().cmp(items[b.0].id()));
        Self { items, defects }
    }

    /// Number of linked items
    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn count_defects(&self) -> usize {
        self.defects.len()
    }

    pub fn has_no_defects(&self) -> bool {
        self.defects.is_empty()
    }

    /// All items in input order
    pub fn items(&self) -> &[LinkedItem] {
        &self.items
    }

    /// Defective items sorted by identifier
    pub fn defect_items(&self) -> impl Iterator<Item = &LinkedItem> {
        self.defects.iter().map(|r| &self.items[r.0])
    }

    /// Identifiers of defective items, sorted
    pub fn defect_ids(&self) -> Vec<&Identifier> {
        self.defect_items().map(LinkedItem::id).collect()
    }

    pub fn get(&self, item: ItemRef) -> Option<&LinkedItem> {
        self.items.get(item.0)
    }

    /// The item at the other end of a link, if it exists
    pub fn resolve(&self, link: &TracedLink) -> Option<&LinkedItem> {
        link.other().and_then(|r| self.get(r))
    }

    /// Every item carrying exactly this identifier
    pub fn find<'a, 'b>(&'a self, id: &'b Identifier) -> impl Iterator<Item = &'a LinkedItem> {
        self.items.iter().filter(move |item| item.id() == id)
    }
}
