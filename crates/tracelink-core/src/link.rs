//! Link statuses and traced links between items

use crate::identifier::Identifier;
use facet::Facet;
use std::fmt::{Display, Formatter};

/// Classification of one resolved coverage edge.
///
/// Assigned once by the linker and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Facet)]
#[repr(u8)]
pub enum LinkStatus {
    /// Needed coverage with a pinned, current revision
    Covers,
    /// Needed coverage found through a wildcard revision
    CoveredShallow,
    /// Pinned revision is older than the target's revision
    Outdated,
    /// Pinned revision is newer than any existing revision of the target
    Predated,
    /// Target does not need coverage from the source's artifact type
    Unwanted,
    /// Target does not exist
    Orphaned,
    /// Ambiguous target identifier, or more than one cover of the same type
    Duplicate,
}

impl LinkStatus {
    /// `Covers` and `CoveredShallow` are the only good statuses
    pub fn is_good(&self) -> bool {
        matches!(self, LinkStatus::Covers | LinkStatus::CoveredShallow)
    }

    pub fn is_bad(&self) -> bool {
        !self.is_good()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LinkStatus::Covers => "COVERS",
            LinkStatus::CoveredShallow => "COVERED_SHALLOW",
            LinkStatus::Outdated => "OUTDATED",
            LinkStatus::Predated => "PREDATED",
            LinkStatus::Unwanted => "UNWANTED",
            LinkStatus::Orphaned => "ORPHANED",
            LinkStatus::Duplicate => "DUPLICATE",
        }
    }
}

impl Display for LinkStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which way a link points, seen from the item that holds it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Facet)]
#[repr(u8)]
pub enum LinkDirection {
    /// Holder covers the other end
    Outgoing,
    /// Other end covers the holder
    Incoming,
    /// Other end shares the holder's identifier
    Sibling,
}

impl LinkDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkDirection::Outgoing => "outgoing",
            LinkDirection::Incoming => "incoming",
            LinkDirection::Sibling => "sibling",
        }
    }
}

/// Position of a linked item inside its [`Trace`](crate::Trace)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemRef(pub(crate) usize);

impl ItemRef {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One end of a resolved edge, as seen from the item holding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracedLink {
    pub(crate) direction: LinkDirection,
    pub(crate) status: LinkStatus,
    pub(crate) declared_id: Option<Identifier>,
    pub(crate) other_id: Identifier,
    pub(crate) other: Option<ItemRef>,
}

impl TracedLink {
    pub fn direction(&self) -> LinkDirection {
        self.direction
    }

    pub fn status(&self) -> LinkStatus {
        self.status
    }

    pub fn is_outgoing(&self) -> bool {
        self.direction == LinkDirection::Outgoing
    }

    pub fn is_incoming(&self) -> bool {
        self.direction == LinkDirection::Incoming
    }

    /// Identifier as written in the covering item's declaration.
    ///
    /// `None` for sibling links, which have no declaration.
    pub fn declared_id(&self) -> Option<&Identifier> {
        self.declared_id.as_ref()
    }

    /// Identifier of the other end: the resolved item when there is one,
    /// otherwise the declared identifier.
    pub fn other_id(&self) -> &Identifier {
        &self.other_id
    }

    /// Arena position of the other end, `None` for orphaned links
    pub fn other(&self) -> Option<ItemRef> {
        self.other
    }
}
