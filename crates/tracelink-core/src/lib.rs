//! tracelink-core - Core library for requirement trace linking
//!
//! This crate takes already-imported specification items (requirements,
//! designs, implementations, tests, ...) and checks that they form a
//! consistent traceability graph:
//! - every artifact type an item needs is covered by some other item
//! - every coverage declaration points at an item that exists
//! - no item is covered twice by the same artifact type
//!
//! It performs no I/O and knows nothing about source formats; importers
//! build [`SpecificationItem`]s, [`link`] turns them into a [`Trace`], and
//! reporters render the trace.
//!
//! # Identifiers
//!
//! Items are named `<artifactType>~<name>~<revision>`:
//!
//! ```
//! use tracelink_core::Identifier;
//!
//! let id: Identifier = "req~login.timeout~2".parse().unwrap();
//! assert_eq!(id.artifact_type(), "req");
//! assert_eq!(id.to_string(), "req~login.timeout~2");
//! ```
//!
//! # Linking
//!
//! ```
//! use tracelink_core::{LinkStatus, SpecificationItem, link};
//!
//! let req = SpecificationItem::builder()
//!     .id("req~foo~1".parse().unwrap())
//!     .needs("dsn")
//!     .build()
//!     .unwrap();
//! let dsn = SpecificationItem::builder()
//!     .id("dsn~bar~1".parse().unwrap())
//!     .covers("req~foo~1".parse().unwrap())
//!     .build()
//!     .unwrap();
//!
//! let trace = link(vec![req, dsn]);
//! assert!(trace.has_no_defects());
//! assert_eq!(trace.items()[1].links()[0].status(), LinkStatus::Covers);
//! ```
//!
//! Linking holds no global state, so independent runs may execute on
//! separate threads.

mod identifier;
mod item;
mod link;
mod linked_item;
mod linker;
mod trace;

pub use identifier::{
    Identifier, IdentifierBuilder, IdentifierError, MAX_REVISION, Revision, SEPARATOR,
    WILDCARD_TOKEN,
};
pub use item::{ItemBuilder, ItemError, ItemStatus, Location, SpecificationItem};
pub use link::{ItemRef, LinkDirection, LinkStatus, TracedLink};
pub use linked_item::LinkedItem;
pub use linker::{Linker, link};
pub use trace::Trace;
