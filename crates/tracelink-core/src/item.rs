//! Raw specification items as delivered by importers

use crate::identifier::Identifier;
use facet::Facet;
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Lifecycle status of a specification item
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Facet)]
#[repr(u8)]
pub enum ItemStatus {
    #[default]
    Approved,
    Proposed,
    Draft,
    Rejected,
}

impl ItemStatus {
    /// Parse a status keyword (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "approved" => Some(ItemStatus::Approved),
            "proposed" => Some(ItemStatus::Proposed),
            "draft" => Some(ItemStatus::Draft),
            "rejected" => Some(ItemStatus::Rejected),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Approved => "approved",
            ItemStatus::Proposed => "proposed",
            ItemStatus::Draft => "draft",
            ItemStatus::Rejected => "rejected",
        }
    }
}

impl Display for ItemStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an item was found. Only used for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Facet)]
pub struct Location {
    /// Source file path as given by the importer
    pub path: String,
    /// Line number (1-indexed)
    pub line: usize,
}

impl Location {
    pub fn new(path: impl Into<String>, line: usize) -> Self {
        Self {
            path: path.into(),
            line,
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.path, self.line)
    }
}

/// Errors raised by [`ItemBuilder::build`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemError {
    #[error("specification item has no identifier")]
    MissingId,
    #[error("specification item {id} must have a concrete revision")]
    WildcardRevision { id: Identifier },
}

/// One traceable unit, immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecificationItem {
    id: Identifier,
    location: Option<Location>,
    status: ItemStatus,
    title: String,
    description: String,
    rationale: String,
    comment: String,
    tags: Vec<String>,
    needed_artifact_types: BTreeSet<String>,
    covered_ids: Vec<Identifier>,
    depends_on_ids: Vec<Identifier>,
}

impl SpecificationItem {
    pub fn builder() -> ItemBuilder {
        ItemBuilder::new()
    }

    pub fn id(&self) -> &Identifier {
        &self.id
    }

    pub fn artifact_type(&self) -> &str {
        self.id.artifact_type()
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    pub fn status(&self) -> ItemStatus {
        self.status
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn rationale(&self) -> &str {
        &self.rationale
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Artifact types this item requires coverage from
    pub fn needed_artifact_types(&self) -> &BTreeSet<String> {
        &self.needed_artifact_types
    }

    pub fn needs_artifact_type(&self, artifact_type: &str) -> bool {
        self.needed_artifact_types.contains(artifact_type)
    }

    /// Items this one claims to cover (outgoing coverage declarations)
    pub fn covered_ids(&self) -> &[Identifier] {
        &self.covered_ids
    }

    /// Advisory dependencies; not part of coverage classification
    pub fn depends_on_ids(&self) -> &[Identifier] {
        &self.depends_on_ids
    }

    /// Copy of this item restricted to the given needed artifact types.
    ///
    /// Used by filters that drop whole artifact types from a run.
    pub fn retain_needed_artifact_types(&self, keep: impl Fn(&str) -> bool) -> Self {
        let mut item = self.clone();
        item.needed_artifact_types.retain(|t| keep(t));
        item
    }
}

/// Staged builder for [`SpecificationItem`].
///
/// Multi-line texts are append-only and joined with the configured line
/// separator. Validation runs in [`ItemBuilder::build`].
#[derive(Debug, Clone)]
pub struct ItemBuilder {
    line_separator: String,
    id: Option<Identifier>,
    location: Option<Location>,
    status: ItemStatus,
    title: String,
    description: String,
    rationale: String,
    comment: String,
    tags: Vec<String>,
    needed_artifact_types: BTreeSet<String>,
    covered_ids: Vec<Identifier>,
    depends_on_ids: Vec<Identifier>,
}

impl Default for ItemBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemBuilder {
    pub fn new() -> Self {
        Self {
            line_separator: "\n".to_string(),
            id: None,
            location: None,
            status: ItemStatus::default(),
            title: String::new(),
            description: String::new(),
            rationale: String::new(),
            comment: String::new(),
            tags: Vec::new(),
            needed_artifact_types: BTreeSet::new(),
            covered_ids: Vec::new(),
            depends_on_ids: Vec::new(),
        }
    }

    /// Separator placed between appended text fragments (default `"\n"`)
    pub fn line_separator(&mut self, separator: impl Into<String>) -> &mut Self {
        self.line_separator = separator.into();
        self
    }

    pub fn id(&mut self, id: Identifier) -> &mut Self {
        self.id = Some(id);
        self
    }

    pub fn location(&mut self, path: impl Into<String>, line: usize) -> &mut Self {
        self.location = Some(Location::new(path, line));
        self
    }

    pub fn status(&mut self, status: ItemStatus) -> &mut Self {
        self.status = status;
        self
    }

    pub fn title(&mut self, title: impl Into<String>) -> &mut Self {
        self.title = title.into();
        self
    }

    pub fn append_description(&mut self, text: &str) -> &mut Self {
        append(&mut self.description, &self.line_separator, text);
        self
    }

    pub fn append_rationale(&mut self, text: &str) -> &mut Self {
        append(&mut self.rationale, &self.line_separator, text);
        self
    }

    pub fn append_comment(&mut self, text: &str) -> &mut Self {
        append(&mut self.comment, &self.line_separator, text);
        self
    }

    pub fn tag(&mut self, tag: impl Into<String>) -> &mut Self {
        self.tags.push(tag.into());
        self
    }

    pub fn needs(&mut self, artifact_type: impl Into<String>) -> &mut Self {
        self.needed_artifact_types.insert(artifact_type.into());
        self
    }

    pub fn covers(&mut self, id: Identifier) -> &mut Self {
        self.covered_ids.push(id);
        self
    }

    pub fn depends_on(&mut self, id: Identifier) -> &mut Self {
        self.depends_on_ids.push(id);
        self
    }

    pub fn build(&self) -> Result<SpecificationItem, ItemError> {
        let id = self.id.clone().ok_or(ItemError::MissingId)?;
        if id.is_wildcard() {
            return Err(ItemError::WildcardRevision { id });
        }
        Ok(SpecificationItem {
            id,
            location: self.location.clone(),
            status: self.status,
            title: self.title.clone(),
            description: self.description.clone(),
            rationale: self.rationale.clone(),
            comment: self.comment.clone(),
            tags: self.tags.clone(),
            needed_artifact_types: self.needed_artifact_types.clone(),
            covered_ids: self.covered_ids.clone(),
            depends_on_ids: self.depends_on_ids.clone(),
        })
    }
}

fn append(target: &mut String, separator: &str, text: &str) {
    if !target.is_empty() {
        target.push_str(separator);
    }
    target.push_str(text);
}
