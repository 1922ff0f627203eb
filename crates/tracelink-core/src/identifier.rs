use facet::Facet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

/// Separator between the three parts of an identifier.
pub const SEPARATOR: char = '~';

/// Revision token printed for wildcard identifiers. Never accepted by [`Identifier::parse`].
pub const WILDCARD_TOKEN: &str = "*";

/// Largest revision an identifier can carry (the signed 32-bit range).
pub const MAX_REVISION: u32 = i32::MAX as u32;

/// Errors produced while parsing or building an [`Identifier`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    /// The text does not follow `<artifactType>~<name>~<revision>`.
    #[error("malformed specification item identifier \"{text}\": {reason}")]
    Malformed { text: String, reason: &'static str },

    /// The text spells out the wildcard revision, which only exists in memory.
    #[error("specification item identifier \"{text}\" uses the reserved wildcard revision")]
    InvalidState { text: String },

    /// A builder field failed validation.
    #[error("invalid {field} \"{value}\": {reason}")]
    Invalid {
        field: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Revision part of an identifier.
///
/// Concrete revisions order numerically; the wildcard sorts after all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Facet)]
#[repr(u8)]
pub enum Revision {
    /// A concrete, non-negative revision.
    Number(u32),
    /// "Whatever the latest revision is", resolved at link time.
    Wildcard,
}

impl Display for Revision {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Revision::Number(n) => write!(f, "{n}"),
            Revision::Wildcard => f.write_str(WILDCARD_TOKEN),
        }
    }
}

/// Canonical `(artifactType, name, revision)` triple naming a specification item.
///
/// Ordering is by artifact type, then name, then revision.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Facet)]
pub struct Identifier {
    artifact_type: String,
    name: String,
    revision: Revision,
}

impl Identifier {
    /// Build a concrete identifier, validating every part.
    pub fn new(
        artifact_type: impl Into<String>,
        name: impl Into<String>,
        revision: u32,
    ) -> Result<Self, IdentifierError> {
        Self::builder()
            .artifact_type(artifact_type)
            .name(name)
            .revision(revision)
            .build()
    }

    pub fn builder() -> IdentifierBuilder {
        IdentifierBuilder::default()
    }

    /// Parse `<artifactType>~<name>~<revision>`.
    ///
    /// Text carrying the wildcard token is rejected with
    /// [`IdentifierError::InvalidState`]; wildcards are only produced by
    /// [`Identifier::to_wildcard`].
    pub fn parse(text: &str) -> Result<Self, IdentifierError> {
        let malformed = |reason| IdentifierError::Malformed {
            text: text.to_string(),
            reason,
        };

        let mut parts = text.split(SEPARATOR);
        let (Some(artifact_type), Some(name), Some(revision), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(malformed("expected <artifact type>~<name>~<revision>"));
        };

        if let Some(reason) = artifact_type_violation(artifact_type) {
            return Err(malformed(reason));
        }
        if let Some(reason) = name_violation(name) {
            return Err(malformed(reason));
        }
        if revision == WILDCARD_TOKEN {
            return Err(IdentifierError::InvalidState {
                text: text.to_string(),
            });
        }
        let revision = parse_revision(revision)
            .ok_or_else(|| malformed("revision must be a decimal number from 0 to 2147483647"))?;

        Ok(Self {
            artifact_type: artifact_type.to_string(),
            name: name.to_string(),
            revision: Revision::Number(revision),
        })
    }

    pub fn artifact_type(&self) -> &str {
        &self.artifact_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn revision(&self) -> Revision {
        self.revision
    }

    /// The concrete revision, or `None` for a wildcard.
    pub fn revision_number(&self) -> Option<u32> {
        match self.revision {
            Revision::Number(n) => Some(n),
            Revision::Wildcard => None,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        self.revision == Revision::Wildcard
    }

    /// Copy of this identifier that means "any revision of this name".
    pub fn to_wildcard(&self) -> Self {
        Self {
            artifact_type: self.artifact_type.clone(),
            name: self.name.clone(),
            revision: Revision::Wildcard,
        }
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{SEPARATOR}{}{SEPARATOR}{}",
            self.artifact_type, self.name, self.revision
        )
    }
}

impl FromStr for Identifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Staged builder for [`Identifier`]; validation happens in [`IdentifierBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct IdentifierBuilder {
    artifact_type: Option<String>,
    name: Option<String>,
    revision: Option<RevisionInput>,
}

#[derive(Debug, Clone, Copy)]
enum RevisionInput {
    Number(u32),
    Wildcard,
}

impl IdentifierBuilder {
    pub fn artifact_type(mut self, artifact_type: impl Into<String>) -> Self {
        self.artifact_type = Some(artifact_type.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn revision(mut self, revision: u32) -> Self {
        self.revision = Some(RevisionInput::Number(revision));
        self
    }

    pub fn revision_wildcard(mut self) -> Self {
        self.revision = Some(RevisionInput::Wildcard);
        self
    }

    pub fn build(self) -> Result<Identifier, IdentifierError> {
        let artifact_type = self.artifact_type.unwrap_or_default();
        if let Some(reason) = artifact_type_violation(&artifact_type) {
            return Err(IdentifierError::Invalid {
                field: "artifact type",
                value: artifact_type,
                reason,
            });
        }

        let name = self.name.unwrap_or_default();
        if let Some(reason) = name_violation(&name) {
            return Err(IdentifierError::Invalid {
                field: "name",
                value: name,
                reason,
            });
        }

        let revision = match self.revision {
            None => {
                return Err(IdentifierError::Invalid {
                    field: "revision",
                    value: String::new(),
                    reason: "revision is required",
                });
            }
            Some(RevisionInput::Number(n)) if n > MAX_REVISION => {
                return Err(IdentifierError::Invalid {
                    field: "revision",
                    value: n.to_string(),
                    reason: "revision exceeds 2147483647",
                });
            }
            Some(RevisionInput::Number(n)) => Revision::Number(n),
            Some(RevisionInput::Wildcard) => Revision::Wildcard,
        };

        Ok(Identifier {
            artifact_type,
            name,
            revision,
        })
    }
}

fn artifact_type_violation(artifact_type: &str) -> Option<&'static str> {
    if artifact_type.is_empty() {
        Some("artifact type is empty")
    } else if !artifact_type.bytes().all(|b| b.is_ascii_lowercase()) {
        Some("artifact type may only contain lowercase letters")
    } else {
        None
    }
}

fn name_violation(name: &str) -> Option<&'static str> {
    let Some(first) = name.chars().next() else {
        return Some("name is empty");
    };
    if !first.is_ascii_alphabetic() {
        return Some("name must start with a letter");
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return Some("name may only contain letters, digits, '.', '_' and '-'");
    }
    None
}

fn parse_revision(text: &str) -> Option<u32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // i32 keeps the range identical to other tools reading the same files
    text.parse::<i32>().ok().map(|n| n as u32)
}
