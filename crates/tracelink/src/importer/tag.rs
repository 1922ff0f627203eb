//! Coverage tags embedded in source files
//!
//! A tag is a bracketed arrow from the covering item to the covered one:
//!
//! ```text
//! // [impl->dsn~login.timeout~2]
//! // [impl~login-timer~1->dsn~login.timeout~2]
//! // [utest->dsn~login.timeout~2>>itest,review]
//! ```
//!
//! The left side is either a bare artifact type, in which case the item
//! name is generated, or a full identifier. Anything after `>>` lists the
//! artifact types the tag item itself needs.

use super::{ImportError, Importer, has_identifier_shape};
use std::path::Path;
use tracelink_core::{Identifier, SEPARATOR, SpecificationItem};

/// File extensions scanned for coverage tags.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "rs",     // Rust
    "swift",  // Swift
    "ts",     // TypeScript
    "tsx",    // TypeScript JSX
    "js",     // JavaScript
    "jsx",    // JavaScript JSX
    "go",     // Go
    "c",      // C
    "h",      // C headers
    "cpp",    // C++
    "hpp",    // C++ headers
    "cc",     // C++
    "cxx",    // C++
    "java",   // Java
    "kt",     // Kotlin
    "scala",  // Scala
    "groovy", // Groovy
    "cs",     // C#
    "zig",    // Zig
    "php",    // PHP
    "py",     // Python
    "rb",     // Ruby
    "lua",    // Lua
    "pl",     // Perl
    "hs",     // Haskell
    "ex",     // Elixir
    "exs",    // Elixir script
    "erl",    // Erlang
    "clj",    // Clojure
    "fs",     // F#
    "ml",     // OCaml
    "sql",    // SQL
    "sh",     // Shell/Bash
    "bash",   // Bash
    "zsh",    // Zsh
    "toml",   // TOML
    "yaml",   // YAML
    "yml",    // YAML
    "json",   // JSON
];

const ARROW: &str = "->";
const NEEDS_MARKER: &str = ">>";

/// Reads coverage tags from source code
pub struct TagImporter;

impl Importer for TagImporter {
    fn name(&self) -> &'static str {
        "tag"
    }

    fn supports(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext))
    }

    fn import(&self, file: &str, content: &str) -> Result<Vec<SpecificationItem>, ImportError> {
        let mut items = Vec::new();
        let mut ordinal = 0usize;

        for (index, line) in content.lines().enumerate() {
            let line_number = index + 1;
            for tag in bracketed(line) {
                let Some(tag) = Tag::split(tag) else {
                    continue;
                };
                let item = tag.into_item(file, line_number, ordinal)?;
                ordinal += 1;
                items.push(item);
            }
        }

        Ok(items)
    }
}

/// Contents of every `[...]` on the line, left to right
fn bracketed(line: &str) -> impl Iterator<Item = &str> {
    let mut rest = line;
    std::iter::from_fn(move || {
        loop {
            let open = rest.find('[')?;
            let after = &rest[open + 1..];
            let close = after.find(']')?;
            let inner = &after[..close];
            // "[[a->b~c~1]" should still find the tag
            if let Some(nested) = inner.rfind('[') {
                rest = &after[nested..];
                continue;
            }
            rest = &after[close + 1..];
            return Some(inner);
        }
    })
}

/// Borrowed pieces of one tag, not yet validated
struct Tag<'a> {
    covering: &'a str,
    covered: &'a str,
    needs: Option<&'a str>,
}

impl<'a> Tag<'a> {
    /// Recognize the shape of a tag. Text that merely contains brackets
    /// (array indexing, markdown links) yields `None`.
    fn split(inner: &'a str) -> Option<Self> {
        let inner = inner.trim();
        let (covering, rest) = inner.split_once(ARROW)?;
        let (covered, needs) = match rest.split_once(NEEDS_MARKER) {
            Some((covered, needs)) => (covered, Some(needs)),
            None => (rest, None),
        };
        let covering = covering.trim();
        let covered = covered.trim();

        if !has_identifier_shape(covered) {
            return None;
        }
        let covering_is_type =
            !covering.is_empty() && covering.bytes().all(|b| b.is_ascii_lowercase());
        if !covering_is_type && !has_identifier_shape(covering) {
            return None;
        }

        Some(Self {
            covering,
            covered,
            needs,
        })
    }

    fn into_item(
        self,
        file: &str,
        line: usize,
        ordinal: usize,
    ) -> Result<SpecificationItem, ImportError> {
        let identifier_error = |source| ImportError::Identifier {
            file: file.to_string(),
            line,
            source,
        };

        let covered = Identifier::parse(self.covered).map_err(identifier_error)?;
        let id = if self.covering.contains(SEPARATOR) {
            Identifier::parse(self.covering).map_err(identifier_error)?
        } else {
            let name = generated_name(covered.name(), file, line, ordinal);
            Identifier::new(self.covering, name, 0).map_err(identifier_error)?
        };

        let mut builder = SpecificationItem::builder();
        builder.id(id).location(file, line).covers(covered);
        for artifact_type in self
            .needs
            .into_iter()
            .flat_map(|needs| needs.split(','))
            .map(str::trim)
            .filter(|t| !t.is_empty())
        {
            builder.needs(artifact_type);
        }

        builder.build().map_err(|source| ImportError::Item {
            file: file.to_string(),
            line,
            source,
        })
    }
}

/// `<covered name>-<8 hex digits>`, stable for a given file position
fn generated_name(covered_name: &str, file: &str, line: usize, ordinal: usize) -> String {
    let hash = blake3::hash(format!("{file}:{line}:{ordinal}").as_bytes());
    format!("{covered_name}-{}", &hash.to_hex()[..8])
}
