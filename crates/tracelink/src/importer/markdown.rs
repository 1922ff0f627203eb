//! Specification items written in markdown
//!
//! ```markdown
//! ### Login timeout
//! `dsn~login.timeout~2`
//!
//! Sessions expire after 15 minutes without input.
//!
//! Rationale:
//! Shared terminals in the lab.
//!
//! Covers:
//! * `req~session.security~1`
//!
//! Needs: impl, utest
//! Tags: security
//! ```
//!
//! An identifier alone on a line starts an item. A heading directly above
//! it becomes the title. Lines that follow are description until a section
//! keyword switches the target; the next heading or identifier ends the item.

use super::{ImportError, Importer, has_identifier_shape};
use std::path::Path;
use tracelink_core::{Identifier, IdentifierError, ItemBuilder, ItemStatus, SpecificationItem};
use tracing::warn;

/// Reads specification items from markdown documents
pub struct MarkdownImporter;

impl Importer for MarkdownImporter {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn supports(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("markdown")
            })
    }

    fn import(&self, file: &str, content: &str) -> Result<Vec<SpecificationItem>, ImportError> {
        let mut parser = Parser {
            file,
            items: Vec::new(),
            current: None,
            pending_title: None,
            in_fence: false,
        };
        for (index, line) in content.lines().enumerate() {
            parser.line(index + 1, line)?;
        }
        parser.finish()?;
        Ok(parser.items)
    }
}

/// Where text lines of the current item go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Description,
    Rationale,
    Comment,
    Covers,
    Depends,
}

struct Draft {
    line: usize,
    builder: ItemBuilder,
    section: Section,
    description: Vec<String>,
    rationale: Vec<String>,
    comment: Vec<String>,
}

impl Draft {
    fn text_mut(&mut self) -> Option<&mut Vec<String>> {
        match self.section {
            Section::Description => Some(&mut self.description),
            Section::Rationale => Some(&mut self.rationale),
            Section::Comment => Some(&mut self.comment),
            Section::Covers | Section::Depends => None,
        }
    }
}

struct Parser<'a> {
    file: &'a str,
    items: Vec<SpecificationItem>,
    current: Option<Draft>,
    /// Heading seen since the last content line
    pending_title: Option<String>,
    in_fence: bool,
}

impl Parser<'_> {
    fn line(&mut self, number: usize, line: &str) -> Result<(), ImportError> {
        let trimmed = line.trim();

        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            self.in_fence = !self.in_fence;
            self.text(line);
            return Ok(());
        }
        if self.in_fence {
            self.text(line);
            return Ok(());
        }

        if let Some(heading) = heading(trimmed) {
            self.finish()?;
            self.pending_title = Some(heading.to_string());
            return Ok(());
        }

        if let Some(text) = identifier_candidate(trimmed) {
            let id = Identifier::parse(text)
                .map_err(|source| identifier_error(self.file, number, source))?;
            self.finish()?;
            let mut builder = SpecificationItem::builder();
            builder.id(id).location(self.file, number);
            if let Some(title) = self.pending_title.take() {
                builder.title(title);
            }
            self.current = Some(Draft {
                line: number,
                builder,
                section: Section::Description,
                description: Vec::new(),
                rationale: Vec::new(),
                comment: Vec::new(),
            });
            return Ok(());
        }

        if !trimmed.is_empty() {
            self.pending_title = None;
        }
        let file = self.file;
        let Some(draft) = self.current.as_mut() else {
            return Ok(());
        };

        if let Some((keyword, rest)) = keyword(trimmed) {
            let rest = rest.trim();
            match keyword {
                Keyword::Rationale => start_text(draft, Section::Rationale, rest),
                Keyword::Comment => start_text(draft, Section::Comment, rest),
                Keyword::Covers => draft.section = Section::Covers,
                Keyword::Depends => draft.section = Section::Depends,
                Keyword::Needs => {
                    for artifact_type in split_list(rest) {
                        draft.builder.needs(artifact_type);
                    }
                    draft.section = Section::Description;
                }
                Keyword::Tags => {
                    for tag in split_list(rest) {
                        draft.builder.tag(tag);
                    }
                    draft.section = Section::Description;
                }
                Keyword::Status => {
                    match ItemStatus::parse(rest) {
                        Some(status) => {
                            draft.builder.status(status);
                        }
                        None => warn!(
                            "{file}:{number}: unknown item status \"{rest}\", keeping approved"
                        ),
                    }
                    draft.section = Section::Description;
                }
            }
            return Ok(());
        }

        if matches!(draft.section, Section::Covers | Section::Depends) {
            if let Some(entry) = bullet(trimmed) {
                let Some(text) = referenced_id(entry) else {
                    return Ok(());
                };
                let id = Identifier::parse(text)
                    .map_err(|source| identifier_error(file, number, source))?;
                if draft.section == Section::Covers {
                    draft.builder.covers(id);
                } else {
                    draft.builder.depends_on(id);
                }
                return Ok(());
            }
            if trimmed.is_empty() {
                return Ok(());
            }
            draft.section = Section::Description;
        }

        self.text(line);
        Ok(())
    }

    fn text(&mut self, line: &str) {
        if let Some(target) = self.current.as_mut().and_then(Draft::text_mut) {
            target.push(line.trim_end().to_string());
        }
    }

    fn finish(&mut self) -> Result<(), ImportError> {
        let Some(mut draft) = self.current.take() else {
            return Ok(());
        };
        for line in trim_blank(&draft.description) {
            draft.builder.append_description(line);
        }
        for line in trim_blank(&draft.rationale) {
            draft.builder.append_rationale(line);
        }
        for line in trim_blank(&draft.comment) {
            draft.builder.append_comment(line);
        }
        let item = draft.builder.build().map_err(|source| ImportError::Item {
            file: self.file.to_string(),
            line: draft.line,
            source,
        })?;
        self.items.push(item);
        Ok(())
    }
}

fn identifier_error(file: &str, line: usize, source: IdentifierError) -> ImportError {
    ImportError::Identifier {
        file: file.to_string(),
        line,
        source,
    }
}

fn start_text(draft: &mut Draft, section: Section, rest: &str) {
    draft.section = section;
    if !rest.is_empty()
        && let Some(target) = draft.text_mut()
    {
        target.push(rest.to_string());
    }
}

fn heading(trimmed: &str) -> Option<&str> {
    let text = trimmed.trim_start_matches('#');
    let level = trimmed.len() - text.len();
    if level == 0 || level > 6 || !(text.is_empty() || text.starts_with(' ')) {
        return None;
    }
    Some(text.trim())
}

/// A line that is meant to be an identifier, optionally wrapped in backticks
fn identifier_candidate(trimmed: &str) -> Option<&str> {
    let text = trimmed
        .strip_prefix('`')
        .and_then(|t| t.strip_suffix('`'))
        .unwrap_or(trimmed);
    has_identifier_shape(text).then_some(text)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    Rationale,
    Comment,
    Needs,
    Covers,
    Depends,
    Tags,
    Status,
}

/// Recognize `Keyword:` at the start of a line, case-insensitively
fn keyword(trimmed: &str) -> Option<(Keyword, &str)> {
    const KEYWORDS: &[(&str, Keyword)] = &[
        ("rationale", Keyword::Rationale),
        ("comment", Keyword::Comment),
        ("needs", Keyword::Needs),
        ("covers", Keyword::Covers),
        ("depends", Keyword::Depends),
        ("tags", Keyword::Tags),
        ("status", Keyword::Status),
    ];
    let (head, rest) = trimmed.split_once(':')?;
    let head = head.trim();
    KEYWORDS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(head))
        .map(|&(_, keyword)| (keyword, rest))
}

fn bullet(trimmed: &str) -> Option<&str> {
    ["* ", "- ", "+ "]
        .iter()
        .find_map(|marker| trimmed.strip_prefix(marker))
        .map(str::trim)
}

/// The identifier inside a list entry: `[text](#id)`, `` `id` `` or bare
fn referenced_id(entry: &str) -> Option<&str> {
    if let Some(start) = entry.find("](#") {
        let target = &entry[start + 3..];
        return target.find(')').map(|end| &target[..end]);
    }
    if let Some(start) = entry.find('`') {
        let rest = &entry[start + 1..];
        return rest.find('`').map(|end| &rest[..end]);
    }
    entry.split_whitespace().find(|token| has_identifier_shape(token))
}

fn split_list(text: &str) -> impl Iterator<Item = &str> {
    text.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn trim_blank(lines: &[String]) -> &[String] {
    let start = lines.iter().position(|l| !l.is_empty()).unwrap_or(lines.len());
    let end = lines.iter().rposition(|l| !l.is_empty()).map_or(start, |i| i + 1);
    &lines[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn import(content: &str) -> Vec<SpecificationItem> {
        MarkdownImporter
            .import("doc/spec.md", content)
            .expect("import succeeds")
    }

    fn ids(ids: &[Identifier]) -> Vec<String> {
        ids.iter().map(ToString::to_string).collect()
    }

    const SPEC: &str = r#"# System requirements

## Login timeout
`req~login.timeout~1`

Sessions expire after 15 minutes
without user input.

Rationale:
Shared terminals in the lab.

Needs: dsn, utest
Tags: security, session
Status: proposed

### Timer
dsn~login-timer~2

Covers:
* `req~login.timeout~1`
- [the timeout](#req~session~3)

Depends:
+ req~clock~1

Comment: checked by the release team
"#;

    #[test]
    fn test_full_item() {
        let items = import(SPEC);
        assert_eq!(items.len(), 2);

        let req = &items[0];
        assert_eq!(req.id().to_string(), "req~login.timeout~1");
        assert_eq!(req.title(), "Login timeout");
        assert_eq!(req.description(), "Sessions expire after 15 minutes\nwithout user input.");
        assert_eq!(req.rationale(), "Shared terminals in the lab.");
        assert_eq!(req.tags(), ["security", "session"]);
        assert_eq!(req.status(), ItemStatus::Proposed);
        assert!(req.needs_artifact_type("dsn"));
        assert!(req.needs_artifact_type("utest"));
        assert_eq!(req.location().map(|l| l.line), Some(4));
        assert_eq!(req.location().map(|l| l.path.as_str()), Some("doc/spec.md"));

        let dsn = &items[1];
        assert_eq!(dsn.title(), "Timer");
        assert_eq!(ids(dsn.covered_ids()), ["req~login.timeout~1", "req~session~3"]);
        assert_eq!(ids(dsn.depends_on_ids()), ["req~clock~1"]);
        assert_eq!(dsn.comment(), "checked by the release team");
        assert_eq!(dsn.description(), "");
    }

    #[test]
    fn test_heading_not_directly_above_is_not_a_title() {
        let items = import("## Heading\n\nSome prose.\n\nreq~a~1\n");
        assert_eq!(items[0].title(), "");
    }

    #[test]
    fn test_heading_ends_item() {
        let items = import("req~a~1\nfirst\n# Other\nsecond\n");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].description(), "first");
    }

    #[test]
    fn test_list_ends_at_prose() {
        let items = import("dsn~a~1\nCovers:\n* req~b~1\n\nMore prose.\n");
        assert_eq!(ids(items[0].covered_ids()), ["req~b~1"]);
        assert_eq!(items[0].description(), "More prose.");
    }

    #[test]
    fn test_fenced_code_is_not_parsed() {
        let items = import("req~a~1\n```\nreq~b~1\n# not a heading\n```\n");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].description(), "```\nreq~b~1\n# not a heading\n```");
    }

    #[test]
    fn test_unknown_status_keeps_default() {
        let items = import("req~a~1\nStatus: someday\n");
        assert_eq!(items[0].status(), ItemStatus::Approved);
    }

    #[test]
    fn test_text_without_items_yields_nothing() {
        assert!(import("# Readme\n\nJust prose, see [link](#x).\n").is_empty());
    }

    #[test]
    fn test_malformed_id_line_aborts_import() {
        let err = MarkdownImporter
            .import("doc/spec.md", "# Title\n\nreq~a~-1\n")
            .expect_err("negative revision");
        match err {
            ImportError::Identifier { file, line, source } => {
                assert_eq!(file, "doc/spec.md");
                assert_eq!(line, 3);
                assert!(matches!(source, IdentifierError::Malformed { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_covered_id_aborts_import() {
        let err = MarkdownImporter
            .import("doc/spec.md", "dsn~a~1\nCovers:\n* req~b~*\n")
            .expect_err("wildcard revision");
        assert!(matches!(
            err,
            ImportError::Identifier {
                line: 3,
                source: IdentifierError::InvalidState { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_tilde_prose_is_plain_text() {
        let items = import("~deprecated~\n\nreq~a~1\n~/config~old\n\nCovers:\n* see ~/a~b\n");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id().to_string(), "req~a~1");
        assert_eq!(items[0].description(), "~/config~old");
        assert!(items[0].covered_ids().is_empty());
    }

    #[test]
    fn test_supports_markdown_only() {
        assert!(MarkdownImporter.supports(Path::new("doc/spec.md")));
        assert!(MarkdownImporter.supports(Path::new("README.MARKDOWN")));
        assert!(!MarkdownImporter.supports(Path::new("src/lib.rs")));
    }
}
