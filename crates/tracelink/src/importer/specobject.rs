//! SpecObject XML documents
//!
//! ```text
//! <specdocument>
//!   <specobjects doctype="dsn">
//!     <specobject>
//!       <id>login-timer</id>
//!       <version>2</version>
//!       <shortdesc>Login timer</shortdesc>
//!       <needscoverage><needsobj>impl</needsobj></needscoverage>
//!       <providescoverage>
//!         <provcov><linksto>req:login.timeout</linksto><dstversion>1</dstversion></provcov>
//!       </providescoverage>
//!     </specobject>
//!   </specobjects>
//! </specdocument>
//! ```
//!
//! The artifact type comes from the enclosing `doctype`. Elements the
//! importer does not know are skipped. XML files that never open a
//! `<specobjects>` element are not SpecObject documents and yield no items.

use super::{ImportError, Importer};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::path::Path;
use tracelink_core::{Identifier, ItemStatus, SpecificationItem};
use tracing::{debug, warn};

/// Reads SpecObject XML files
pub struct SpecobjectImporter;

impl Importer for SpecobjectImporter {
    fn name(&self) -> &'static str {
        "specobject"
    }

    fn supports(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
    }

    fn import(&self, file: &str, content: &str) -> Result<Vec<SpecificationItem>, ImportError> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(true);

        let mut parser = Parser {
            file,
            doctype: None,
            in_document: false,
            path: Vec::new(),
            text: String::new(),
            current: None,
            items: Vec::new(),
        };

        loop {
            let event = match reader.read_event() {
                Ok(event) => event,
                Err(source) if !parser.in_document => {
                    debug!("{file}: not a SpecObject document ({source})");
                    return Ok(Vec::new());
                }
                Err(source) => {
                    return Err(ImportError::Xml {
                        file: file.to_string(),
                        line: line_at(content, reader.buffer_position()),
                        source,
                    });
                }
            };
            let line = line_at(content, reader.buffer_position());
            let xml_error = |source: quick_xml::Error| ImportError::Xml {
                file: file.to_string(),
                line,
                source,
            };

            match event {
                Event::Start(start) => {
                    let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
                    let doctype = match start
                        .try_get_attribute("doctype")
                        .map_err(|e| xml_error(e.into()))?
                    {
                        Some(attribute) => Some(
                            attribute
                                .unescape_value()
                                .map_err(xml_error)?
                                .into_owned(),
                        ),
                        None => None,
                    };
                    parser.start(name, line, doctype)?;
                }
                Event::End(end) => {
                    let name = String::from_utf8_lossy(end.local_name().as_ref()).into_owned();
                    parser.end(&name)?;
                }
                Event::Text(text) => {
                    parser.text.push_str(&text.unescape().map_err(xml_error)?);
                }
                Event::CData(cdata) => {
                    parser.text.push_str(&String::from_utf8_lossy(&cdata));
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !parser.in_document {
            debug!("{file}: no <specobjects> element, skipping");
        }
        Ok(parser.items)
    }
}

struct Parser<'a> {
    file: &'a str,
    doctype: Option<String>,
    /// Set once a `<specobjects>` element was opened
    in_document: bool,
    /// Open elements, outermost first
    path: Vec<String>,
    /// Text collected since the last start tag
    text: String,
    current: Option<Draft>,
    items: Vec<SpecificationItem>,
}

/// Raw element text of one `<specobject>`, validated when it closes
#[derive(Default)]
struct Draft {
    line: usize,
    id: Option<String>,
    version: Option<String>,
    status: Option<String>,
    title: Option<String>,
    description: Option<String>,
    rationale: Option<String>,
    comment: Option<String>,
    source_file: Option<String>,
    source_line: Option<String>,
    tags: Vec<String>,
    needs: Vec<String>,
    depends_on: Vec<String>,
    covers: Vec<(String, Option<String>)>,
    links_to: Option<String>,
    destination_version: Option<String>,
}

impl Parser<'_> {
    fn start(
        &mut self,
        name: String,
        line: usize,
        doctype: Option<String>,
    ) -> Result<(), ImportError> {
        match name.as_str() {
            "specobjects" => {
                self.in_document = true;
                let Some(doctype) = doctype else {
                    return Err(self.format_error(line, "<specobjects> without doctype"));
                };
                self.doctype = Some(doctype);
            }
            "specobject" if self.doctype.is_some() => {
                self.current = Some(Draft {
                    line,
                    ..Draft::default()
                });
            }
            _ => {}
        }
        self.path.push(name);
        self.text.clear();
        Ok(())
    }

    fn end(&mut self, name: &str) -> Result<(), ImportError> {
        self.path.pop();
        let text = std::mem::take(&mut self.text);
        let parent = self.path.last().map(String::as_str).unwrap_or_default();

        if name == "specobjects" {
            self.doctype = None;
            return Ok(());
        }
        if name == "specobject" {
            if let Some(draft) = self.current.take() {
                let item = self.finish(draft)?;
                self.items.push(item);
            }
            return Ok(());
        }

        let Some(draft) = self.current.as_mut() else {
            return Ok(());
        };
        match (parent, name) {
            ("specobject", "id") => draft.id = Some(text),
            ("specobject", "version") => draft.version = Some(text),
            ("specobject", "status") => draft.status = Some(text),
            ("specobject", "shortdesc") => draft.title = Some(text),
            ("specobject", "description") => draft.description = Some(text),
            ("specobject", "rationale") => draft.rationale = Some(text),
            ("specobject", "comment") => draft.comment = Some(text),
            ("specobject", "sourcefile") => draft.source_file = Some(text),
            ("specobject", "sourceline") => draft.source_line = Some(text),
            ("tags", "tag") => draft.tags.push(text),
            ("needscoverage", "needsobj") => draft.needs.push(text),
            ("dependencies", "dependson") => draft.depends_on.push(text),
            ("provcov", "linksto") => draft.links_to = Some(text),
            ("provcov", "dstversion") => draft.destination_version = Some(text),
            ("providescoverage", "provcov") => {
                if let Some(target) = draft.links_to.take() {
                    let version = draft.destination_version.take();
                    draft.covers.push((target, version));
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn finish(&self, draft: Draft) -> Result<SpecificationItem, ImportError> {
        let line = draft.line;
        let doctype = self.doctype.as_deref().unwrap_or_default();
        let Some(id) = draft.id else {
            return Err(self.format_error(line, "<specobject> without <id>"));
        };
        let Some(version) = draft.version else {
            return Err(self.format_error(line, "<specobject> without <version>"));
        };
        // "impl:name" inside an impl document names "impl~name"
        let name = id
            .strip_prefix(doctype)
            .and_then(|rest| rest.strip_prefix(':'))
            .unwrap_or(id.as_str());

        let mut builder = SpecificationItem::builder();
        builder.id(self.identifier(line, &format!("{doctype}~{name}~{version}"))?);

        match (draft.source_file, draft.source_line) {
            (Some(file), Some(source_line)) => {
                let source_line = source_line.trim().parse::<usize>().map_err(|_| {
                    self.format_error(line, &format!("invalid <sourceline> '{source_line}'"))
                })?;
                builder.location(file, source_line);
            }
            _ => {
                builder.location(self.file, line);
            }
        }

        if let Some(status) = draft.status {
            match ItemStatus::parse(&status) {
                Some(status) => {
                    builder.status(status);
                }
                None => warn!(
                    "{}:{line}: unknown item status \"{status}\", keeping approved",
                    self.file
                ),
            }
        }
        if let Some(title) = draft.title {
            builder.title(title);
        }
        if let Some(description) = draft.description {
            builder.append_description(&description);
        }
        if let Some(rationale) = draft.rationale {
            builder.append_rationale(&rationale);
        }
        if let Some(comment) = draft.comment {
            builder.append_comment(&comment);
        }
        for tag in draft.tags {
            builder.tag(tag);
        }
        for artifact_type in draft.needs {
            builder.needs(artifact_type);
        }
        for dependency in draft.depends_on {
            // "req:clock, v1"
            let (target, version) = match dependency.split_once(',') {
                Some((target, version)) => (target, Some(version.trim().trim_start_matches('v'))),
                None => (dependency.as_str(), None),
            };
            builder.depends_on(self.reference(line, target, version)?);
        }
        for (target, version) in &draft.covers {
            builder.covers(self.reference(line, target, version.as_deref())?);
        }

        builder.build().map_err(|source| ImportError::Item {
            file: self.file.to_string(),
            line,
            source,
        })
    }

    /// `type:name` plus an optional version; without one the reference
    /// follows the latest revision
    fn reference(
        &self,
        line: usize,
        target: &str,
        version: Option<&str>,
    ) -> Result<Identifier, ImportError> {
        let Some((artifact_type, name)) = target.trim().split_once(':') else {
            return Err(self.format_error(
                line,
                &format!("reference '{target}' is not of the form <type>:<name>"),
            ));
        };
        match version.map(str::trim) {
            Some(version) => self.identifier(line, &format!("{artifact_type}~{name}~{version}")),
            None => Ok(self
                .identifier(line, &format!("{artifact_type}~{name}~0"))?
                .to_wildcard()),
        }
    }

    fn identifier(&self, line: usize, text: &str) -> Result<Identifier, ImportError> {
        Identifier::parse(text).map_err(|source| ImportError::Identifier {
            file: self.file.to_string(),
            line,
            source,
        })
    }

    fn format_error(&self, line: usize, message: &str) -> ImportError {
        ImportError::Format {
            file: self.file.to_string(),
            line,
            message: message.to_string(),
        }
    }
}

/// 1-based line of a byte position reported by the reader
fn line_at<P: TryInto<usize>>(content: &str, position: P) -> usize {
    let end = position
        .try_into()
        .map_or(content.len(), |position| position.min(content.len()));
    content.as_bytes()[..end]
        .iter()
        .filter(|&&byte| byte == b'\n')
        .count()
        + 1
}
