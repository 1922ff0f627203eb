use super::Reporter;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use tracelink_core::{Identifier, SpecificationItem, Trace};

/// Exports every imported item as a SpecObject XML document.
///
/// The document holds one `<specobjects>` group per artifact type and can
/// be read back by the SpecObject importer.
pub struct SpecobjectReporter;

impl Reporter for SpecobjectReporter {
    fn render(&self, trace: &Trace) -> String {
        let mut items: Vec<&SpecificationItem> = trace.items().iter().map(|i| i.item()).collect();
        items.sort_by(|a, b| a.id().cmp(b.id()));

        let mut xml = Xml(Writer::new_with_indent(Vec::new(), b' ', 2));
        xml.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)));
        xml.start("specdocument");
        for group in items.chunk_by(|a, b| a.artifact_type() == b.artifact_type()) {
            let doctype = group[0].artifact_type();
            xml.event(Event::Start(
                BytesStart::new("specobjects").with_attributes([("doctype", doctype)]),
            ));
            for item in group {
                specobject(&mut xml, item);
            }
            xml.end("specobjects");
        }
        xml.end("specdocument");

        let mut output = String::from_utf8_lossy(&xml.0.into_inner()).into_owned();
        output.push('\n');
        output
    }
}

fn specobject(xml: &mut Xml, item: &SpecificationItem) {
    let id = item.id();
    xml.start("specobject");
    xml.element("id", id.name());
    xml.element("status", item.status().as_str());
    xml.element("version", &revision(id));
    for (name, text) in [
        ("shortdesc", item.title()),
        ("description", item.description()),
        ("rationale", item.rationale()),
        ("comment", item.comment()),
    ] {
        if !text.is_empty() {
            xml.element(name, text);
        }
    }
    if let Some(location) = item.location() {
        xml.element("sourcefile", &location.path);
        xml.element("sourceline", &location.line.to_string());
    }

    if !item.tags().is_empty() {
        xml.start("tags");
        for tag in item.tags() {
            xml.element("tag", tag);
        }
        xml.end("tags");
    }
    if !item.needed_artifact_types().is_empty() {
        xml.start("needscoverage");
        for artifact_type in item.needed_artifact_types() {
            xml.element("needsobj", artifact_type);
        }
        xml.end("needscoverage");
    }
    if !item.covered_ids().is_empty() {
        xml.start("providescoverage");
        for covered in item.covered_ids() {
            xml.start("provcov");
            xml.element("linksto", &reference(covered));
            // no version means "latest" to the importer
            if !covered.is_wildcard() {
                xml.element("dstversion", &revision(covered));
            }
            xml.end("provcov");
        }
        xml.end("providescoverage");
    }
    if !item.depends_on_ids().is_empty() {
        xml.start("dependencies");
        for dependency in item.depends_on_ids() {
            let text = if dependency.is_wildcard() {
                reference(dependency)
            } else {
                format!("{}, v{}", reference(dependency), revision(dependency))
            };
            xml.element("dependson", &text);
        }
        xml.end("dependencies");
    }
    xml.end("specobject");
}

fn reference(id: &Identifier) -> String {
    format!("{}:{}", id.artifact_type(), id.name())
}

fn revision(id: &Identifier) -> String {
    id.revision_number()
        .map(|revision| revision.to_string())
        .unwrap_or_default()
}

/// Writes into memory, which cannot fail
struct Xml(Writer<Vec<u8>>);

impl Xml {
    fn event(&mut self, event: Event<'_>) {
        self.0
            .write_event(event)
            .expect("writing XML to memory failed");
    }

    fn start(&mut self, name: &str) {
        self.event(Event::Start(BytesStart::new(name)));
    }

    fn end(&mut self, name: &str) {
        self.event(Event::End(BytesEnd::new(name)));
    }

    fn element(&mut self, name: &str, text: &str) {
        self.start(name);
        self.event(Event::Text(BytesText::new(text)));
        self.end(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::{Importer, SpecobjectImporter};
    use tracelink_core::{ItemStatus, link};

    fn items() -> Vec<SpecificationItem> {
        let mut req = SpecificationItem::builder();
        req.id("req~login~2".parse().expect("valid id"))
            .location("doc/spec.md", 4)
            .status(ItemStatus::Draft)
            .title("Login & logout")
            .append_description("Users log in.")
            .append_description("Sessions <expire>.")
            .tag("security")
            .needs("dsn")
            .needs("utest");

        let mut dsn = SpecificationItem::builder();
        dsn.id("dsn~password-check~1".parse().expect("valid id"))
            .location("doc/design.md", 10)
            .covers("req~login~2".parse().expect("valid id"))
            .covers(
                "req~audit~1"
                    .parse::<Identifier>()
                    .expect("valid id")
                    .to_wildcard(),
            )
            .depends_on("dsn~hashing~3".parse().expect("valid id"));

        vec![
            req.build().expect("valid item"),
            dsn.build().expect("valid item"),
        ]
    }

    #[test]
    fn test_document_layout() {
        let xml = SpecobjectReporter.render(&link(items()));
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<specobjects doctype=\"dsn\">"));
        assert!(xml.contains("<specobjects doctype=\"req\">"));
        assert!(xml.find("doctype=\"dsn\"") < xml.find("doctype=\"req\""));
        assert!(xml.contains("<shortdesc>Login &amp; logout</shortdesc>"));
        assert!(xml.contains("<linksto>req:login</linksto>"));
        assert!(xml.contains("<dstversion>2</dstversion>"));
        assert!(xml.contains("<dependson>dsn:hashing, v3</dependson>"));
        assert!(!xml.contains("<expire>"));
        assert!(xml.ends_with("</specdocument>\n"));
    }

    #[test]
    fn test_export_reads_back_as_the_same_items() {
        let mut expected = items();
        expected.sort_by(|a, b| a.id().cmp(b.id()));

        let xml = SpecobjectReporter.render(&link(items()));
        let imported = SpecobjectImporter
            .import("trace.xml", &xml)
            .expect("export is importable");
        assert_eq!(imported, expected);
    }
}
