use super::{ReportSettings, Reporter};
use tracelink_core::{LinkedItem, Trace};

/// Self-contained HTML page listing every item
pub struct HtmlReporter {
    settings: ReportSettings,
}

impl HtmlReporter {
    pub fn new(settings: ReportSettings) -> Self {
        Self { settings }
    }
}

impl Reporter for HtmlReporter {
    fn render(&self, trace: &Trace) -> String {
        let mut output = String::new();

        output.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
        output.push_str("<meta charset=\"utf-8\">\n");
        output.push_str("<title>Trace Report</title>\n");
        output.push_str("<style>\n");
        output.push_str("body { font-family: system-ui, sans-serif; max-width: 960px; margin: 2rem auto; padding: 0 1rem; }\n");
        output.push_str(".ok { color: green; }\n");
        output.push_str(".defect { color: red; }\n");
        output.push_str("section { border-top: 1px solid #ddd; padding: 0.5rem 0; }\n");
        output.push_str("table { border-collapse: collapse; }\n");
        output.push_str("td, th { padding: 0.1rem 0.6rem; text-align: left; }\n");
        output.push_str("code { background: #f0f0f0; padding: 0.2em 0.4em; border-radius: 3px; }\n");
        output.push_str("</style>\n");
        output.push_str("</head>\n<body>\n");

        output.push_str("<h1>Trace Report</h1>\n");
        let (class, verdict) = if trace.has_no_defects() {
            ("ok", "ok")
        } else {
            ("defect", "not ok")
        };
        output.push_str(&format!(
            "<p><strong class=\"{}\">{}</strong>: {} items, {} defects</p>\n",
            class,
            verdict,
            trace.count(),
            trace.count_defects()
        ));

        let mut items: Vec<&LinkedItem> = trace.items().iter().collect();
        items.sort_by(|a, b| a.id().cmp(b.id()));
        for item in items {
            self.render_item(&mut output, trace, item);
        }

        output.push_str("</body>\n</html>\n");
        output
    }
}

impl HtmlReporter {
    fn render_item(&self, output: &mut String, trace: &Trace, item: &LinkedItem) {
        let class = if item.is_defect() { "defect" } else { "ok" };
        let id = escape_html(&item.id().to_string());

        output.push_str(&format!("<section id=\"{id}\">\n"));
        output.push_str(&format!("<h2 class=\"{class}\"><code>{id}</code>"));
        if !item.title().is_empty() {
            output.push_str(&format!(" {}", escape_html(item.title())));
        }
        output.push_str("</h2>\n");

        output.push_str(&format!(
            "<p>Status: {}",
            escape_html(item.status().as_str())
        ));
        if self.settings.show_origin()
            && let Some(location) = item.location()
        {
            output.push_str(&format!(
                " &middot; <code>{}</code>",
                escape_html(&location.to_string())
            ));
        }
        output.push_str("</p>\n");

        let description = item.description().trim();
        if !description.is_empty() {
            output.push_str(&format!("<p>{}</p>\n", escape_html(description)));
        }

        output.push_str("<ul>\n");
        type_row(output, "Covered", item.covered_artifact_types());
        type_row(output, "Uncovered", item.uncovered_artifact_types());
        type_row(output, "Over-covered", item.over_covered_artifact_types());
        output.push_str("</ul>\n");

        if item.has_links() {
            output.push_str("<table>\n<tr><th>Direction</th><th>Status</th><th>Item</th></tr>\n");
            for link in item.links() {
                let other = escape_html(&link.other_id().to_string());
                let target = if trace.resolve(link).is_some() {
                    format!("<a href=\"#{other}\"><code>{other}</code></a>")
                } else {
                    format!("<code>{other}</code>")
                };
                output.push_str(&format!(
                    "<tr><td>{}</td><td class=\"{}\">{}</td><td>{}</td></tr>\n",
                    link.direction().as_str(),
                    if link.status().is_good() { "ok" } else { "defect" },
                    link.status().as_str(),
                    target
                ));
            }
            output.push_str("</table>\n");
        }

        if !item.tags().is_empty() {
            let tags: Vec<String> = item.tags().iter().map(|t| escape_html(t)).collect();
            output.push_str(&format!("<p>Tags: {}</p>\n", tags.join(", ")));
        }

        output.push_str("</section>\n");
    }
}

fn type_row<'a>(
    output: &mut String,
    label: &str,
    types: impl IntoIterator<Item = &'a String>,
) {
    let types: Vec<String> = types.into_iter().map(|t| escape_html(t)).collect();
    if !types.is_empty() {
        output.push_str(&format!("<li>{}: {}</li>\n", label, types.join(", ")));
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
