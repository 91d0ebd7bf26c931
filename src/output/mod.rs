use crate::filter::FilterType;
use crate::host::{Host, HostElement};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Html,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "json" => Some(Self::Json),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }
}

pub fn infer_format_from_path(path: &str) -> Option<OutputFormat> {
    let lower = path.trim().to_lowercase();
    if lower.ends_with(".json") {
        return Some(OutputFormat::Json);
    }
    if lower.ends_with(".html") || lower.ends_with(".htm") {
        return Some(OutputFormat::Html);
    }
    if lower.ends_with(".txt") {
        return Some(OutputFormat::Text);
    }
    None
}

pub fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Snapshot of what the page shows, handed to the renderers.
#[derive(Clone, Debug)]
pub struct RenderedList<'a> {
    pub active_filter: Option<FilterType>,
    pub hosts: &'a [Host],
    pub elements: &'a [HostElement],
    pub total: usize,
}

pub fn render(format: OutputFormat, list: &RenderedList<'_>) -> Vec<u8> {
    match format {
        OutputFormat::Text => render_text(list.elements),
        OutputFormat::Json => render_json(list.hosts),
        OutputFormat::Html => render_html(list),
    }
}

pub fn render_text(elements: &[HostElement]) -> Vec<u8> {
    let mut out = String::new();
    for e in elements {
        out.push_str(&e.text);
        out.push('\n');
    }
    out.into_bytes()
}

pub fn render_json(hosts: &[Host]) -> Vec<u8> {
    serde_json::to_vec_pretty(hosts).unwrap_or_else(|_| b"[]\n".to_vec())
}

pub fn render_html(list: &RenderedList<'_>) -> Vec<u8> {
    let mut controls = String::new();
    for ft in FilterType::ALL_TYPES {
        let class = if Some(ft) == list.active_filter {
            "host-filter host-filter-active"
        } else {
            "host-filter"
        };
        controls.push_str(&format!(
            "      <span class=\"{class}\" id=\"{}\" tabindex=\"0\">{}</span>\n",
            ft.id(),
            escape_xml(ft.label())
        ));
    }

    let mut items = String::new();
    for e in list.elements {
        items.push_str("      ");
        items.push_str(&e.markup);
        items.push('\n');
    }

    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8"/>
  <title>Hosts</title>
</head>
<body>
  <main>
    <nav class="hosts-filters">
{controls}    </nav>
    <section class="hosts-list">
{items}    </section>
  </main>
  <footer>{shown} of {total} hosts</footer>
</body>
</html>
"#,
        shown = list.elements.len(),
        total = list.total,
    );
    html.into_bytes()
}
