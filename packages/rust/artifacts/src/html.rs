//! Printable HTML rendering of a [`ReportDocument`].
//!
//! Laid out for A4 printing: title, target and IP lines, a two-column grid
//! with a shaded header, then the tool list and disclaimer.

use reconreport_shared::ReportDocument;

const STYLE: &str = r#"
        @page { size: A4; margin: 20mm; }
        body { font-family: Helvetica, Arial, sans-serif; font-size: 10pt; color: #000; max-width: 190mm; margin: 0 auto; }
        h1 { text-align: center; font-size: 18pt; margin-bottom: 12pt; }
        h3 { margin-top: 18pt; margin-bottom: 6pt; }
        p.meta { margin: 4pt 0; }
        table { border-collapse: collapse; width: 100%; margin-top: 12pt; }
        col.key { width: 34%; }
        col.value { width: 66%; }
        th, td { border: 0.5pt solid #808080; padding: 4pt 8pt; text-align: left; vertical-align: top; }
        th { background-color: #d3d3d3; font-weight: bold; }
        p.empty { font-style: italic; }
        p.disclaimer { margin-top: 24pt; font-style: italic; }
"#;

pub(crate) fn render(doc: &ReportDocument) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{title} - {domain}</title>
    <style>{STYLE}</style>
</head>
<body>
    <h1>{title}</h1>
    <p class="meta"><b>Target Domain:</b> {domain}</p>
    <p class="meta"><b>IP Address:</b> {ip}</p>
{table}
    <h3>Tools Used:</h3>
    <p class="tools">{tools}</p>
    <p class="disclaimer">{disclaimer}</p>
</body>
</html>
"#,
        title = escape_html(&doc.title),
        domain = escape_html(doc.domain.as_str()),
        ip = escape_html(&doc.ip_address),
        table = render_table(doc),
        tools = escape_html(&doc.tools.join(", ")),
        disclaimer = escape_html(&doc.disclaimer),
    )
}

fn render_table(doc: &ReportDocument) -> String {
    if doc.rows.is_empty() {
        return "    <p class=\"empty\">No findings were extracted from the raw report.</p>".into();
    }

    let mut html = String::from(
        "    <table>\n        <colgroup><col class=\"key\"><col class=\"value\"></colgroup>\n        <tr><th>Key</th><th>Value</th></tr>\n",
    );
    for row in &doc.rows {
        html.push_str(&format!(
            "        <tr><td>{}</td><td>{}</td></tr>\n",
            escape_html(&row.key),
            escape_html(&row.value)
        ));
    }
    html.push_str("    </table>");
    html
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
