//! Markdown rendering of a [`ReportDocument`].

use reconreport_shared::ReportDocument;

pub(crate) fn render(doc: &ReportDocument) -> String {
    let mut md = String::new();

    md.push_str(&format!("# {}\n\n", doc.title));
    md.push_str(&format!("**Target Domain:** {}\n\n", doc.domain));
    md.push_str(&format!("**IP Address:** {}\n\n", escape_cell(&doc.ip_address)));

    if doc.rows.is_empty() {
        md.push_str("_No findings were extracted from the raw report._\n\n");
    } else {
        md.push_str("| Key | Value |\n");
        md.push_str("|-----|-------|\n");
        for row in &doc.rows {
            md.push_str(&format!(
                "| {} | {} |\n",
                escape_cell(&row.key),
                escape_cell(&row.value)
            ));
        }
        md.push('\n');
    }

    md.push_str("### Tools Used:\n\n");
    md.push_str(&doc.tools.join(", "));
    md.push_str("\n\n");
    md.push_str(&format!("_{}_\n", doc.disclaimer));

    md
}

/// Keep cell text on one line and away from column separators.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use reconreport_shared::{Domain, ExtractedRow};

    fn doc(rows: Vec<ExtractedRow>) -> ReportDocument {
        ReportDocument {
            title: "AI-Powered Reconnaissance Report".into(),
            domain: Domain::parse("example.com").unwrap(),
            ip_address: "93.184.216.34".into(),
            rows,
            tools: vec!["whois".into(), "nmap".into()],
            disclaimer: "Always cross-verify manually.".into(),
        }
    }

    #[test]
    fn renders_all_sections_in_order() {
        let md = render(&doc(vec![
            ExtractedRow::new("Target", "example.com"),
            ExtractedRow::new("IP", "93.184.216.34"),
        ]));

        let title = md.find("# AI-Powered Reconnaissance Report").unwrap();
        let domain = md.find("**Target Domain:** example.com").unwrap();
        let ip = md.find("**IP Address:** 93.184.216.34").unwrap();
        let table = md.find("| Target | example.com |").unwrap();
        let tools = md.find("### Tools Used:\n\nwhois, nmap").unwrap();
        let disclaimer = md.find("_Always cross-verify manually._").unwrap();

        assert!(title < domain && domain < ip && ip < table && table < tools && tools < disclaimer);
    }

    #[test]
    fn empty_table_still_renders_tools() {
        let md = render(&doc(vec![]));
        assert!(md.contains("No findings were extracted"));
        assert!(!md.contains("| Key | Value |"));
        assert!(md.contains("whois, nmap"));
    }

    #[test]
    fn cells_are_escaped() {
        assert_eq!(escape_cell("a|b\nc"), "a\\|b c");
    }
}
