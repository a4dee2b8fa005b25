//! Assembly of the final [`ReportDocument`] from the merged table.

use reconreport_shared::{Domain, ReportDocument};

use crate::merge::MergedTable;

pub const REPORT_TITLE: &str = "AI-Powered Reconnaissance Report";

/// Shown on the IP line when no row carries an `ip` key.
pub const IP_SENTINEL: &str = "N/A";

/// Tools the recon stage runs. Always rendered, whatever the model reported.
pub const CANONICAL_TOOLS: &[&str] = &[
    "whois",
    "dnsenum",
    "dnsrecon",
    "dig",
    "fierce",
    "sublist3r",
    "theHarvester",
    "nmap",
    "whatweb",
    "wafw00f",
    "nikto",
    "shodan",
    "curl",
    "host",
    "nslookup",
    "wpscan",
    "dirsearch",
];

pub const DISCLAIMER: &str = "This tool integrates AI & CLI utilities. Results may contain outdated, \
     previous or incorrect records. Always cross-verify manually.";

/// Build the document for `domain`.
pub fn build(table: &MergedTable, domain: &Domain) -> ReportDocument {
    ReportDocument {
        title: REPORT_TITLE.to_string(),
        domain: domain.clone(),
        ip_address: table.get("ip").unwrap_or(IP_SENTINEL).to_string(),
        rows: table.rows().to_vec(),
        tools: CANONICAL_TOOLS.iter().map(|t| (*t).to_string()).collect(),
        disclaimer: DISCLAIMER.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::merge;
    use reconreport_shared::ExtractedRow;

    fn domain() -> Domain {
        Domain::parse("example.com").unwrap()
    }

    #[test]
    fn ip_line_from_first_ip_row() {
        let table = merge(vec![vec![
            ExtractedRow::new("Target", "example.com"),
            ExtractedRow::new("Ip", "93.184.216.34"),
        ]]);
        let doc = build(&table, &domain());
        assert_eq!(doc.ip_address, "93.184.216.34");
        assert_eq!(doc.rows.len(), 2);
    }

    #[test]
    fn ip_line_defaults_to_sentinel() {
        let table = merge(vec![vec![ExtractedRow::new("IP Address", "1.2.3.4")]]);
        let doc = build(&table, &domain());
        assert_eq!(doc.ip_address, IP_SENTINEL);
    }

    #[test]
    fn tools_are_canonical() {
        let doc = build(&MergedTable::new(), &domain());
        assert_eq!(doc.tools.len(), CANONICAL_TOOLS.len());
        assert_eq!(doc.tools.first().map(String::as_str), Some("whois"));
        assert_eq!(doc.tools.last().map(String::as_str), Some("dirsearch"));
        assert_eq!(doc.title, REPORT_TITLE);
        assert!(doc.disclaimer.ends_with("Always cross-verify manually."));
    }
}
