//! Best-effort extraction of key/value rows and tool names from model output.
//!
//! Completions are free-form Markdown: prose, headings, one or more pipe
//! tables and a `Tools Used: a, b, c` line. Nothing here can fail; lines that
//! do not fit the expected shape are skipped.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use reconreport_shared::ExtractedRow;

/// Matches a table divider such as `|---|:---:|` or `--- | ---`.
static DIVIDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\s|:\-]*-[\s|:\-]*$").expect("divider regex"));

const TOOLS_PREFIX: &str = "tools used";

/// Rows and tools parsed from a single completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCompletion {
    pub rows: Vec<ExtractedRow>,
    pub tools: BTreeSet<String>,
}

/// Parse both rows and tools from one completion.
pub fn parse_completion(text: &str) -> ParsedCompletion {
    ParsedCompletion {
        rows: parse_rows(text),
        tools: parse_tools(text),
    }
}

/// Extract every two-cell table row.
///
/// Header lines (the line right above a divider) are not rows. Rendered
/// tables supply their own Key/Value header.
pub fn parse_rows(text: &str) -> Vec<ExtractedRow> {
    let lines: Vec<&str> = text.lines().collect();
    let mut rows = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        if !line.contains('|') || is_divider(line) {
            continue;
        }
        if lines.get(i + 1).is_some_and(|next| is_divider(next)) {
            trace!(line, "skipping table header");
            continue;
        }

        let cells: Vec<&str> = line
            .split('|')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .collect();

        if let [key, value] = cells.as_slice() {
            rows.push(ExtractedRow::new(*key, *value));
        } else {
            trace!(cells = cells.len(), "discarding row without exactly two cells");
        }
    }

    rows
}

/// Extract tool names from `Tools Used: ...` lines.
pub fn parse_tools(text: &str) -> BTreeSet<String> {
    let mut tools = BTreeSet::new();

    for line in text.lines() {
        let stripped = strip_decoration(line);
        let is_tools_line = stripped
            .get(..TOOLS_PREFIX.len())
            .is_some_and(|p| p.eq_ignore_ascii_case(TOOLS_PREFIX));
        if !is_tools_line {
            continue;
        }

        let list = match stripped.rfind(':') {
            Some(pos) => &stripped[pos + 1..],
            None => &stripped[TOOLS_PREFIX.len()..],
        };

        tools.extend(
            list.split(',')
                .map(|t| t.trim_matches(|c: char| c.is_whitespace() || matches!(c, '*' | '_' | '`' | '.')))
                .filter(|t| !t.is_empty())
                .map(String::from),
        );
    }

    tools
}

fn is_divider(line: &str) -> bool {
    DIVIDER_RE.is_match(line)
}

/// Drop leading whitespace and Markdown heading/emphasis/list marks.
fn strip_decoration(line: &str) -> &str {
    line.trim_start()
        .trim_start_matches(|c: char| matches!(c, '#' | '*' | '_' | '-' | '>') || c.is_whitespace())
}
