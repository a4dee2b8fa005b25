//! Noise filter applied to each chunk before it is sent for completion.
//!
//! Recon tools print plenty of lines that only confuse the model (timeouts,
//! rate-limit notices, "not found" probes). Each line is classified on its
//! trimmed lowercase form and either kept, dropped, or replaced.

/// Lines containing any of these are dropped.
const NOISE_MARKERS: &[&str] = &["skipped due to", "timeout", "error", "rate limit"];

/// Negative-probe markers, dropped unless the WordPress rule matched first.
const MISSING_MARKERS: &[&str] = &["not found", "unable to detect"];

const WORDPRESS_MARKER: &str = "unable to find wordpress";

/// Replacement for a failed WordPress probe.
pub const WORDPRESS_REPLACEMENT: &str = "This website does not use WordPress.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineAction {
    Keep,
    Drop,
    Replace(&'static str),
}

fn classify(line: &str) -> LineAction {
    let lower = line.trim().to_lowercase();

    if NOISE_MARKERS.iter().any(|m| lower.contains(m)) {
        return LineAction::Drop;
    }
    if lower.contains(WORDPRESS_MARKER) {
        return LineAction::Replace(WORDPRESS_REPLACEMENT);
    }
    if MISSING_MARKERS.iter().any(|m| lower.contains(m)) {
        return LineAction::Drop;
    }
    LineAction::Keep
}

/// Filter one chunk line by line. Idempotent.
pub fn clean_chunk(text: &str) -> String {
    text.lines()
        .filter_map(|line| match classify(line) {
            LineAction::Keep => Some(line),
            LineAction::Drop => None,
            LineAction::Replace(replacement) => Some(replacement),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
