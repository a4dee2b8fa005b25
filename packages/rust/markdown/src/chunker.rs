//! Word-boundary chunking of raw recon dumps.
//!
//! A chunk is a contiguous slice of the input: line breaks inside it are kept
//! so the per-line cleanup filter still sees the tool output's line structure.
//! Whitespace between two chunks is dropped.

/// Default maximum characters per chunk.
pub const DEFAULT_CHUNK_LIMIT: usize = 5000;

/// One bounded slice of the raw report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Position in the chunk sequence (drives credential rotation).
    pub index: usize,
    /// The chunk text.
    pub text: String,
}

impl Chunk {
    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Split `text` into chunks of at most `limit` characters without breaking words.
///
/// A single word longer than `limit` becomes its own oversized chunk.
pub fn split(text: &str, limit: usize) -> Vec<Chunk> {
    let mut spans: Vec<(usize, usize)> = Vec::new();
    // (byte start, byte end, char count) of the chunk being built
    let mut current: Option<(usize, usize, usize)> = None;

    for (start, end) in word_spans(text) {
        let word_chars = text[start..end].chars().count();

        current = match current {
            None => Some((start, end, word_chars)),
            Some((chunk_start, chunk_end, chunk_chars)) => {
                let gap = text[chunk_end..start].chars().count();
                let extended = chunk_chars + gap + word_chars;
                if extended <= limit {
                    Some((chunk_start, end, extended))
                } else {
                    spans.push((chunk_start, chunk_end));
                    Some((start, end, word_chars))
                }
            }
        };
    }

    if let Some((chunk_start, chunk_end, _)) = current {
        spans.push((chunk_start, chunk_end));
    }

    spans
        .into_iter()
        .enumerate()
        .map(|(index, (start, end))| Chunk {
            index,
            text: text[start..end].to_string(),
        })
        .collect()
}

/// Byte spans of every maximal run of non-whitespace characters.
fn word_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut word_start: Option<usize> = None;

    for (i, c) in text.char_indices() {
        match (c.is_whitespace(), word_start) {
            (true, Some(start)) => {
                spans.push((start, i));
                word_start = None;
            }
            (false, None) => word_start = Some(i),
            _ => {}
        }
    }

    if let Some(start) = word_start {
        spans.push((start, text.len()));
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(s: &str) -> Vec<&str> {
        s.split_whitespace().collect()
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(split("", 10).is_empty());
        assert!(split("   \n\t ", 10).is_empty());
    }

    #[test]
    fn short_input_is_single_chunk() {
        let chunks = split("whois example.com\nRegistrar: Foo", 5000);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].index, 0);
        assert_eq!(chunks[0].text, "whois example.com\nRegistrar: Foo");
    }

    #[test]
    fn respects_limit_and_word_boundaries() {
        let text = "alpha beta gamma delta epsilon zeta eta theta";
        let chunks = split(text, 12);

        for chunk in &chunks {
            assert!(chunk.char_len() <= 12, "chunk too long: {:?}", chunk.text);
        }
        let rejoined: Vec<&str> = chunks.iter().flat_map(|c| words(&c.text)).collect();
        assert_eq!(rejoined, words(text));
        assert_eq!(chunks[0].text, "alpha beta");
    }

    #[test]
    fn oversized_word_is_never_truncated() {
        let long = "x".repeat(30);
        let text = format!("aa {long} bb");
        let chunks = split(&text, 10);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].text, "aa");
        assert_eq!(chunks[1].text, long);
        assert_eq!(chunks[2].text, "bb");
    }

    #[test]
    fn indices_are_sequential() {
        let text = "one two three four five six seven eight nine ten";
        let chunks = split(text, 9);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
        }
    }

    #[test]
    fn concatenation_reproduces_words() {
        let text = "PORT     STATE SERVICE\n22/tcp   open  ssh\n80/tcp   open  http\n\
                    443/tcp  open  https\n\nWHOIS\nRegistrar: Example Registrar, Inc.\n"
            .repeat(40);
        for limit in [1, 7, 64, 500, 5000] {
            let chunks = split(&text, limit);
            let rejoined: Vec<&str> = chunks.iter().flat_map(|c| words(&c.text)).collect();
            assert_eq!(rejoined, words(&text), "limit {limit}");
            for chunk in &chunks {
                let single_word = words(&chunk.text).len() == 1;
                assert!(chunk.char_len() <= limit || single_word);
            }
        }
    }

    #[test]
    fn counts_characters_not_bytes() {
        // 4 chars, 8+ bytes each
        let text = "ñañá ñañá ñañá";
        let chunks = split(text, 9);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, "ñañá ñañá");
    }

    #[test]
    fn line_breaks_inside_chunk_are_preserved() {
        let text = "line one\nline two\nline three";
        let chunks = split(text, 100);
        assert_eq!(chunks[0].text.lines().count(), 3);
    }

    #[test]
    fn deterministic() {
        let text = "a b c d e f g h i j k l m n o p".repeat(50);
        assert_eq!(split(&text, 33), split(&text, 33));
    }
}
