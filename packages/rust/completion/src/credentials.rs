//! The completion API key pool and its rotation rule.

use reconreport_shared::{ReconReportError, Result};

/// An API key. `Debug` and `Display` never print the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// The raw secret, for the `Authorization` header only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(***)")
    }
}

impl std::fmt::Display for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("***")
    }
}

/// Ordered, non-empty, read-only set of credentials.
///
/// Chunk `i` uses slot `i mod N` first and slot `(i + 1) mod N` for its single retry.
#[derive(Debug, Clone)]
pub struct CredentialPool {
    credentials: Vec<Credential>,
}

impl CredentialPool {
    /// Build a pool, ignoring blank entries. Fails if nothing usable remains.
    pub fn new<I, S>(secrets: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let credentials: Vec<Credential> = secrets
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .filter(|s| !s.is_empty())
            .map(Credential)
            .collect();

        if credentials.is_empty() {
            return Err(ReconReportError::config(
                "credential pool is empty: provide at least one API key",
            ));
        }

        Ok(Self { credentials })
    }

    /// Parse a comma-separated key list (the `GROQ_KEYS` format).
    pub fn from_csv(raw: &str) -> Result<Self> {
        Self::new(raw.split(','))
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    /// Whether the pool holds no credentials.
    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    /// Slot of the first attempt for chunk `chunk_index`.
    pub fn primary_slot(&self, chunk_index: usize) -> usize {
        chunk_index % self.len()
    }

    /// Slot of the retry after a rate-limited first attempt.
    pub fn retry_slot(&self, chunk_index: usize) -> usize {
        (chunk_index + 1) % self.len()
    }

    pub fn get(&self, slot: usize) -> &Credential {
        &self.credentials[slot % self.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_csv_and_skips_blanks() {
        let pool = CredentialPool::from_csv(" key-a, ,key-b,,key-c ").unwrap();
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.get(0).expose(), "key-a");
        assert_eq!(pool.get(2).expose(), "key-c");
        assert!(!pool.is_empty());
    }

    #[test]
    fn empty_pool_is_rejected() {
        assert!(CredentialPool::from_csv("").is_err());
        assert!(CredentialPool::from_csv(" , ,").is_err());
        assert!(CredentialPool::new(Vec::<String>::new()).is_err());
    }

    #[test]
    fn rotation_slots() {
        let pool = CredentialPool::from_csv("a,b,c").unwrap();
        for i in 0..10 {
            assert_eq!(pool.primary_slot(i), i % 3);
            assert_eq!(pool.retry_slot(i), (i + 1) % 3);
        }
    }

    #[test]
    fn single_key_pool_retries_on_same_key() {
        let pool = CredentialPool::from_csv("only").unwrap();
        assert_eq!(pool.primary_slot(7), 0);
        assert_eq!(pool.retry_slot(7), 0);
    }

    #[test]
    fn secrets_are_redacted() {
        let pool = CredentialPool::from_csv("gsk_supersecret").unwrap();
        let debug = format!("{pool:?}");
        assert!(!debug.contains("supersecret"));
        assert_eq!(pool.get(0).to_string(), "***");
    }
}
