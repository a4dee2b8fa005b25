//! Per-chunk attempt policy: one primary call, at most one retry.
//!
//! ```text
//! Primary ──Success──────────────► Completed
//!    │ ──Failed──────────────────► Skipped
//!    └─RateLimited─(backoff)─► Retry ──Success──► Completed
//!                                  └──otherwise─► Skipped
//! ```
//!
//! The transition function is pure; [`run_chunk`] drives it against a
//! [`Completer`] and sleeps for the backoff.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use reconreport_shared::Domain;

use crate::client::{Completer, CompletionResult};
use crate::credentials::CredentialPool;

/// Default wait before retrying a rate-limited chunk.
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(5);

/// Which attempt of a chunk is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    Primary,
    Retry,
}

impl Attempt {
    /// 1-based attempt number.
    pub fn number(self) -> u8 {
        match self {
            Self::Primary => 1,
            Self::Retry => 2,
        }
    }

    /// Credential slot used by this attempt for chunk `chunk_index`.
    pub fn credential_slot(self, pool: &CredentialPool, chunk_index: usize) -> usize {
        match self {
            Self::Primary => pool.primary_slot(chunk_index),
            Self::Retry => pool.retry_slot(chunk_index),
        }
    }
}

/// Why a chunk contributed nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Both attempts were rate-limited.
    RateLimited,
    /// An attempt failed outright.
    Failed(String),
    /// Cancellation arrived during the backoff.
    Cancelled,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimited => f.write_str("rate limited on primary and retry keys"),
            Self::Failed(reason) => write!(f, "remote failure: {reason}"),
            Self::Cancelled => f.write_str("cancelled during backoff"),
        }
    }
}

/// Final state of a chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkOutcome {
    Completed { text: String, attempts: u8 },
    Skipped { reason: SkipReason, attempts: u8 },
}

/// What to do after an attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    RetryAfter(Duration),
    Finish(ChunkOutcome),
}

/// Rate-limit recovery policy.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            backoff: DEFAULT_BACKOFF,
        }
    }
}

impl RetryPolicy {
    pub fn new(backoff: Duration) -> Self {
        Self { backoff }
    }

    /// Decide the next step after `attempt` produced `result`.
    pub fn transition(&self, attempt: Attempt, result: CompletionResult) -> Transition {
        let attempts = attempt.number();
        match (attempt, result) {
            (_, CompletionResult::Success(text)) => {
                Transition::Finish(ChunkOutcome::Completed { text, attempts })
            }
            (Attempt::Primary, CompletionResult::RateLimited) => {
                Transition::RetryAfter(self.backoff)
            }
            (Attempt::Retry, CompletionResult::RateLimited) => {
                Transition::Finish(ChunkOutcome::Skipped {
                    reason: SkipReason::RateLimited,
                    attempts,
                })
            }
            (_, CompletionResult::Failed(reason)) => Transition::Finish(ChunkOutcome::Skipped {
                reason: SkipReason::Failed(reason),
                attempts,
            }),
        }
    }
}

/// Run one chunk through the attempt state machine. At most two remote calls.
pub async fn run_chunk<C: Completer>(
    completer: &C,
    pool: &CredentialPool,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    chunk_index: usize,
    text: &str,
    domain: &Domain,
) -> ChunkOutcome {
    let mut attempt = Attempt::Primary;

    loop {
        let slot = attempt.credential_slot(pool, chunk_index);
        debug!(chunk = chunk_index, attempt = attempt.number(), slot, "sending chunk");

        let result = completer.complete(text, domain, pool.get(slot)).await;

        match policy.transition(attempt, result) {
            Transition::Finish(outcome) => return outcome,
            Transition::RetryAfter(wait) => {
                warn!(
                    chunk = chunk_index,
                    wait_ms = wait.as_millis() as u64,
                    next_slot = Attempt::Retry.credential_slot(pool, chunk_index),
                    "rate limit hit, backing off before retry"
                );

                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        info!(chunk = chunk_index, "cancelled during backoff");
                        return ChunkOutcome::Skipped {
                            reason: SkipReason::Cancelled,
                            attempts: attempt.number(),
                        };
                    }
                    _ = tokio::time::sleep(wait) => {}
                }

                attempt = Attempt::Retry;
            }
        }
    }
}
