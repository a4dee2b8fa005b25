//! Remote completion calls under a rotating credential pool.
//!
//! This crate provides:
//! - [`ChatCompletionClient`]: the HTTP client, behind the [`Completer`] trait
//! - [`CredentialPool`]: the ordered key pool and its rotation rule
//! - [`run_chunk`]: the primary-then-one-retry attempt state machine

pub mod client;
pub mod credentials;
pub mod retry;

pub use client::{ChatCompletionClient, ClientOptions, Completer, CompletionResult, build_prompt};
pub use credentials::{Credential, CredentialPool};
pub use retry::{
    Attempt, ChunkOutcome, DEFAULT_BACKOFF, RetryPolicy, SkipReason, Transition, run_chunk,
};
