//! Retry and backoff policy.
//!
//! Shared by the verification exchange and the re-issue loop. Both fail
//! closed, so there is no error classification here: every failure is
//! retried until the attempt budget runs out.

mod policy;
mod run;

pub use policy::{RetryDecision, RetryPolicy};
pub use run::run_with_retry;
