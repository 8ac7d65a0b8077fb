//! Ordered fallback across provider attempts.
//!
//! A capability is served by a short, ordered plan of candidates. Candidates
//! are tried one at a time, each exactly once; the first success wins and each
//! failure only advances to the next candidate.

use std::fmt::Display;

/// Record of a single failed attempt.
#[derive(Debug, Clone)]
pub struct AttemptRecord {
    pub provider_name: &'static str,
    pub error: String,
}

/// Trait for naming a candidate in attempt records and logs.
pub trait Named {
    fn provider_name(&self) -> &'static str;
}

/// How a fallback plan ended.
#[derive(Debug)]
pub enum FallbackOutcome<T, E> {
    /// Candidate at `index` succeeded.
    Served { index: usize, value: T },
    /// Every candidate failed; holds the error from the last one.
    Exhausted { last_error: E },
    /// The plan was empty.
    NoCandidates,
}

/// Outcome plus the failures seen on the way.
#[derive(Debug)]
pub struct FallbackRun<T, E> {
    pub outcome: FallbackOutcome<T, E>,
    pub failures: Vec<AttemptRecord>,
}

/// Try each candidate in order until one succeeds.
pub async fn first_success<C, T, E, F, Fut>(candidates: &[C], send: F) -> FallbackRun<T, E>
where
    C: Named,
    E: Display,
    F: Fn(&C) -> Fut,
    Fut: std::future::Future<Output = std::result::Result<T, E>>,
{
    let mut failures = Vec::new();
    let mut last_error = None;

    for (index, candidate) in candidates.iter().enumerate() {
        match send(candidate).await {
            Ok(value) => {
                return FallbackRun {
                    outcome: FallbackOutcome::Served { index, value },
                    failures,
                };
            }
            Err(err) => {
                let remaining = candidates.len() - index - 1;
                tracing::warn!(
                    provider = candidate.provider_name(),
                    error = %err,
                    remaining,
                    "Provider attempt failed"
                );
                failures.push(AttemptRecord {
                    provider_name: candidate.provider_name(),
                    error: err.to_string(),
                });
                last_error = Some(err);
            }
        }
    }

    let outcome = match last_error {
        Some(last_error) => FallbackOutcome::Exhausted { last_error },
        None => FallbackOutcome::NoCandidates,
    };
    FallbackRun { outcome, failures }
}
