use std::time::Duration;

use crate::batch::{Chunk, MutationRequest};

use super::error::RetryError;
use super::policy::RetryPolicy;

/// What the executor should do after a submit has been evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryStep {
    /// Every request was applied.
    Done,
    /// Sleep for the given delay, then resubmit the pending requests.
    Backoff(Duration),
}

/// Per-chunk retry bookkeeping.
///
/// `attempt` counts retries already performed, so the submit in flight is
/// number `attempt + 1`. `pending` only ever shrinks or stays the same: the
/// store's unprocessed list replaces it and must be drawn from it.
#[derive(Debug, Clone)]
pub struct RetryState {
    attempt: u32,
    pending: Vec<MutationRequest>,
    last_delay: Duration,
}

impl RetryState {
    pub fn new(chunk: Chunk) -> Self {
        Self {
            attempt: 0,
            pending: chunk.into_requests(),
            last_delay: Duration::ZERO,
        }
    }

    /// Requests to send on the next submit.
    pub fn pending(&self) -> &[MutationRequest] {
        &self.pending
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Submits performed or in flight.
    pub fn submits(&self) -> u32 {
        self.attempt + 1
    }

    pub fn last_delay(&self) -> Duration {
        self.last_delay
    }

    /// Applies the store's verdict for the submit that just completed.
    ///
    /// Returns [`RetryStep::Done`] when nothing is left, [`RetryStep::Backoff`]
    /// when another submit is permitted, and
    /// [`RetryError::RetriesExhausted`] after the last permitted submit.
    pub fn evaluate(
        &mut self,
        unprocessed: Vec<MutationRequest>,
        policy: &RetryPolicy,
    ) -> Result<RetryStep, RetryError> {
        // Each pending request may be reported at most once.
        let mut unmatched = self.pending.clone();
        for request in &unprocessed {
            match unmatched.iter().position(|p| p == request) {
                Some(index) => {
                    unmatched.swap_remove(index);
                }
                None => {
                    return Err(RetryError::UnexpectedUnprocessed {
                        key: request.key().to_string(),
                    });
                }
            }
        }

        if unprocessed.is_empty() {
            self.pending.clear();
            return Ok(RetryStep::Done);
        }

        self.pending = unprocessed;

        if self.attempt + 1 >= policy.max_attempts {
            return Err(RetryError::RetriesExhausted {
                remaining: self.pending.len(),
                attempts: self.submits(),
            });
        }

        let delay = policy.backoff_delay(self.attempt);
        self.last_delay = delay;
        self.attempt += 1;
        Ok(RetryStep::Backoff(delay))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::chunk;
    use crate::keys::PrimaryKey;

    fn requests(n: usize) -> Vec<MutationRequest> {
        (0..n)
            .map(|i| MutationRequest::Delete(PrimaryKey::new("P", format!("{i}"))))
            .collect()
    }

    fn state(n: usize) -> RetryState {
        let mut chunks = chunk(requests(n), 25).unwrap();
        RetryState::new(chunks.remove(0))
    }

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_millis(4000),
        }
    }

    #[test]
    fn test_done_on_first_submit() {
        let mut state = state(5);
        let step = state.evaluate(Vec::new(), &policy(8)).unwrap();

        assert_eq!(step, RetryStep::Done);
        assert!(state.pending().is_empty());
        assert_eq!(state.submits(), 1);
    }

    #[test]
    fn test_backoff_keeps_only_unprocessed() {
        let mut state = state(5);
        let unprocessed = state.pending()[3..].to_vec();

        let step = state.evaluate(unprocessed.clone(), &policy(8)).unwrap();

        assert_eq!(step, RetryStep::Backoff(Duration::from_millis(250)));
        assert_eq!(state.pending(), unprocessed.as_slice());
        assert_eq!(state.attempt(), 1);
        assert_eq!(state.last_delay(), Duration::from_millis(250));

        let step = state.evaluate(unprocessed.clone(), &policy(8)).unwrap();
        assert_eq!(step, RetryStep::Backoff(Duration::from_millis(500)));
    }

    #[test]
    fn test_exhaustion_after_max_attempts() {
        let mut state = state(4);
        let policy = policy(3);
        let stuck = state.pending()[..2].to_vec();

        assert!(matches!(
            state.evaluate(stuck.clone(), &policy),
            Ok(RetryStep::Backoff(_))
        ));
        assert!(matches!(
            state.evaluate(stuck.clone(), &policy),
            Ok(RetryStep::Backoff(_))
        ));
        assert_eq!(
            state.evaluate(stuck, &policy),
            Err(RetryError::RetriesExhausted {
                remaining: 2,
                attempts: 3
            })
        );
        assert_eq!(state.pending().len(), 2);
    }

    #[test]
    fn test_single_attempt_policy_fails_immediately() {
        let mut state = state(2);
        let all = state.pending().to_vec();
        assert_eq!(
            state.evaluate(all, &policy(1)),
            Err(RetryError::RetriesExhausted {
                remaining: 2,
                attempts: 1
            })
        );
    }

    #[test]
    fn test_rejects_requests_that_were_not_submitted() {
        let mut state = state(2);
        let stray = MutationRequest::Delete(PrimaryKey::new("OTHER", "1"));

        assert_eq!(
            state.evaluate(vec![stray], &policy(8)),
            Err(RetryError::UnexpectedUnprocessed {
                key: "OTHER#1".to_string()
            })
        );
    }

    #[test]
    fn test_rejects_duplicated_unprocessed_requests() {
        let mut state = state(1);
        let request = state.pending()[0].clone();

        assert_eq!(
            state.evaluate(vec![request.clone(), request], &policy(2)),
            Err(RetryError::UnexpectedUnprocessed {
                key: "P#0".to_string()
            })
        );
        assert_eq!(state.pending().len(), 1);
        assert_eq!(state.attempt(), 0);
    }

    #[test]
    fn test_pending_never_grows_across_retries() {
        let mut state = state(3);
        let policy = policy(8);
        let first = state.pending()[0].clone();

        let tail = state.pending()[1..].to_vec();
        state.evaluate(tail, &policy).unwrap();
        assert_eq!(state.pending().len(), 2);

        assert!(matches!(
            state.evaluate(vec![first], &policy),
            Err(RetryError::UnexpectedUnprocessed { .. })
        ));
        assert_eq!(state.pending().len(), 2);
    }
}
