//! Batch partitioning and per-request result slots.

use std::ops::Range;

use crate::models::BrowseResponse;
use crate::{Error, Result};

/// The result slot of one request, tagged with its position in the input.
#[derive(Debug)]
pub struct ResponseEnvelope {
    index: usize,
    outcome: Result<BrowseResponse>,
}

impl ResponseEnvelope {
    pub(crate) fn new(index: usize, outcome: Result<BrowseResponse>) -> Self {
        Self { index, outcome }
    }

    /// Position of the originating parameter set.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns `true` if the request produced a decoded reply.
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// The decoded reply, if any.
    pub fn response(&self) -> Option<&BrowseResponse> {
        self.outcome.as_ref().ok()
    }

    /// The captured failure, if any.
    pub fn error(&self) -> Option<&Error> {
        self.outcome.as_ref().err()
    }

    /// Consume the envelope.
    pub fn into_result(self) -> Result<BrowseResponse> {
        self.outcome
    }
}

/// Split `len` requests into consecutive ranges of at most `budget`.
///
/// Useful for previewing how a call will be batched under a fixed budget.
/// The client itself recomputes the budget after every token refresh.
///
/// # Panics
///
/// Panics if `budget` is zero.
///
/// # Example
///
/// ```
/// use browse_batch::client::batch_ranges;
///
/// let sizes: Vec<usize> = batch_ranges(5, 2).map(|r| r.len()).collect();
/// assert_eq!(sizes, vec![2, 2, 1]);
/// ```
pub fn batch_ranges(len: usize, budget: usize) -> impl Iterator<Item = Range<usize>> {
    assert!(budget > 0, "batch budget must be non-zero");
    (0..len)
        .step_by(budget)
        .map(move |start| next_batch(start, len, budget))
}

/// The batch starting at `start`.
pub(crate) fn next_batch(start: usize, len: usize, budget: usize) -> Range<usize> {
    start..start.saturating_add(budget).min(len)
}
