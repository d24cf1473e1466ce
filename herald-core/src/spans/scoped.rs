//! Drop guard for spans

use super::tracker::{SpanId, SpanTracker};

/// A span that ends when dropped.
///
/// Obtained from [`SpanTracker::scoped`]. Ends exactly once, either through
/// [`ScopedSpan::end`] or when it goes out of scope.
#[must_use = "the span ends as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ScopedSpan<'a> {
    tracker: &'a SpanTracker,
    id: SpanId,
}

impl<'a> ScopedSpan<'a> {
    pub(crate) fn new(tracker: &'a SpanTracker, id: SpanId) -> Self {
        Self { tracker, id }
    }

    /// ID of the underlying span (empty when tracing is disabled)
    pub fn id(&self) -> &SpanId {
        &self.id
    }

    /// Attach an attribute
    pub fn add_attribute(&self, key: &str, value: &str) {
        self.tracker.add_attribute(&self.id, key, value);
    }

    /// Record a failure without ending the span
    pub fn record_exception(&self, error: &dyn std::error::Error) {
        self.tracker.record_exception(&self.id, error);
    }

    /// End the span now
    pub fn end(self) {}
}

impl Drop for ScopedSpan<'_> {
    fn drop(&mut self) {
        self.tracker.end_span(&self.id);
    }
}
