use std::time::{Duration, Instant};

/// Monotonically increasing id handed out per render request. Callers compare ids to drop
/// results that were superseded while they were in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug)]
struct Pending<T> {
    id: RequestId,
    payload: T,
    due: Instant,
}

/// Trailing-edge debounce for preview requests.
///
/// Each request replaces the pending one and restarts the quiet period; nothing runs until
/// [`PreviewScheduler::poll`] is called at or after the deadline. Time is passed in by the
/// caller so the policy can be driven by any event loop.
#[derive(Debug)]
pub struct PreviewScheduler<T> {
    debounce: Duration,
    pending: Option<Pending<T>>,
    coalesced: u64,
}

impl<T> PreviewScheduler<T> {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            pending: None,
            coalesced: 0,
        }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Schedule `payload`, returning the id of the request it replaced, if any.
    pub fn request(&mut self, id: RequestId, payload: T, now: Instant) -> Option<RequestId> {
        let replaced = self.pending.take().map(|p| p.id);
        if let Some(old) = replaced {
            self.coalesced += 1;
            tracing::debug!(%old, new = %id, "preview request coalesced");
        }
        self.pending = Some(Pending {
            id,
            payload,
            due: now + self.debounce,
        });
        replaced
    }

    /// Drop the pending request without running it.
    pub fn cancel(&mut self) -> Option<RequestId> {
        self.pending.take().map(|p| p.id)
    }

    /// Take the pending request once its quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<(RequestId, T)> {
        if self.pending.as_ref().is_some_and(|p| now >= p.due) {
            return self.pending.take().map(|p| (p.id, p.payload));
        }
        None
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.due)
    }

    pub fn pending_id(&self) -> Option<RequestId> {
        self.pending.as_ref().map(|p| p.id)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Number of requests that were replaced before they ran.
    pub fn coalesced(&self) -> u64 {
        self.coalesced
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/preview.rs"]
mod tests;
