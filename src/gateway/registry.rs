//! Outstanding forwards, keyed by call context.
//!
//! Every forwarded request lives here from the moment it is handed to the
//! engine until its completion (or cancellation, or expiry) removes it. The
//! entry owns the downstream token, so removing the entry is what grants the
//! right to answer the client: whichever path takes the entry first sends the
//! response, and every later path finds nothing.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use crate::engine::CallContext;
use crate::pdu::RequestKind;

use super::Request;

/// Lifecycle state of an outstanding forward.
#[derive(Debug)]
pub enum ForwardState<T> {
    /// Waiting on the upstream agent; holds the downstream token.
    AwaitingUpstream(T),
    /// The client exchange was abandoned. Kept so a late completion is
    /// recognized and discarded instead of reported as unknown.
    Cancelled,
}

/// One forwarded request awaiting its upstream outcome.
#[derive(Debug)]
pub struct PendingForward<T> {
    pub call_context: CallContext,
    /// The original client request, kept for error responses.
    pub request: Request,
    pub kind: RequestKind,
    /// 1-based position of the first binding not answered locally.
    pub failure_index: u32,
    pub created: Instant,
    state: ForwardState<T>,
}

impl<T> PendingForward<T> {
    pub fn new(
        call_context: CallContext,
        request: Request,
        kind: RequestKind,
        failure_index: u32,
        token: T,
    ) -> Self {
        Self {
            call_context,
            request,
            kind,
            failure_index,
            created: Instant::now(),
            state: ForwardState::AwaitingUpstream(token),
        }
    }

    pub fn state(&self) -> &ForwardState<T> {
        &self.state
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.state, ForwardState::Cancelled)
    }

    /// Consume the entry, returning the downstream token if it still has one.
    pub fn into_token(self) -> Option<T> {
        self.into_parts().1
    }

    /// Split into the original request and the downstream token, if any.
    pub fn into_parts(self) -> (Request, Option<T>) {
        let token = match self.state {
            ForwardState::AwaitingUpstream(token) => Some(token),
            ForwardState::Cancelled => None,
        };
        (self.request, token)
    }

    fn cancel(&mut self) -> Option<T> {
        match std::mem::replace(&mut self.state, ForwardState::Cancelled) {
            ForwardState::AwaitingUpstream(token) => Some(token),
            ForwardState::Cancelled => None,
        }
    }
}

/// Thread-safe map of outstanding forwards.
///
/// All operations take a short internal lock; none call out to the engine
/// while holding it.
#[derive(Debug)]
pub struct SessionRegistry<T> {
    pending: Mutex<HashMap<CallContext, PendingForward<T>>>,
    next_call_context: AtomicU64,
}

impl<T> Default for SessionRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SessionRegistry<T> {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
            next_call_context: AtomicU64::new(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CallContext, PendingForward<T>>> {
        // Entries stay consistent across a panicking holder; every mutation is
        // a single map operation.
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Allocate a fresh call context from the registry's own counter.
    pub fn alloc_call_context(&self) -> CallContext {
        CallContext::new(self.next_call_context.fetch_add(1, Ordering::Relaxed))
    }

    /// Register a forward before its upstream call is issued.
    ///
    /// If the call context is already outstanding the existing entry is left
    /// alone and `entry` is handed back.
    pub fn insert(&self, entry: PendingForward<T>) -> Result<(), PendingForward<T>> {
        use std::collections::hash_map::Entry;

        match self.lock().entry(entry.call_context) {
            Entry::Occupied(_) => Err(entry),
            Entry::Vacant(slot) => {
                slot.insert(entry);
                Ok(())
            }
        }
    }

    /// Remove and return the entry for `ctx`.
    ///
    /// At most one caller gets `Some` for a given registration.
    pub fn take(&self, ctx: CallContext) -> Option<PendingForward<T>> {
        self.lock().remove(&ctx)
    }

    /// Mark the entry for `ctx` cancelled and return its downstream token.
    ///
    /// The entry stays registered so the eventual completion is discarded
    /// quietly. Returns `None` if there is no entry or it was already
    /// cancelled.
    pub fn cancel(&self, ctx: CallContext) -> Option<T> {
        self.lock().get_mut(&ctx).and_then(PendingForward::cancel)
    }

    /// Cancel the forward serving the client exchange `(source, request_id)`.
    pub fn cancel_downstream(&self, source: SocketAddr, request_id: i32) -> Option<(CallContext, T)> {
        let mut pending = self.lock();
        pending
            .values_mut()
            .filter(|p| !p.is_cancelled())
            .find(|p| p.request.source == source && p.request.request_id() == request_id)
            .and_then(|p| p.cancel().map(|token| (p.call_context, token)))
    }

    /// Remove every entry created before `cutoff`.
    pub fn drain_expired(&self, cutoff: Instant) -> Vec<PendingForward<T>> {
        let mut pending = self.lock();
        let expired: Vec<CallContext> = pending
            .iter()
            .filter(|(_, p)| p.created < cutoff)
            .map(|(ctx, _)| *ctx)
            .collect();
        expired
            .into_iter()
            .filter_map(|ctx| pending.remove(&ctx))
            .collect()
    }

    pub fn contains(&self, ctx: CallContext) -> bool {
        self.lock().contains_key(&ctx)
    }

    /// Number of registered forwards, cancelled ones included.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::oid;
    use crate::pdu::Pdu;

    fn request(id: i32) -> Request {
        Request::new(
            "10.0.0.7:50123".parse().unwrap(),
            Pdu::get(id, &[oid!(1, 3, 6, 1, 2, 1, 1, 5, 0)]),
        )
    }

    fn entry(ctx: u64, id: i32, token: u32) -> PendingForward<u32> {
        PendingForward::new(CallContext::new(ctx), request(id), RequestKind::Get, 1, token)
    }

    #[test]
    fn test_alloc_is_monotonic() {
        let registry = SessionRegistry::<u32>::new();
        let a = registry.alloc_call_context();
        let b = registry.alloc_call_context();
        assert_eq!(a, CallContext::new(1));
        assert!(b > a);
    }

    #[test]
    fn test_insert_then_take_once() {
        let registry = SessionRegistry::new();
        registry.insert(entry(1, 100, 7)).unwrap();
        assert!(registry.contains(CallContext::new(1)));

        let taken = registry.take(CallContext::new(1)).unwrap();
        assert_eq!(taken.request.request_id(), 100);
        assert_eq!(taken.into_token(), Some(7));

        assert!(registry.take(CallContext::new(1)).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_duplicate_insert_keeps_original() {
        let registry = SessionRegistry::new();
        registry.insert(entry(1, 100, 7)).unwrap();
        let rejected = registry.insert(entry(1, 200, 8)).unwrap_err();
        assert_eq!(rejected.request.request_id(), 200);
        assert_eq!(rejected.into_token(), Some(8));

        let taken = registry.take(CallContext::new(1)).unwrap();
        assert_eq!(taken.request.request_id(), 100);
    }

    #[test]
    fn test_cancel_keeps_tombstone() {
        let registry = SessionRegistry::new();
        registry.insert(entry(3, 100, 7)).unwrap();

        assert_eq!(registry.cancel(CallContext::new(3)), Some(7));
        assert_eq!(registry.cancel(CallContext::new(3)), None);
        assert_eq!(registry.len(), 1);

        let taken = registry.take(CallContext::new(3)).unwrap();
        assert!(taken.is_cancelled());
        assert_eq!(taken.into_token(), None);
    }

    #[test]
    fn test_cancel_unknown() {
        let registry = SessionRegistry::<u32>::new();
        assert_eq!(registry.cancel(CallContext::new(99)), None);
    }

    #[test]
    fn test_cancel_downstream_matches_source_and_id() {
        let registry = SessionRegistry::new();
        registry.insert(entry(1, 100, 7)).unwrap();
        registry.insert(entry(2, 200, 8)).unwrap();

        let source = "10.0.0.7:50123".parse().unwrap();
        let other: SocketAddr = "10.0.0.8:50123".parse().unwrap();

        assert_eq!(registry.cancel_downstream(other, 200), None);
        assert_eq!(
            registry.cancel_downstream(source, 200),
            Some((CallContext::new(2), 8))
        );
        assert_eq!(registry.cancel_downstream(source, 200), None);
        assert!(matches!(
            registry.take(CallContext::new(1)).unwrap().state(),
            ForwardState::AwaitingUpstream(7)
        ));
    }

    #[test]
    fn test_drain_expired() {
        let registry = SessionRegistry::new();
        let pending = entry(1, 100, 7);
        let created = pending.created;
        registry.insert(pending).unwrap();

        assert!(registry.drain_expired(created).is_empty());
        assert_eq!(registry.len(), 1);

        let after = Instant::now() + Duration::from_secs(1);
        let expired = registry.drain_expired(after);
        assert_eq!(expired.len(), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_concurrent_take_single_winner() {
        let registry = Arc::new(SessionRegistry::new());
        registry.insert(entry(1, 100, 7)).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || registry.take(CallContext::new(1)).is_some())
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }
}
