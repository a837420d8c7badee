//! Recording protocol engine for gateway tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use snmp_gateway::engine::{CallContext, ProtocolEngine, UpstreamCall};
use snmp_gateway::gateway::Gateway;
use snmp_gateway::{Error, GatewayConfig, Pdu, Result};

/// Downstream token: a test-chosen exchange number.
pub type Token = u32;

/// Engine that records every upstream call and downstream response.
#[derive(Debug, Default)]
pub struct RecordingEngine {
    calls: Mutex<Vec<UpstreamCall>>,
    responses: Mutex<Vec<(Token, Pdu)>>,
    contexts: Mutex<VecDeque<CallContext>>,
    refuse_upstream: AtomicBool,
    refuse_send: AtomicBool,
}

impl RecordingEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Hand out these call contexts before falling back to the gateway's.
    pub fn supply_contexts(&self, contexts: impl IntoIterator<Item = u64>) {
        self.contexts
            .lock()
            .unwrap()
            .extend(contexts.into_iter().map(CallContext::new));
    }

    pub fn refuse_upstream(&self, refuse: bool) {
        self.refuse_upstream.store(refuse, Ordering::SeqCst);
    }

    pub fn refuse_send(&self, refuse: bool) {
        self.refuse_send.store(refuse, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<UpstreamCall> {
        self.calls.lock().unwrap().clone()
    }

    /// The single recorded upstream call. Panics unless exactly one was made.
    pub fn only_call(&self) -> UpstreamCall {
        let calls = self.calls();
        assert_eq!(calls.len(), 1, "expected exactly one upstream call");
        calls.into_iter().next().unwrap()
    }

    pub fn responses(&self) -> Vec<(Token, Pdu)> {
        self.responses.lock().unwrap().clone()
    }

    /// All responses sent for `token`.
    pub fn responses_for(&self, token: Token) -> Vec<Pdu> {
        self.responses()
            .into_iter()
            .filter(|(t, _)| *t == token)
            .map(|(_, pdu)| pdu)
            .collect()
    }

    /// The single response for `token`. Panics unless exactly one was sent.
    pub fn only_response(&self, token: Token) -> Pdu {
        let responses = self.responses_for(token);
        assert_eq!(
            responses.len(),
            1,
            "expected exactly one response for token {token}"
        );
        responses.into_iter().next().unwrap()
    }
}

impl ProtocolEngine for RecordingEngine {
    type Token = Token;

    fn issue_upstream(&self, call: UpstreamCall) -> Result<()> {
        if self.refuse_upstream.load(Ordering::SeqCst) {
            return Err(Error::engine("upstream refused"));
        }
        self.calls.lock().unwrap().push(call);
        Ok(())
    }

    fn send_response(&self, token: Token, response: Pdu) -> Result<()> {
        // Record even when refusing so tests can count attempts
        self.responses.lock().unwrap().push((token, response));
        if self.refuse_send.load(Ordering::SeqCst) {
            return Err(Error::engine("client unreachable"));
        }
        Ok(())
    }

    fn alloc_call_context(&self) -> Option<CallContext> {
        self.contexts.lock().unwrap().pop_front()
    }
}

/// A gateway over a fresh recording engine.
pub fn gateway_with(config: GatewayConfig) -> (Gateway<Arc<RecordingEngine>>, Arc<RecordingEngine>) {
    let engine = RecordingEngine::new();
    (Gateway::new(Arc::clone(&engine), config), engine)
}

/// A gateway over the default fixture config.
pub fn gateway() -> (Gateway<Arc<RecordingEngine>>, Arc<RecordingEngine>) {
    gateway_with(super::config())
}
