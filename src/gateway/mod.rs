//! The request-routing gateway.
//!
//! [`Gateway`] sits between a protocol engine and one upstream agent. Each
//! client request is answered from the [`LocalTable`] when every OID it names
//! is local; otherwise the whole request is forwarded upstream and the
//! upstream outcome is relayed back to the client.
//!
//! # Example
//!
//! ```rust
//! use snmp_gateway::engine::{ChannelEngine, EngineCommand};
//! use snmp_gateway::gateway::{Gateway, Request};
//! use snmp_gateway::{GatewayConfig, Pdu, Value, oid};
//!
//! # fn example() -> snmp_gateway::Result<()> {
//! let config = GatewayConfig::builder()
//!     .upstream("192.168.1.100:161")
//!     .local("1.3.6.1.2.1.1.3.0", "123456")
//!     .build()?;
//!
//! let (engine, mut commands) = ChannelEngine::new();
//! let gateway = Gateway::new(engine, config);
//!
//! let source = "10.0.0.7:50123".parse().unwrap();
//! let pdu = Pdu::get(1, &[oid!(1, 3, 6, 1, 2, 1, 1, 3, 0)]);
//! gateway.on_request(Request::new(source, pdu), source);
//!
//! match commands.try_recv() {
//!     Ok(EngineCommand::Respond { response, .. }) => {
//!         assert_eq!(response.varbinds[0].value, Value::from("123456"));
//!     }
//!     _ => unreachable!(),
//! }
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! # Exactly one response
//!
//! Every request handed to [`Gateway::on_request`] produces exactly one call
//! to [`ProtocolEngine::send_response`], unless it is cancelled first.
//! Forwarded requests are parked in the [`SessionRegistry`] together with
//! their downstream token; the completion, cancel, and expiry paths all
//! remove the entry before touching the token, and only one of them can win.

pub mod classify;
pub mod local;
pub mod registry;
pub mod request;
pub mod response;

use std::net::SocketAddr;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::config::GatewayConfig;
use crate::engine::{CallContext, ProtocolEngine, UpstreamCall, UpstreamOutcome};
use crate::pdu::RequestKind;
use crate::varbind::DisplayVarBinds;

pub use classify::{Disposition, classify};
pub use local::LocalTable;
pub use registry::{ForwardState, PendingForward, SessionRegistry};
pub use request::Request;
pub use response::{Resolution, build_response, deliver};

/// SNMP request-routing gateway.
///
/// Cheap to clone; clones share the same registry and engine.
pub struct Gateway<E: ProtocolEngine> {
    inner: Arc<GatewayInner<E>>,
}

struct GatewayInner<E: ProtocolEngine> {
    engine: E,
    config: GatewayConfig,
    registry: SessionRegistry<E::Token>,
}

impl<E: ProtocolEngine> Clone for Gateway<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: ProtocolEngine> Gateway<E> {
    /// Create a gateway driving `engine` with `config`.
    pub fn new(engine: E, config: GatewayConfig) -> Self {
        tracing::info!(
            listen = %config.listen(),
            upstream = %config.upstream().address,
            user = config.upstream().credentials.username(),
            security_level = %config.upstream().credentials.security_level(),
            local_oids = config.local_table().len(),
            "gateway configured"
        );

        Self {
            inner: Arc::new(GatewayInner {
                engine,
                config,
                registry: SessionRegistry::new(),
            }),
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.inner.config
    }

    pub fn local_table(&self) -> &LocalTable {
        self.inner.config.local_table()
    }

    pub fn engine(&self) -> &E {
        &self.inner.engine
    }

    /// Number of forwards still registered, cancelled ones included.
    pub fn pending_count(&self) -> usize {
        self.inner.registry.len()
    }

    /// Handle one incoming client request.
    ///
    /// Answers immediately when every binding is local, otherwise forwards the
    /// request upstream. Never blocks.
    pub fn on_request(&self, request: Request, token: E::Token) {
        tracing::debug!(
            snmp.source = %request.source,
            snmp.request_id = request.request_id(),
            pdu_type = %request.pdu.pdu_type,
            varbinds = %DisplayVarBinds(request.varbinds()),
            "received request"
        );

        let Some(kind) = request.kind() else {
            self.reject_unsupported(request, token);
            return;
        };

        match classify(self.local_table(), request.varbinds()) {
            Disposition::AllLocal(varbinds) => {
                tracing::debug!(
                    snmp.source = %request.source,
                    snmp.request_id = request.request_id(),
                    varbinds = %DisplayVarBinds(&varbinds),
                    "answering locally"
                );
                let response = build_response(&request.pdu, Resolution::Local(varbinds));
                deliver(&self.inner.engine, token, response);
            }
            Disposition::NeedsForward { first_remote } => {
                self.dispatch(request, kind, failure_index(first_remote), token);
            }
        }
    }

    /// Forward `request` upstream regardless of the local table.
    pub fn forward(&self, request: Request, token: E::Token) {
        let Some(kind) = request.kind() else {
            self.reject_unsupported(request, token);
            return;
        };

        let table = self.local_table();
        let index = request
            .varbinds()
            .iter()
            .position(|vb| !table.contains(&vb.oid))
            .map_or(0, failure_index);
        self.dispatch(request, kind, index, token);
    }

    fn reject_unsupported(&self, request: Request, token: E::Token) {
        tracing::warn!(
            snmp.source = %request.source,
            snmp.request_id = request.request_id(),
            pdu_type = %request.pdu.pdu_type,
            "unsupported PDU type"
        );
        let response = build_response(&request.pdu, Resolution::gen_err(0));
        deliver(&self.inner.engine, token, response);
    }

    fn dispatch(&self, request: Request, kind: RequestKind, failure_index: u32, token: E::Token) {
        let inner = &*self.inner;
        let ctx = inner
            .engine
            .alloc_call_context()
            .unwrap_or_else(|| inner.registry.alloc_call_context());

        let target = Arc::clone(inner.config.upstream());
        let context_name = if target.context_name.is_empty() {
            request.context_name.clone()
        } else {
            target.context_name.clone()
        };
        let call = UpstreamCall {
            call_context: ctx,
            target,
            kind,
            context_name,
            varbinds: request.pdu.varbinds.clone(),
        };

        tracing::debug!(
            snmp.call_context = %ctx,
            snmp.source = %request.source,
            snmp.request_id = request.request_id(),
            %kind,
            upstream = %call.target.address,
            "forwarding request upstream"
        );

        // Register before issuing so a completion racing back from the engine
        // always finds its entry.
        let entry = PendingForward::new(ctx, request, kind, failure_index, token);
        if let Err(rejected) = inner.registry.insert(entry) {
            tracing::warn!(
                snmp.call_context = %ctx,
                snmp.request_id = rejected.request.request_id(),
                "call context already outstanding"
            );
            self.fail(rejected);
            return;
        }

        if let Err(e) = inner.engine.issue_upstream(call) {
            tracing::warn!(
                snmp.call_context = %ctx,
                error = %e,
                "engine refused upstream call"
            );
            if let Some(entry) = inner.registry.take(ctx) {
                self.fail(entry);
            }
        }
    }

    /// Answer a forward with `genErr` at its failure index.
    fn fail(&self, entry: PendingForward<E::Token>) {
        let index = entry.failure_index;
        let (request, token) = entry.into_parts();
        if let Some(token) = token {
            let response = build_response(&request.pdu, Resolution::gen_err(index));
            deliver(&self.inner.engine, token, response);
        }
    }

    /// Deliver the outcome of the upstream exchange registered as `ctx`.
    ///
    /// Called by the engine, from any thread, at most once per exchange.
    /// Completions for unknown contexts (already answered, expired, or never
    /// issued) are logged and dropped; completions for cancelled forwards are
    /// dropped quietly.
    pub fn on_upstream_complete(&self, ctx: CallContext, outcome: UpstreamOutcome) {
        let Some(entry) = self.inner.registry.take(ctx) else {
            tracing::warn!(
                snmp.call_context = %ctx,
                "stale or duplicate upstream completion"
            );
            return;
        };

        let index = entry.failure_index;
        let (request, token) = entry.into_parts();
        let Some(token) = token else {
            tracing::debug!(
                snmp.call_context = %ctx,
                snmp.request_id = request.request_id(),
                "discarding completion for cancelled forward"
            );
            return;
        };

        let resolution = match outcome {
            Ok(reply) => {
                tracing::debug!(
                    snmp.call_context = %ctx,
                    snmp.request_id = request.request_id(),
                    snmp.error_status = %reply.error_status,
                    "upstream reply received"
                );
                Resolution::Upstream(reply)
            }
            Err(e) => {
                tracing::warn!(
                    snmp.call_context = %ctx,
                    snmp.source = %request.source,
                    snmp.request_id = request.request_id(),
                    error = %e,
                    "upstream request failed"
                );
                Resolution::Failed {
                    status: e.error_status(),
                    index,
                }
            }
        };

        let response = build_response(&request.pdu, resolution);
        deliver(&self.inner.engine, token, response);
    }

    /// Cancel the forward registered as `ctx` and return its downstream token.
    ///
    /// No response will be sent for it; the token goes back to the caller.
    /// The registry keeps a `Cancelled` marker until the upstream outcome
    /// arrives or the entry expires.
    pub fn cancel(&self, ctx: CallContext) -> Option<E::Token> {
        let token = self.inner.registry.cancel(ctx);
        if token.is_some() {
            tracing::debug!(snmp.call_context = %ctx, "forward cancelled");
        }
        token
    }

    /// Cancel the forward serving the client exchange `(source, request_id)`.
    pub fn cancel_downstream(&self, source: SocketAddr, request_id: i32) -> Option<E::Token> {
        let (ctx, token) = self.inner.registry.cancel_downstream(source, request_id)?;
        tracing::debug!(
            snmp.call_context = %ctx,
            snmp.source = %source,
            snmp.request_id = request_id,
            "forward cancelled by client"
        );
        Some(token)
    }

    /// Expire forwards outstanding longer than the configured timeout.
    ///
    /// Each expired forward is answered with `genErr`; expired cancelled
    /// entries are dropped. Returns the number of entries removed. Does
    /// nothing when no timeout is configured.
    pub fn sweep_expired(&self, now: Instant) -> usize {
        let Some(timeout) = self.inner.config.pending_timeout() else {
            return 0;
        };
        let Some(cutoff) = now.checked_sub(timeout) else {
            return 0;
        };

        let expired = self.inner.registry.drain_expired(cutoff);
        let count = expired.len();
        for entry in expired {
            if !entry.is_cancelled() {
                tracing::warn!(
                    snmp.call_context = %entry.call_context,
                    snmp.source = %entry.request.source,
                    snmp.request_id = entry.request.request_id(),
                    ?timeout,
                    "upstream forward expired"
                );
            }
            self.fail(entry);
        }
        count
    }

    /// Run [`sweep_expired`](Self::sweep_expired) every `period` on the
    /// current tokio runtime.
    ///
    /// The task holds only a weak reference and exits once every `Gateway`
    /// clone is dropped.
    pub fn spawn_expiry_task(&self, period: Duration) -> JoinHandle<()> {
        let weak: Weak<GatewayInner<E>> = Arc::downgrade(&self.inner);
        let period = period.max(Duration::from_millis(1));

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                let removed = Gateway { inner }.sweep_expired(Instant::now());
                if removed > 0 {
                    tracing::trace!(removed, "expiry sweep");
                }
            }
        })
    }
}

impl<E: ProtocolEngine + std::fmt::Debug> std::fmt::Debug for Gateway<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("engine", &self.inner.engine)
            .field("config", &self.inner.config)
            .field("pending", &self.inner.registry.len())
            .finish()
    }
}

/// 1-based error index for a 0-based binding position.
fn failure_index(position: usize) -> u32 {
    u32::try_from(position + 1).unwrap_or(u32::MAX)
}
