//! Boundary with the SNMP protocol engine.
//!
//! The engine owns everything below the gateway: UDP sockets, message framing,
//! BER encoding, and USM authentication/privacy. The gateway talks to it
//! through the [`ProtocolEngine`] trait:
//!
//! ```text
//!            on_request(request, token)              issue_upstream(call)
//!  engine  ----------------------------->  Gateway  ---------------------->  engine
//!          <-----------------------------           <----------------------
//!            send_response(token, pdu)          on_upstream_complete(ctx, outcome)
//! ```
//!
//! Both outbound calls must return promptly; the engine queues the work and
//! reports the upstream result later by calling
//! [`Gateway::on_upstream_complete`](crate::Gateway::on_upstream_complete)
//! with the [`CallContext`] it was handed.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::mpsc;

use crate::config::UpstreamTarget;
use crate::error::{Error, ErrorStatus, Result};
use crate::pdu::{Pdu, RequestKind};
use crate::varbind::VarBind;

/// Identifier of one upstream exchange.
///
/// The gateway keys its session registry by this value; the engine passes it
/// back verbatim when the exchange completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallContext(u64);

impl CallContext {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn id(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for CallContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One outbound request to the upstream agent.
#[derive(Debug, Clone)]
pub struct UpstreamCall {
    /// Context to report back with the outcome.
    pub call_context: CallContext,
    /// Where to send it and with which credentials.
    pub target: Arc<UpstreamTarget>,
    /// Upstream operation; selects the engine primitive.
    pub kind: RequestKind,
    /// SNMPv3 context name of the original request.
    pub context_name: Bytes,
    /// Request bindings, in the client's order.
    pub varbinds: Vec<VarBind>,
}

impl UpstreamCall {
    /// Build the request PDU for this call with the given request ID.
    pub fn to_pdu(&self, request_id: i32) -> Pdu {
        let (error_status, error_index) = match self.kind {
            RequestKind::GetBulk {
                non_repeaters,
                max_repetitions,
            } => (non_repeaters, max_repetitions),
            _ => (0, 0),
        };
        Pdu {
            pdu_type: self.kind.pdu_type(),
            request_id,
            error_status,
            error_index,
            varbinds: self.varbinds.clone(),
        }
    }
}

/// Response received from the upstream agent.
///
/// The agent's own error status is kept so it reaches the client unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamReply {
    pub error_status: ErrorStatus,
    /// 1-based index of the failing binding, 0 if none.
    pub error_index: u32,
    pub varbinds: Vec<VarBind>,
}

impl UpstreamReply {
    /// A `noError` reply carrying `varbinds`.
    pub fn success(varbinds: Vec<VarBind>) -> Self {
        Self {
            error_status: ErrorStatus::NoError,
            error_index: 0,
            varbinds,
        }
    }

    /// Take the status, index and bindings from a decoded response PDU.
    pub fn from_pdu(pdu: Pdu) -> Self {
        Self {
            error_status: pdu.error_status(),
            error_index: pdu.error_index.max(0) as u32,
            varbinds: pdu.varbinds,
        }
    }
}

/// Upstream exchange failure, as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum UpstreamError {
    /// No reply within the engine's timeout and retries.
    #[error("no response from upstream after {elapsed:?}")]
    Timeout { elapsed: Duration },

    /// Socket or routing failure.
    #[error("upstream transport error: {cause}")]
    Transport { cause: Box<str> },

    /// USM rejected the exchange (unknown user, wrong digest, time window).
    #[error("upstream authentication failed: {cause}")]
    Authentication { cause: Box<str> },

    /// Anything else the engine reports.
    #[error("upstream request failed: {cause}")]
    Other { cause: Box<str> },
}

impl UpstreamError {
    pub fn transport(cause: impl Into<Box<str>>) -> Self {
        Self::Transport {
            cause: cause.into(),
        }
    }

    pub fn authentication(cause: impl Into<Box<str>>) -> Self {
        Self::Authentication {
            cause: cause.into(),
        }
    }

    pub fn other(cause: impl Into<Box<str>>) -> Self {
        Self::Other {
            cause: cause.into(),
        }
    }

    /// The status reported to the client for this failure.
    pub fn error_status(&self) -> ErrorStatus {
        match self {
            Self::Authentication { .. } => ErrorStatus::AuthorizationError,
            _ => ErrorStatus::GenErr,
        }
    }
}

/// Outcome of an upstream exchange.
pub type UpstreamOutcome = std::result::Result<UpstreamReply, UpstreamError>;

/// The SNMP protocol engine, as seen by the gateway.
///
/// # Downstream tokens
///
/// `Token` identifies one client exchange. It is a capability: whoever holds
/// it may complete that exchange exactly once, which is why
/// [`send_response`](ProtocolEngine::send_response) takes it by value. The
/// gateway never clones it.
///
/// # Blocking
///
/// Neither method may block. Queue the work and return.
pub trait ProtocolEngine: Send + Sync + 'static {
    /// Per-exchange downstream state handed to the gateway with each request.
    type Token: Send + 'static;

    /// Start one upstream exchange.
    ///
    /// On completion the engine calls
    /// [`Gateway::on_upstream_complete`](crate::Gateway::on_upstream_complete)
    /// with `call.call_context`. Returning an error means the exchange was
    /// never started and no completion will follow.
    fn issue_upstream(&self, call: UpstreamCall) -> Result<()>;

    /// Transmit `response` to the client and release the exchange state.
    fn send_response(&self, token: Self::Token, response: Pdu) -> Result<()>;

    /// Allocate the call context for the next upstream exchange.
    ///
    /// Engines with their own correlation identifiers return them here. The
    /// default returns `None` and the gateway uses its own counter.
    fn alloc_call_context(&self) -> Option<CallContext> {
        None
    }
}

impl<E: ProtocolEngine> ProtocolEngine for Arc<E> {
    type Token = E::Token;

    fn issue_upstream(&self, call: UpstreamCall) -> Result<()> {
        (**self).issue_upstream(call)
    }

    fn send_response(&self, token: Self::Token, response: Pdu) -> Result<()> {
        (**self).send_response(token, response)
    }

    fn alloc_call_context(&self) -> Option<CallContext> {
        (**self).alloc_call_context()
    }
}

/// Work handed to an async engine loop by [`ChannelEngine`].
#[derive(Debug)]
pub enum EngineCommand<T> {
    /// Perform this upstream exchange.
    Upstream(UpstreamCall),
    /// Send this response and release the exchange.
    Respond { token: T, response: Pdu },
}

/// A [`ProtocolEngine`] that forwards every command over a tokio channel.
///
/// Lets a transport task own the sockets and drive the gateway from a single
/// `select!` loop:
///
/// ```rust,no_run
/// use snmp_gateway::engine::{ChannelEngine, EngineCommand};
///
/// # async fn example() {
/// let (engine, mut commands) = ChannelEngine::<std::net::SocketAddr>::new();
/// // let gateway = Gateway::new(engine, config)?;
/// while let Some(cmd) = commands.recv().await {
///     match cmd {
///         EngineCommand::Upstream(call) => { /* send to call.target */ }
///         EngineCommand::Respond { token, response } => { /* send to token */ }
///     }
/// }
/// # }
/// ```
pub struct ChannelEngine<T> {
    tx: mpsc::UnboundedSender<EngineCommand<T>>,
}

impl<T: Send + 'static> ChannelEngine<T> {
    /// Create the engine and the receiving end of its command channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<EngineCommand<T>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl<T> Clone for ChannelEngine<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T: Send + 'static> ProtocolEngine for ChannelEngine<T> {
    type Token = T;

    fn issue_upstream(&self, call: UpstreamCall) -> Result<()> {
        self.tx
            .send(EngineCommand::Upstream(call))
            .map_err(|_| Error::engine("engine command channel closed"))
    }

    fn send_response(&self, token: T, response: Pdu) -> Result<()> {
        self.tx
            .send(EngineCommand::Respond { token, response })
            .map_err(|_| Error::engine("engine command channel closed"))
    }
}
