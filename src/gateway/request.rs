//! Incoming client request.

use std::net::SocketAddr;

use bytes::Bytes;

use crate::pdu::{Pdu, RequestKind};
use crate::varbind::VarBind;

/// A decoded client request, as delivered by the protocol engine.
///
/// The engine owns the exchange; the gateway only sees the PDU and a few
/// annotations from the message header.
#[derive(Debug, Clone)]
pub struct Request {
    /// Source address of the request.
    pub source: SocketAddr,
    /// USM user name the request was authenticated as.
    pub security_name: Bytes,
    /// SNMPv3 context name (empty for the default context).
    pub context_name: Bytes,
    /// The request PDU.
    pub pdu: Pdu,
}

impl Request {
    /// Create a request in the default context.
    pub fn new(source: SocketAddr, pdu: Pdu) -> Self {
        Self {
            source,
            security_name: Bytes::new(),
            context_name: Bytes::new(),
            pdu,
        }
    }

    /// Set the USM user name.
    pub fn with_security_name(mut self, name: impl Into<Bytes>) -> Self {
        self.security_name = name.into();
        self
    }

    /// Set the context name.
    pub fn with_context_name(mut self, name: impl Into<Bytes>) -> Self {
        self.context_name = name.into();
        self
    }

    /// Request ID from the PDU.
    pub fn request_id(&self) -> i32 {
        self.pdu.request_id
    }

    /// Request bindings, in the client's order.
    pub fn varbinds(&self) -> &[VarBind] {
        &self.pdu.varbinds
    }

    /// The request kind, or `None` for PDU types the gateway doesn't serve.
    pub fn kind(&self) -> Option<RequestKind> {
        RequestKind::from_pdu(&self.pdu)
    }
}
