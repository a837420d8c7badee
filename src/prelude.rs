//! Prelude module for convenient imports.
//!
//! ```rust,no_run
//! use snmp_gateway::prelude::*;
//! ```
//!
//! This imports:
//! - The gateway and its engine boundary: [`Gateway`], [`ProtocolEngine`], [`Request`]
//! - Core types: [`Oid`], [`Value`], [`VarBind`], [`Pdu`]
//! - Configuration: [`GatewayConfig`], [`UsmCredentials`], [`AuthProtocol`], [`PrivProtocol`]
//! - Error handling: [`Error`], [`Result`], [`ErrorStatus`]
//! - The [`oid!`] macro

pub use crate::config::GatewayConfig;
pub use crate::engine::{CallContext, ProtocolEngine, UpstreamError, UpstreamReply};
pub use crate::error::{Error, ErrorStatus, Result};
pub use crate::gateway::{Gateway, Request};
pub use crate::oid::Oid;
pub use crate::pdu::Pdu;
pub use crate::v3::{AuthProtocol, PrivProtocol, UsmCredentials};
pub use crate::value::Value;
pub use crate::varbind::VarBind;

#[doc(no_inline)]
pub use crate::oid;
