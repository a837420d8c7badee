//! SNMPv3 request-routing gateway.
//!
//! `snmp-gateway` answers a small, fixed set of OIDs itself and proxies every
//! other request to one upstream SNMPv3 agent, relaying the upstream answer
//! back to the original client. It is the routing core of such a gateway: the
//! SNMP protocol engine (sockets, BER, USM) is plugged in through the
//! [`ProtocolEngine`](engine::ProtocolEngine) trait.
//!
//! # Overview
//!
//! - [`LocalTable`](gateway::LocalTable): exact-match OID → value table
//! - [`classify`](gateway::classify()): all bindings local, or forward the whole request
//! - [`SessionRegistry`](gateway::SessionRegistry): outstanding forwards keyed by
//!   [`CallContext`](engine::CallContext)
//! - [`build_response`](gateway::build_response): local values, upstream reply,
//!   or error status into a Response PDU
//! - [`Gateway`]: ties the above to an engine
//!
//! # Example
//!
//! ```rust
//! use snmp_gateway::engine::{ChannelEngine, EngineCommand, UpstreamReply};
//! use snmp_gateway::gateway::{Gateway, Request};
//! use snmp_gateway::{GatewayConfig, Pdu, Value, VarBind, oid};
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
//! // sysName.0 is not local, so the request goes upstream
//! let source = "10.0.0.7:50123".parse().unwrap();
//! let pdu = Pdu::get(42, &[oid!(1, 3, 6, 1, 2, 1, 1, 5, 0)]);
//! gateway.on_request(Request::new(source, pdu), source);
//!
//! let Ok(EngineCommand::Upstream(call)) = commands.try_recv() else {
//!     unreachable!()
//! };
//! gateway.on_upstream_complete(
//!     call.call_context,
//!     Ok(UpstreamReply::success(vec![VarBind::new(
//!         oid!(1, 3, 6, 1, 2, 1, 1, 5, 0),
//!         Value::from("router1"),
//!     )])),
//! );
//!
//! let Ok(EngineCommand::Respond { response, .. }) = commands.try_recv() else {
//!     unreachable!()
//! };
//! assert_eq!(response.request_id, 42);
//! assert_eq!(response.varbinds[0].value, Value::from("router1"));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! # Features
//!
//! - `serde`: JSON configuration loading (`GatewayConfig::from_json`,
//!   `GatewayConfig::load`)
//! - `cli`: the `snmpgw-check` utility
//! - `rt-multi-thread`: multi-threaded tokio runtime

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod config;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod oid;
pub mod pdu;
pub mod prelude;
pub mod v3;
pub mod value;
pub mod varbind;

#[cfg(feature = "cli")]
#[cfg_attr(docsrs, doc(cfg(feature = "cli")))]
pub mod cli;

pub use config::{GatewayConfig, GatewayConfigBuilder, UpstreamTarget};
pub use engine::{
    CallContext, ProtocolEngine, UpstreamCall, UpstreamError, UpstreamOutcome, UpstreamReply,
};
pub use error::{Error, ErrorStatus, Result};
pub use gateway::{Gateway, LocalTable, Request};
pub use oid::Oid;
pub use pdu::{Pdu, PduType, RequestKind};
pub use value::Value;
pub use varbind::VarBind;
