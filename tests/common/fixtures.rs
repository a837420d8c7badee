//! Common test fixtures and constants.

use std::net::SocketAddr;

use snmp_gateway::gateway::Request;
use snmp_gateway::v3::{AuthProtocol, PrivProtocol, UsmCredentials};
use snmp_gateway::{GatewayConfig, Oid, Pdu, oid};

// =============================================================================
// Standard system MIB OIDs (1.3.6.1.2.1.1.*)
// =============================================================================

pub fn sys_descr() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)
}
pub fn sys_uptime() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 3, 0)
}
pub fn sys_name() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 5, 0)
}
pub fn sys_location() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 6, 0)
}

/// Enterprise device-name OID answered locally by the default fixture.
pub fn device_name() -> Oid {
    oid!(1, 3, 6, 1, 4, 1, 6302, 2, 1, 2, 28, 6, 0)
}

/// Interfaces table column used for bulk tests: ifDescr
pub fn if_descr() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 2)
}

// =============================================================================
// Local table and upstream
// =============================================================================

pub const DEVICE_NAME: &str = "SNMP Proxy Device";
pub const UPTIME: &str = "123456";

pub const UPSTREAM: &str = "192.168.1.100:161";
pub const PROXY_USER: &str = "proxyUser";
pub const AUTH_PASSWORD: &str = "authPassword123";
pub const PRIV_PASSWORD: &str = "privPassword123";

pub fn credentials() -> UsmCredentials {
    UsmCredentials::new(PROXY_USER)
        .auth(AuthProtocol::Sha1, AUTH_PASSWORD)
        .privacy(PrivProtocol::Aes128, PRIV_PASSWORD)
}

/// Gateway config with the two standard local OIDs and no pending timeout.
pub fn config() -> GatewayConfig {
    config_builder().build().unwrap()
}

pub fn config_builder() -> snmp_gateway::GatewayConfigBuilder {
    GatewayConfig::builder()
        .upstream(UPSTREAM)
        .credentials(credentials())
        .local(device_name().to_string(), DEVICE_NAME)
        .local(sys_uptime().to_string(), UPTIME)
}

// =============================================================================
// Requests
// =============================================================================

pub fn client() -> SocketAddr {
    "10.0.0.7:50123".parse().unwrap()
}

pub fn other_client() -> SocketAddr {
    "10.0.0.8:40000".parse().unwrap()
}

pub fn get(request_id: i32, oids: &[Oid]) -> Request {
    Request::new(client(), Pdu::get(request_id, oids))
}
