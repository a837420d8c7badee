//! Gateway configuration.
//!
//! Build a [`GatewayConfig`] with [`GatewayConfig::builder`], or load one from a
//! JSON document with the `serde` feature:
//!
//! ```rust
//! use snmp_gateway::GatewayConfig;
//! use snmp_gateway::v3::{AuthProtocol, PrivProtocol, UsmCredentials};
//!
//! # fn example() -> snmp_gateway::Result<()> {
//! let config = GatewayConfig::builder()
//!     .listen("0.0.0.0:161")
//!     .upstream("192.168.1.100:161")
//!     .credentials(
//!         UsmCredentials::new("proxyUser")
//!             .auth(AuthProtocol::Sha1, "authPassword123")
//!             .privacy(PrivProtocol::Aes128, "privPassword123"),
//!     )
//!     .local("1.3.6.1.4.1.6302.2.1.2.28.6.0", "SNMP Proxy Device")
//!     .local("1.3.6.1.2.1.1.3.0", "123456")
//!     .build()?;
//!
//! assert_eq!(config.local_table().len(), 2);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

use crate::error::{ConfigErrorKind, Error, Result};
use crate::gateway::LocalTable;
use crate::v3::UsmCredentials;
use crate::value::Value;

/// Default listen address (all interfaces, standard agent port).
pub const DEFAULT_LISTEN: &str = "0.0.0.0:161";

/// The upstream agent every forwarded request goes to.
#[derive(Debug, Clone)]
pub struct UpstreamTarget {
    pub address: SocketAddr,
    /// Opaque to the gateway; handed to the engine with each call.
    pub credentials: UsmCredentials,
    /// Context name for upstream requests. Empty means "use the client's".
    pub context_name: Bytes,
}

impl UpstreamTarget {
    pub fn new(address: SocketAddr, credentials: UsmCredentials) -> Self {
        Self {
            address,
            credentials,
            context_name: Bytes::new(),
        }
    }

    /// Set a fixed upstream context name.
    pub fn with_context_name(mut self, name: impl Into<Bytes>) -> Self {
        self.context_name = name.into();
        self
    }
}

/// Immutable gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    listen: SocketAddr,
    upstream: Arc<UpstreamTarget>,
    local_table: LocalTable,
    pending_timeout: Option<Duration>,
}

impl GatewayConfig {
    /// Start building a configuration.
    pub fn builder() -> GatewayConfigBuilder {
        GatewayConfigBuilder::new()
    }

    /// Address the engine should listen on.
    pub fn listen(&self) -> SocketAddr {
        self.listen
    }

    pub fn upstream(&self) -> &Arc<UpstreamTarget> {
        &self.upstream
    }

    pub fn local_table(&self) -> &LocalTable {
        &self.local_table
    }

    /// How long a forward may stay outstanding, if bounded.
    pub fn pending_timeout(&self) -> Option<Duration> {
        self.pending_timeout
    }
}

/// Builder for [`GatewayConfig`].
///
/// Addresses and OIDs are kept as given and validated in
/// [`build`](Self::build), so every mistake surfaces in one place.
#[derive(Debug)]
pub struct GatewayConfigBuilder {
    listen: String,
    upstream: Option<String>,
    credentials: UsmCredentials,
    context_name: Bytes,
    local: Vec<(String, Value)>,
    pending_timeout: Option<Duration>,
}

impl Default for GatewayConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GatewayConfigBuilder {
    pub fn new() -> Self {
        Self {
            listen: DEFAULT_LISTEN.to_string(),
            upstream: None,
            credentials: UsmCredentials::new(""),
            context_name: Bytes::new(),
            local: Vec::new(),
            pending_timeout: None,
        }
    }

    /// Set the listen address (default `0.0.0.0:161`).
    pub fn listen(mut self, addr: impl Into<String>) -> Self {
        self.listen = addr.into();
        self
    }

    /// Set the upstream agent address (`host:port`).
    pub fn upstream(mut self, addr: impl Into<String>) -> Self {
        self.upstream = Some(addr.into());
        self
    }

    /// Set the USM credentials used toward the upstream agent.
    pub fn credentials(mut self, credentials: UsmCredentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Set a fixed context name for upstream requests.
    pub fn context_name(mut self, name: impl Into<Bytes>) -> Self {
        self.context_name = name.into();
        self
    }

    /// Answer `oid` locally with `value`.
    pub fn local(mut self, oid: impl Into<String>, value: impl Into<Value>) -> Self {
        self.local.push((oid.into(), value.into()));
        self
    }

    /// Add several local entries.
    pub fn local_oids<S, V>(mut self, entries: impl IntoIterator<Item = (S, V)>) -> Self
    where
        S: Into<String>,
        V: Into<Value>,
    {
        self.local
            .extend(entries.into_iter().map(|(o, v)| (o.into(), v.into())));
        self
    }

    /// Bound how long a forward may wait for its upstream outcome.
    pub fn pending_timeout(mut self, timeout: Duration) -> Self {
        self.pending_timeout = Some(timeout);
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> Result<GatewayConfig> {
        let listen = resolve(&self.listen, "listen")?;
        let upstream = self
            .upstream
            .as_deref()
            .ok_or_else(|| Error::config(ConfigErrorKind::MissingUpstream))?;
        let address = resolve(upstream, "upstream")?;

        self.credentials.validate()?;

        if self.pending_timeout.is_some_and(|t| t.is_zero()) {
            return Err(Error::config(ConfigErrorKind::ZeroTimeout));
        }

        let local_table = LocalTable::parse(self.local)?;

        Ok(GatewayConfig {
            listen,
            upstream: Arc::new(UpstreamTarget {
                address,
                credentials: self.credentials,
                context_name: self.context_name,
            }),
            local_table,
            pending_timeout: self.pending_timeout,
        })
    }
}

fn resolve(addr: &str, field: &'static str) -> Result<SocketAddr> {
    let invalid = || {
        Error::config(ConfigErrorKind::InvalidAddress {
            field,
            input: addr.into(),
        })
    };
    addr.to_socket_addrs()
        .map_err(|_| invalid())?
        .next()
        .ok_or_else(invalid)
}

#[cfg(feature = "serde")]
mod file {
    use std::collections::BTreeMap;
    use std::path::Path;
    use std::time::Duration;

    use serde::Deserialize;

    use super::{GatewayConfig, GatewayConfigBuilder};
    use crate::error::{Error, Result};
    use crate::v3::{AuthProtocol, PrivProtocol, UsmCredentials};

    #[derive(Deserialize)]
    #[serde(deny_unknown_fields)]
    struct ConfigFile {
        listen: Option<String>,
        upstream: UpstreamFile,
        #[serde(default)]
        local_oids: BTreeMap<String, String>,
        pending_timeout_ms: Option<u64>,
    }

    #[derive(Deserialize)]
    #[serde(deny_unknown_fields)]
    struct UpstreamFile {
        address: String,
        username: String,
        auth_protocol: Option<String>,
        #[serde(default)]
        auth_password: String,
        priv_protocol: Option<String>,
        #[serde(default)]
        priv_password: String,
        #[serde(default)]
        context_name: String,
    }

    impl UpstreamFile {
        fn credentials(self) -> Result<UsmCredentials> {
            let mut credentials = UsmCredentials::new(self.username);
            if let Some(protocol) = self.auth_protocol {
                let protocol: AuthProtocol = protocol.parse()?;
                credentials = credentials.auth(protocol, self.auth_password.into_bytes());
            }
            if let Some(protocol) = self.priv_protocol {
                let protocol: PrivProtocol = protocol.parse()?;
                credentials = credentials.privacy(protocol, self.priv_password.into_bytes());
            }
            Ok(credentials)
        }
    }

    impl GatewayConfig {
        /// Parse a JSON configuration document.
        ///
        /// ```json
        /// {
        ///   "listen": "0.0.0.0:161",
        ///   "upstream": {
        ///     "address": "192.168.1.100:161",
        ///     "username": "proxyUser",
        ///     "auth_protocol": "SHA",
        ///     "auth_password": "authPassword123",
        ///     "priv_protocol": "AES128",
        ///     "priv_password": "privPassword123"
        ///   },
        ///   "local_oids": { "1.3.6.1.2.1.1.3.0": "123456" },
        ///   "pending_timeout_ms": 30000
        /// }
        /// ```
        pub fn from_json(text: &str) -> Result<Self> {
            let file: ConfigFile =
                serde_json::from_str(text).map_err(|source| Error::ConfigParse { source })?;

            let mut builder = GatewayConfigBuilder::new()
                .upstream(file.upstream.address.clone())
                .context_name(file.upstream.context_name.clone().into_bytes())
                .local_oids(file.local_oids);
            if let Some(listen) = file.listen {
                builder = builder.listen(listen);
            }
            if let Some(ms) = file.pending_timeout_ms {
                builder = builder.pending_timeout(Duration::from_millis(ms));
            }
            builder.credentials(file.upstream.credentials()?).build()
        }

        /// Read and parse a JSON configuration file.
        pub fn load(path: impl AsRef<Path>) -> Result<Self> {
            let path = path.as_ref();
            let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
                path: path.to_path_buf(),
                source,
            })?;
            tracing::debug!(path = %path.display(), "loaded gateway configuration");
            Self::from_json(&text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;
    use crate::v3::{AuthProtocol, PrivProtocol, SecurityLevel};

    fn builder() -> GatewayConfigBuilder {
        GatewayConfig::builder()
            .upstream("192.168.1.100:161")
            .credentials(
                UsmCredentials::new("proxyUser")
                    .auth(AuthProtocol::Sha1, "authPassword123")
                    .privacy(PrivProtocol::Aes128, "privPassword123"),
            )
    }

    #[test]
    fn test_build_defaults() {
        let config = builder().build().unwrap();
        assert_eq!(config.listen(), "0.0.0.0:161".parse::<SocketAddr>().unwrap());
        assert_eq!(
            config.upstream().address,
            "192.168.1.100:161".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(
            config.upstream().credentials.security_level(),
            SecurityLevel::AuthPriv
        );
        assert!(config.local_table().is_empty());
        assert_eq!(config.pending_timeout(), None);
        assert!(config.upstream().context_name.is_empty());
    }

    #[test]
    fn test_build_local_table() {
        let config = builder()
            .local("1.3.6.1.4.1.6302.2.1.2.28.6.0", "SNMP Proxy Device")
            .local_oids([("1.3.6.1.2.1.1.3.0", "123456")])
            .build()
            .unwrap();
        assert_eq!(
            config.local_table().lookup(&oid!(1, 3, 6, 1, 2, 1, 1, 3, 0)),
            Some(&Value::from("123456"))
        );
    }

    #[test]
    fn test_missing_upstream() {
        let err = GatewayConfig::builder().build().unwrap_err();
        assert!(matches!(
            err,
            Error::Config {
                kind: ConfigErrorKind::MissingUpstream
            }
        ));
    }

    #[test]
    fn test_invalid_listen_address() {
        let err = builder().listen("not an address").build().unwrap_err();
        assert!(matches!(
            err,
            Error::Config {
                kind: ConfigErrorKind::InvalidAddress {
                    field: "listen",
                    ..
                }
            }
        ));
    }

    #[test]
    fn test_bad_local_oid() {
        let err = builder().local("1.3.6.x", "v").build().unwrap_err();
        assert!(matches!(
            err,
            Error::Config {
                kind: ConfigErrorKind::InvalidLocalOid { .. }
            }
        ));
    }

    #[test]
    fn test_privacy_without_auth() {
        let err = builder()
            .credentials(
                UsmCredentials::new("proxyUser").privacy(PrivProtocol::Aes128, "privPassword123"),
            )
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Config {
                kind: ConfigErrorKind::PrivacyWithoutAuth
            }
        ));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = builder()
            .pending_timeout(Duration::ZERO)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Config {
                kind: ConfigErrorKind::ZeroTimeout
            }
        ));
    }

    #[test]
    fn test_context_name() {
        let config = builder().context_name("bridge1").build().unwrap();
        assert_eq!(&config.upstream().context_name[..], b"bridge1");
    }
}
