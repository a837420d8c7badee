//! SNMPv3 User-based Security Model parameters.
//!
//! The gateway never authenticates or encrypts anything itself. It only holds
//! the upstream user's credentials and hands them, unmodified, to the protocol
//! engine with every upstream call. This module defines those parameters.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{ConfigErrorKind, Error, Result};

/// Error returned when parsing a protocol name fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseProtocolError {
    input: String,
    kind: ProtocolKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProtocolKind {
    Auth,
    Priv,
}

impl std::fmt::Display for ParseProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            ProtocolKind::Auth => write!(
                f,
                "unknown authentication protocol '{}'; expected one of: MD5, SHA, SHA-224, SHA-256, SHA-384, SHA-512",
                self.input
            ),
            ProtocolKind::Priv => write!(
                f,
                "unknown privacy protocol '{}'; expected one of: DES, 3DES, AES, AES-128, AES-192, AES-256",
                self.input
            ),
        }
    }
}

impl std::error::Error for ParseProtocolError {}

impl From<ParseProtocolError> for Error {
    fn from(err: ParseProtocolError) -> Self {
        Error::config(ConfigErrorKind::UnknownProtocol {
            input: err.input.into(),
        })
    }
}

/// Authentication protocol identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthProtocol {
    /// HMAC-MD5-96 (RFC 3414)
    Md5,
    /// HMAC-SHA-96 (RFC 3414)
    Sha1,
    /// HMAC-SHA-224 (RFC 7860)
    Sha224,
    /// HMAC-SHA-256 (RFC 7860)
    Sha256,
    /// HMAC-SHA-384 (RFC 7860)
    Sha384,
    /// HMAC-SHA-512 (RFC 7860)
    Sha512,
}

impl std::fmt::Display for AuthProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Md5 => write!(f, "MD5"),
            Self::Sha1 => write!(f, "SHA"),
            Self::Sha224 => write!(f, "SHA-224"),
            Self::Sha256 => write!(f, "SHA-256"),
            Self::Sha384 => write!(f, "SHA-384"),
            Self::Sha512 => write!(f, "SHA-512"),
        }
    }
}

impl std::str::FromStr for AuthProtocol {
    type Err = ParseProtocolError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "MD5" => Ok(Self::Md5),
            "SHA" | "SHA1" | "SHA-1" => Ok(Self::Sha1),
            "SHA224" | "SHA-224" => Ok(Self::Sha224),
            "SHA256" | "SHA-256" => Ok(Self::Sha256),
            "SHA384" | "SHA-384" => Ok(Self::Sha384),
            "SHA512" | "SHA-512" => Ok(Self::Sha512),
            _ => Err(ParseProtocolError {
                input: s.to_string(),
                kind: ProtocolKind::Auth,
            }),
        }
    }
}

/// Privacy protocol identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivProtocol {
    /// DES-CBC (RFC 3414).
    Des,
    /// 3DES-EDE (draft-reeder-snmpv3-usm-3desede-00).
    Des3,
    /// AES-128-CFB (RFC 3826)
    Aes128,
    /// AES-192-CFB (draft-blumenthal-aes-usm-04)
    Aes192,
    /// AES-256-CFB (draft-blumenthal-aes-usm-04)
    Aes256,
}

impl std::fmt::Display for PrivProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Des => write!(f, "DES"),
            Self::Des3 => write!(f, "3DES"),
            Self::Aes128 => write!(f, "AES"),
            Self::Aes192 => write!(f, "AES-192"),
            Self::Aes256 => write!(f, "AES-256"),
        }
    }
}

impl std::str::FromStr for PrivProtocol {
    type Err = ParseProtocolError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DES" => Ok(Self::Des),
            "3DES" | "3DES-EDE" | "DES3" | "TDES" => Ok(Self::Des3),
            "AES" | "AES128" | "AES-128" => Ok(Self::Aes128),
            "AES192" | "AES-192" => Ok(Self::Aes192),
            "AES256" | "AES-256" => Ok(Self::Aes256),
            _ => Err(ParseProtocolError {
                input: s.to_string(),
                kind: ProtocolKind::Priv,
            }),
        }
    }
}

/// SNMPv3 security level (RFC 3411).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SecurityLevel {
    NoAuthNoPriv,
    AuthNoPriv,
    AuthPriv,
}

impl std::fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoAuthNoPriv => write!(f, "noAuthNoPriv"),
            Self::AuthNoPriv => write!(f, "authNoPriv"),
            Self::AuthPriv => write!(f, "authPriv"),
        }
    }
}

/// USM user credentials for the upstream agent.
///
/// Opaque to the gateway. Passwords are wiped from memory on drop and never
/// printed by `Debug`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct UsmCredentials {
    #[zeroize(skip)]
    username: String,
    #[zeroize(skip)]
    auth_protocol: Option<AuthProtocol>,
    auth_password: Vec<u8>,
    #[zeroize(skip)]
    priv_protocol: Option<PrivProtocol>,
    priv_password: Vec<u8>,
}

impl UsmCredentials {
    /// noAuthNoPriv credentials for `username`.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            auth_protocol: None,
            auth_password: Vec::new(),
            priv_protocol: None,
            priv_password: Vec::new(),
        }
    }

    /// Add authentication.
    pub fn auth(mut self, protocol: AuthProtocol, password: impl Into<Vec<u8>>) -> Self {
        self.auth_protocol = Some(protocol);
        self.auth_password = password.into();
        self
    }

    /// Add privacy.
    pub fn privacy(mut self, protocol: PrivProtocol, password: impl Into<Vec<u8>>) -> Self {
        self.priv_protocol = Some(protocol);
        self.priv_password = password.into();
        self
    }

    /// Check that the combination is one USM can express.
    pub fn validate(&self) -> Result<()> {
        if self.priv_protocol.is_some() && self.auth_protocol.is_none() {
            return Err(Error::config(ConfigErrorKind::PrivacyWithoutAuth));
        }
        if self.auth_protocol.is_some() && self.auth_password.is_empty() {
            return Err(Error::config(ConfigErrorKind::MissingPassword {
                protocol: "authentication",
            }));
        }
        if self.priv_protocol.is_some() && self.priv_password.is_empty() {
            return Err(Error::config(ConfigErrorKind::MissingPassword {
                protocol: "privacy",
            }));
        }
        Ok(())
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn auth_protocol(&self) -> Option<AuthProtocol> {
        self.auth_protocol
    }

    pub fn auth_password(&self) -> &[u8] {
        &self.auth_password
    }

    pub fn priv_protocol(&self) -> Option<PrivProtocol> {
        self.priv_protocol
    }

    pub fn priv_password(&self) -> &[u8] {
        &self.priv_password
    }

    /// The security level these credentials provide.
    pub fn security_level(&self) -> SecurityLevel {
        match (self.auth_protocol, self.priv_protocol) {
            (Some(_), Some(_)) => SecurityLevel::AuthPriv,
            (Some(_), None) => SecurityLevel::AuthNoPriv,
            _ => SecurityLevel::NoAuthNoPriv,
        }
    }
}

impl std::fmt::Debug for UsmCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsmCredentials")
            .field("username", &self.username)
            .field("auth_protocol", &self.auth_protocol)
            .field("priv_protocol", &self.priv_protocol)
            .field("security_level", &self.security_level())
            .finish_non_exhaustive()
    }
}
