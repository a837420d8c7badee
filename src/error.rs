//! Error types for snmp-gateway.
//!
//! [`Error`] covers failures of the gateway itself: bad configuration, bad OID
//! strings, and an engine refusing work. Failures of the upstream agent are not
//! errors of this kind; they travel as [`UpstreamError`](crate::engine::UpstreamError)
//! in a completion outcome and end up as an [`ErrorStatus`] in the response PDU.

use std::path::PathBuf;

use crate::oid::Oid;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// OID validation error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OidErrorKind {
    /// Empty OID string.
    Empty,
    /// Invalid arc value.
    InvalidArc,
    /// First arc must be 0, 1, or 2.
    InvalidFirstArc(u32),
    /// Second arc too large for first arc value.
    InvalidSecondArc { first: u32, second: u32 },
    /// OID too short (minimum 2 arcs).
    TooShort,
    /// OID has too many arcs (exceeds MAX_OID_LEN).
    TooManyArcs { count: usize, max: usize },
}

impl std::fmt::Display for OidErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty OID"),
            Self::InvalidArc => write!(f, "invalid arc value"),
            Self::InvalidFirstArc(v) => write!(f, "first arc must be 0, 1, or 2, got {}", v),
            Self::InvalidSecondArc { first, second } => {
                write!(f, "second arc {} too large for first arc {}", second, first)
            }
            Self::TooShort => write!(f, "OID must have at least 2 arcs"),
            Self::TooManyArcs { count, max } => {
                write!(f, "OID has {} arcs, exceeds maximum {}", count, max)
            }
        }
    }
}

/// Configuration error kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigErrorKind {
    /// No upstream agent address configured.
    MissingUpstream,
    /// An address could not be parsed or resolved.
    InvalidAddress { field: &'static str, input: Box<str> },
    /// The same OID appears twice in the local table.
    DuplicateLocalOid(Oid),
    /// A local table OID failed to parse.
    InvalidLocalOid { input: Box<str>, kind: OidErrorKind },
    /// Privacy protocol configured without authentication.
    PrivacyWithoutAuth,
    /// A protocol was configured without its password.
    MissingPassword { protocol: &'static str },
    /// An auth/priv protocol name was not recognized.
    UnknownProtocol { input: Box<str> },
    /// A zero pending-forward timeout.
    ZeroTimeout,
}

impl std::fmt::Display for ConfigErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingUpstream => write!(f, "no upstream agent address configured"),
            Self::InvalidAddress { field, input } => {
                write!(f, "invalid {} address '{}'", field, input)
            }
            Self::DuplicateLocalOid(oid) => write!(f, "duplicate local OID {}", oid),
            Self::InvalidLocalOid { input, kind } => {
                write!(f, "invalid local OID '{}': {}", input, kind)
            }
            Self::PrivacyWithoutAuth => write!(f, "privacy requires authentication"),
            Self::MissingPassword { protocol } => {
                write!(f, "{} protocol configured without a password", protocol)
            }
            Self::UnknownProtocol { input } => write!(f, "unknown protocol '{}'", input),
            Self::ZeroTimeout => write!(f, "pending-forward timeout must be non-zero"),
        }
    }
}

/// SNMP error status codes (RFC 3416).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorStatus {
    NoError,
    TooBig,
    NoSuchName,
    BadValue,
    ReadOnly,
    GenErr,
    NoAccess,
    WrongType,
    WrongLength,
    WrongEncoding,
    WrongValue,
    NoCreation,
    InconsistentValue,
    ResourceUnavailable,
    CommitFailed,
    UndoFailed,
    AuthorizationError,
    NotWritable,
    InconsistentName,
    /// Unknown/future error status code.
    Unknown(i32),
}

impl ErrorStatus {
    /// Create from raw status code.
    pub fn from_i32(value: i32) -> Self {
        match value {
            0 => Self::NoError,
            1 => Self::TooBig,
            2 => Self::NoSuchName,
            3 => Self::BadValue,
            4 => Self::ReadOnly,
            5 => Self::GenErr,
            6 => Self::NoAccess,
            7 => Self::WrongType,
            8 => Self::WrongLength,
            9 => Self::WrongEncoding,
            10 => Self::WrongValue,
            11 => Self::NoCreation,
            12 => Self::InconsistentValue,
            13 => Self::ResourceUnavailable,
            14 => Self::CommitFailed,
            15 => Self::UndoFailed,
            16 => Self::AuthorizationError,
            17 => Self::NotWritable,
            18 => Self::InconsistentName,
            other => Self::Unknown(other),
        }
    }

    /// Convert to raw status code.
    pub fn as_i32(&self) -> i32 {
        match self {
            Self::NoError => 0,
            Self::TooBig => 1,
            Self::NoSuchName => 2,
            Self::BadValue => 3,
            Self::ReadOnly => 4,
            Self::GenErr => 5,
            Self::NoAccess => 6,
            Self::WrongType => 7,
            Self::WrongLength => 8,
            Self::WrongEncoding => 9,
            Self::WrongValue => 10,
            Self::NoCreation => 11,
            Self::InconsistentValue => 12,
            Self::ResourceUnavailable => 13,
            Self::CommitFailed => 14,
            Self::UndoFailed => 15,
            Self::AuthorizationError => 16,
            Self::NotWritable => 17,
            Self::InconsistentName => 18,
            Self::Unknown(code) => *code,
        }
    }

    /// Returns `true` for anything other than `noError`.
    pub fn is_error(&self) -> bool {
        !matches!(self, Self::NoError)
    }
}

impl std::fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoError => write!(f, "noError"),
            Self::TooBig => write!(f, "tooBig"),
            Self::NoSuchName => write!(f, "noSuchName"),
            Self::BadValue => write!(f, "badValue"),
            Self::ReadOnly => write!(f, "readOnly"),
            Self::GenErr => write!(f, "genErr"),
            Self::NoAccess => write!(f, "noAccess"),
            Self::WrongType => write!(f, "wrongType"),
            Self::WrongLength => write!(f, "wrongLength"),
            Self::WrongEncoding => write!(f, "wrongEncoding"),
            Self::WrongValue => write!(f, "wrongValue"),
            Self::NoCreation => write!(f, "noCreation"),
            Self::InconsistentValue => write!(f, "inconsistentValue"),
            Self::ResourceUnavailable => write!(f, "resourceUnavailable"),
            Self::CommitFailed => write!(f, "commitFailed"),
            Self::UndoFailed => write!(f, "undoFailed"),
            Self::AuthorizationError => write!(f, "authorizationError"),
            Self::NotWritable => write!(f, "notWritable"),
            Self::InconsistentName => write!(f, "inconsistentName"),
            Self::Unknown(code) => write!(f, "unknown({})", code),
        }
    }
}

/// Library error type.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Invalid OID format.
    #[error("invalid OID: {kind}")]
    InvalidOid {
        kind: OidErrorKind,
        input: Option<Box<str>>, // Only allocated when parsing string input
    },

    /// Gateway configuration is invalid.
    #[error("invalid configuration: {kind}")]
    Config { kind: ConfigErrorKind },

    /// Reading a configuration file failed.
    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration document is not valid JSON for the expected shape.
    #[cfg(feature = "serde")]
    #[error("config parse error: {source}")]
    ConfigParse {
        #[source]
        source: serde_json::Error,
    },

    /// The protocol engine refused an upstream call or a downstream send.
    #[error("protocol engine error: {cause}")]
    Engine { cause: Box<str> },
}

impl Error {
    /// Create a configuration error.
    pub fn config(kind: ConfigErrorKind) -> Self {
        Self::Config { kind }
    }

    /// Create an engine error from a human-readable cause.
    pub fn engine(cause: impl Into<Box<str>>) -> Self {
        Self::Engine {
            cause: cause.into(),
        }
    }

    /// Create an invalid OID error from a kind (no input string).
    pub fn invalid_oid(kind: OidErrorKind) -> Self {
        Self::InvalidOid { kind, input: None }
    }

    /// Create an invalid OID error with the input string that failed.
    pub fn invalid_oid_with_input(kind: OidErrorKind, input: impl Into<Box<str>>) -> Self {
        Self::InvalidOid {
            kind,
            input: Some(input.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_roundtrip_codes() {
        for code in 0..=18 {
            assert_eq!(ErrorStatus::from_i32(code).as_i32(), code);
        }
        assert_eq!(ErrorStatus::from_i32(99), ErrorStatus::Unknown(99));
        assert_eq!(ErrorStatus::Unknown(99).as_i32(), 99);
    }

    #[test]
    fn test_error_status_gen_err_is_five() {
        assert_eq!(ErrorStatus::GenErr.as_i32(), 5);
        assert!(ErrorStatus::GenErr.is_error());
        assert!(!ErrorStatus::NoError.is_error());
    }

    #[test]
    fn test_error_display() {
        let err = Error::config(ConfigErrorKind::PrivacyWithoutAuth);
        assert_eq!(
            err.to_string(),
            "invalid configuration: privacy requires authentication"
        );

        let err = Error::engine("socket closed");
        assert_eq!(err.to_string(), "protocol engine error: socket closed");
    }

    #[test]
    fn test_invalid_oid_keeps_input() {
        let err = Error::invalid_oid_with_input(OidErrorKind::InvalidArc, "1.3.x");
        match err {
            Error::InvalidOid { kind, input } => {
                assert_eq!(kind, OidErrorKind::InvalidArc);
                assert_eq!(input.as_deref(), Some("1.3.x"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
