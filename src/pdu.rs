//! PDU types.
//!
//! The gateway never sees BER: the protocol engine hands it decoded [`Pdu`]s
//! and encodes the responses it produces.

use crate::error::ErrorStatus;
use crate::oid::Oid;
use crate::varbind::VarBind;

/// PDU type, identified by its RFC 3416 context-specific tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PduType {
    GetRequest = 0xA0,
    GetNextRequest = 0xA1,
    Response = 0xA2,
    SetRequest = 0xA3,
    TrapV1 = 0xA4,
    GetBulkRequest = 0xA5,
    InformRequest = 0xA6,
    TrapV2 = 0xA7,
    Report = 0xA8,
}

impl PduType {
    /// The BER tag for this PDU type.
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Create from a BER tag.
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0xA0 => Some(Self::GetRequest),
            0xA1 => Some(Self::GetNextRequest),
            0xA2 => Some(Self::Response),
            0xA3 => Some(Self::SetRequest),
            0xA4 => Some(Self::TrapV1),
            0xA5 => Some(Self::GetBulkRequest),
            0xA6 => Some(Self::InformRequest),
            0xA7 => Some(Self::TrapV2),
            0xA8 => Some(Self::Report),
            _ => None,
        }
    }
}

impl std::fmt::Display for PduType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GetRequest => write!(f, "GetRequest"),
            Self::GetNextRequest => write!(f, "GetNextRequest"),
            Self::Response => write!(f, "Response"),
            Self::SetRequest => write!(f, "SetRequest"),
            Self::TrapV1 => write!(f, "Trap"),
            Self::GetBulkRequest => write!(f, "GetBulkRequest"),
            Self::InformRequest => write!(f, "InformRequest"),
            Self::TrapV2 => write!(f, "SNMPv2-Trap"),
            Self::Report => write!(f, "Report"),
        }
    }
}

/// Generic SNMP PDU.
///
/// For GetBulkRequest the `error_status` and `error_index` slots carry
/// non-repeaters and max-repetitions, matching the RFC 3416 wire layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Pdu {
    /// PDU type.
    pub pdu_type: PduType,
    /// Request ID, used to correlate responses.
    pub request_id: i32,
    /// Error status (or non-repeaters for GetBulk).
    pub error_status: i32,
    /// Error index, 1-based (or max-repetitions for GetBulk).
    pub error_index: i32,
    /// Variable bindings.
    pub varbinds: Vec<VarBind>,
}

impl Pdu {
    fn request(pdu_type: PduType, request_id: i32, varbinds: Vec<VarBind>) -> Self {
        Self {
            pdu_type,
            request_id,
            error_status: 0,
            error_index: 0,
            varbinds,
        }
    }

    /// GetRequest for the given OIDs, with NULL placeholder values.
    pub fn get(request_id: i32, oids: &[Oid]) -> Self {
        Self::request(
            PduType::GetRequest,
            request_id,
            crate::varbind::null_varbinds(oids),
        )
    }

    /// GetNextRequest for the given OIDs.
    pub fn get_next(request_id: i32, oids: &[Oid]) -> Self {
        Self::request(
            PduType::GetNextRequest,
            request_id,
            crate::varbind::null_varbinds(oids),
        )
    }

    /// GetBulkRequest for the given OIDs.
    pub fn get_bulk(
        request_id: i32,
        non_repeaters: i32,
        max_repetitions: i32,
        oids: &[Oid],
    ) -> Self {
        Self {
            pdu_type: PduType::GetBulkRequest,
            request_id,
            error_status: non_repeaters,
            error_index: max_repetitions,
            varbinds: crate::varbind::null_varbinds(oids),
        }
    }

    /// SetRequest carrying the given bindings.
    pub fn set(request_id: i32, varbinds: Vec<VarBind>) -> Self {
        Self::request(PduType::SetRequest, request_id, varbinds)
    }

    /// Derive the response-shaped PDU for this request.
    ///
    /// The response keeps the request ID and starts with no bindings and
    /// `noError`.
    pub fn to_response(&self) -> Self {
        Self {
            pdu_type: PduType::Response,
            request_id: self.request_id,
            error_status: 0,
            error_index: 0,
            varbinds: Vec::new(),
        }
    }

    /// Error status as a typed value (meaningless for GetBulkRequest).
    pub fn error_status(&self) -> ErrorStatus {
        ErrorStatus::from_i32(self.error_status)
    }

    /// Returns `true` if this PDU carries a non-zero error status.
    pub fn is_error(&self) -> bool {
        self.pdu_type != PduType::GetBulkRequest && self.error_status != 0
    }
}

/// The kind of client request the gateway can answer or forward.
///
/// Each kind maps to a distinct upstream operation; they are never
/// interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// GetRequest (read).
    Get,
    /// GetNextRequest (read-next).
    GetNext,
    /// GetBulkRequest (bulk read).
    GetBulk {
        non_repeaters: i32,
        max_repetitions: i32,
    },
    /// SetRequest (write).
    Set,
}

impl RequestKind {
    /// Determine the request kind of a PDU.
    ///
    /// Returns `None` for PDU types the gateway does not handle (responses,
    /// traps, informs, reports).
    pub fn from_pdu(pdu: &Pdu) -> Option<Self> {
        match pdu.pdu_type {
            PduType::GetRequest => Some(Self::Get),
            PduType::GetNextRequest => Some(Self::GetNext),
            PduType::GetBulkRequest => Some(Self::GetBulk {
                non_repeaters: pdu.error_status,
                max_repetitions: pdu.error_index,
            }),
            PduType::SetRequest => Some(Self::Set),
            _ => None,
        }
    }

    /// The PDU type used for this kind of request.
    pub fn pdu_type(self) -> PduType {
        match self {
            Self::Get => PduType::GetRequest,
            Self::GetNext => PduType::GetNextRequest,
            Self::GetBulk { .. } => PduType::GetBulkRequest,
            Self::Set => PduType::SetRequest,
        }
    }

    /// Whether a reply must carry exactly one binding per request binding.
    ///
    /// Only GetBulk responses may differ in length from the request.
    pub fn is_positional(self) -> bool {
        !matches!(self, Self::GetBulk { .. })
    }

    /// Whether each reply binding must name the same OID as its request
    /// binding. GetNext and GetBulk move to following OIDs.
    pub fn echoes_oids(self) -> bool {
        matches!(self, Self::Get | Self::Set)
    }
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::GetNext => write!(f, "GETNEXT"),
            Self::GetBulk { .. } => write!(f, "GETBULK"),
            Self::Set => write!(f, "SET"),
        }
    }
}
