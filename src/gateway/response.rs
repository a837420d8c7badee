//! Response synthesis and delivery.

use crate::engine::{ProtocolEngine, UpstreamReply};
use crate::error::ErrorStatus;
use crate::pdu::{Pdu, RequestKind};
use crate::varbind::{DisplayVarBinds, VarBind};

/// Where a response's content comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Values from the local table, in request order.
    Local(Vec<VarBind>),
    /// The upstream agent's reply, passed through.
    Upstream(UpstreamReply),
    /// The request could not be served.
    Failed {
        status: ErrorStatus,
        /// 1-based index of the offending binding, 0 if none.
        index: u32,
    },
}

impl Resolution {
    /// `genErr` pointing at `index`.
    pub fn gen_err(index: u32) -> Self {
        Self::Failed {
            status: ErrorStatus::GenErr,
            index,
        }
    }
}

/// Build the Response PDU answering `request`.
///
/// The response always carries the request's ID. Error responses echo the
/// request bindings unchanged, as agents do (RFC 3416 §4.2.1). A successful
/// upstream reply to GET, GETNEXT or SET must have one binding per request
/// binding, and for GET and SET each must name the requested OID; anything
/// else is answered with `genErr`.
pub fn build_response(request: &Pdu, resolution: Resolution) -> Pdu {
    let mut response = request.to_response();

    match resolution {
        Resolution::Local(varbinds) => {
            response.varbinds = varbinds;
        }
        Resolution::Upstream(reply) if reply.error_status.is_error() => {
            response.error_status = reply.error_status.as_i32();
            response.error_index = i32::try_from(reply.error_index).unwrap_or(i32::MAX);
            response.varbinds = if reply.varbinds.is_empty() {
                request.varbinds.clone()
            } else {
                reply.varbinds
            };
        }
        Resolution::Upstream(reply) => {
            let kind = RequestKind::from_pdu(request);
            let positional = kind.is_some_and(RequestKind::is_positional);
            if positional && reply.varbinds.len() != request.varbinds.len() {
                tracing::warn!(
                    snmp.request_id = request.request_id,
                    expected = request.varbinds.len(),
                    actual = reply.varbinds.len(),
                    "upstream reply has wrong number of bindings"
                );
                return build_response(request, Resolution::gen_err(0));
            }
            if kind.is_some_and(RequestKind::echoes_oids)
                && let Some(position) = first_oid_mismatch(&request.varbinds, &reply.varbinds)
            {
                tracing::warn!(
                    snmp.request_id = request.request_id,
                    snmp.oid = %request.varbinds[position].oid,
                    returned = %reply.varbinds[position].oid,
                    "upstream reply names a different OID"
                );
                return build_response(request, Resolution::gen_err(0));
            }
            response.varbinds = reply.varbinds;
        }
        Resolution::Failed { status, index } => {
            response.error_status = status.as_i32();
            response.error_index = i32::try_from(index).unwrap_or(i32::MAX);
            response.varbinds = request.varbinds.clone();
        }
    }

    response
}

/// Position of the first reply binding whose OID differs from the request's.
fn first_oid_mismatch(request: &[VarBind], reply: &[VarBind]) -> Option<usize> {
    request
        .iter()
        .zip(reply)
        .position(|(asked, got)| asked.oid != got.oid)
}

/// Hand `response` to the engine for transmission.
///
/// Delivery is best effort: a refusal is logged and the token is gone either
/// way. Returns `true` if the engine accepted the response.
pub fn deliver<E: ProtocolEngine>(engine: &E, token: E::Token, response: Pdu) -> bool {
    tracing::debug!(
        snmp.request_id = response.request_id,
        snmp.error_status = %response.error_status(),
        snmp.error_index = response.error_index,
        varbinds = %DisplayVarBinds(&response.varbinds),
        "sending response"
    );

    match engine.send_response(token, response) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "failed to send response");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;
    use crate::pdu::PduType;
    use crate::value::Value;

    fn get_two() -> Pdu {
        Pdu::get(
            4242,
            &[oid!(1, 3, 6, 1, 2, 1, 1, 5, 0), oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)],
        )
    }

    #[test]
    fn test_local_response() {
        let request = Pdu::get(7, &[oid!(1, 3, 6, 1, 2, 1, 1, 3, 0)]);
        let vbs = vec![VarBind::new(
            oid!(1, 3, 6, 1, 2, 1, 1, 3, 0),
            Value::from("123456"),
        )];
        let response = build_response(&request, Resolution::Local(vbs.clone()));

        assert_eq!(response.pdu_type, PduType::Response);
        assert_eq!(response.request_id, 7);
        assert_eq!(response.error_status, 0);
        assert_eq!(response.error_index, 0);
        assert_eq!(response.varbinds, vbs);
    }

    #[test]
    fn test_upstream_success_passthrough() {
        let request = get_two();
        let vbs = vec![
            VarBind::new(oid!(1, 3, 6, 1, 2, 1, 1, 5, 0), Value::from("router1")),
            VarBind::new(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), Value::from("Linux")),
        ];
        let response = build_response(
            &request,
            Resolution::Upstream(UpstreamReply::success(vbs.clone())),
        );
        assert_eq!(response.request_id, 4242);
        assert!(!response.is_error());
        assert_eq!(response.varbinds, vbs);
    }

    #[test]
    fn test_upstream_exceptions_pass_through() {
        let request = Pdu::get(1, &[oid!(1, 3, 6, 1, 2, 1, 1, 99, 0)]);
        let vbs = vec![VarBind::new(
            oid!(1, 3, 6, 1, 2, 1, 1, 99, 0),
            Value::NoSuchObject,
        )];
        let response =
            build_response(&request, Resolution::Upstream(UpstreamReply::success(vbs.clone())));
        assert!(!response.is_error());
        assert_eq!(response.varbinds, vbs);
    }

    #[test]
    fn test_upstream_error_status_kept() {
        let request = get_two();
        let reply = UpstreamReply {
            error_status: ErrorStatus::NoSuchName,
            error_index: 2,
            varbinds: Vec::new(),
        };
        let response = build_response(&request, Resolution::Upstream(reply));
        assert_eq!(response.error_status(), ErrorStatus::NoSuchName);
        assert_eq!(response.error_index, 2);
        assert_eq!(response.varbinds, request.varbinds);
    }

    #[test]
    fn test_wrong_binding_count_is_gen_err() {
        let request = get_two();
        let reply = UpstreamReply::success(vec![VarBind::new(
            oid!(1, 3, 6, 1, 2, 1, 1, 5, 0),
            Value::from("router1"),
        )]);
        let response = build_response(&request, Resolution::Upstream(reply));
        assert_eq!(response.error_status(), ErrorStatus::GenErr);
        assert_eq!(response.error_index, 0);
        assert_eq!(response.varbinds, request.varbinds);
    }

    #[test]
    fn test_reordered_get_reply_is_gen_err() {
        let request = get_two();
        let reply = UpstreamReply::success(vec![
            VarBind::new(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), Value::from("Linux")),
            VarBind::new(oid!(1, 3, 6, 1, 2, 1, 1, 5, 0), Value::from("router1")),
        ]);
        let response = build_response(&request, Resolution::Upstream(reply));
        assert_eq!(response.error_status(), ErrorStatus::GenErr);
        assert_eq!(response.error_index, 0);
        assert_eq!(response.varbinds, request.varbinds);
    }

    #[test]
    fn test_renamed_set_reply_is_gen_err() {
        let request = Pdu::set(
            5,
            vec![VarBind::new(oid!(1, 3, 6, 1, 2, 1, 1, 6, 0), Value::from("rack 4"))],
        );
        let reply = UpstreamReply::success(vec![VarBind::new(
            oid!(1, 3, 6, 1, 2, 1, 1, 4, 0),
            Value::from("rack 4"),
        )]);
        let response = build_response(&request, Resolution::Upstream(reply));
        assert_eq!(response.error_status(), ErrorStatus::GenErr);
        assert_eq!(response.varbinds, request.varbinds);
    }

    #[test]
    fn test_get_next_reply_may_advance_oids() {
        let request = Pdu::get_next(6, &[oid!(1, 3, 6, 1, 2, 1, 1, 5)]);
        let vbs = vec![VarBind::new(
            oid!(1, 3, 6, 1, 2, 1, 1, 5, 0),
            Value::from("router1"),
        )];
        let response =
            build_response(&request, Resolution::Upstream(UpstreamReply::success(vbs.clone())));
        assert!(!response.is_error());
        assert_eq!(response.varbinds, vbs);
    }

    #[test]
    fn test_bulk_reply_length_unchecked() {
        let request = Pdu::get_bulk(9, 0, 10, &[oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 2)]);
        let vbs: Vec<_> = (1..=3)
            .map(|i| {
                VarBind::new(
                    oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 2).child(i),
                    Value::from(format!("eth{i}")),
                )
            })
            .collect();
        let response =
            build_response(&request, Resolution::Upstream(UpstreamReply::success(vbs.clone())));
        assert!(!response.is_error());
        assert_eq!(response.varbinds, vbs);
        // bulk parameters never leak into the response header
        assert_eq!(response.error_status, 0);
        assert_eq!(response.error_index, 0);
    }

    #[test]
    fn test_failed_echoes_request() {
        let request = get_two();
        let response = build_response(
            &request,
            Resolution::Failed {
                status: ErrorStatus::AuthorizationError,
                index: 1,
            },
        );
        assert_eq!(response.pdu_type, PduType::Response);
        assert_eq!(response.request_id, 4242);
        assert_eq!(response.error_status(), ErrorStatus::AuthorizationError);
        assert_eq!(response.error_index, 1);
        assert_eq!(response.varbinds, request.varbinds);
    }
}
