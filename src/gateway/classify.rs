//! Request classification: answer locally or forward.

use crate::varbind::VarBind;

use super::LocalTable;

/// How the gateway will answer a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Disposition {
    /// Every binding resolved locally; values attached in request order.
    AllLocal(Vec<VarBind>),
    /// At least one binding is not in the local table; the whole request goes
    /// upstream.
    NeedsForward {
        /// Zero-based position of the first binding not answered locally.
        first_remote: usize,
    },
}

impl Disposition {
    /// Returns `true` if the request must be forwarded.
    pub fn is_forward(&self) -> bool {
        matches!(self, Disposition::NeedsForward { .. })
    }
}

/// Classify a request's bindings against the local table.
///
/// Bindings are scanned in order and the scan stops at the first OID missing
/// from the table. Mixed requests are forwarded whole: a request naming one
/// local and one remote OID gets both values from upstream. An empty binding
/// list is all-local with no values.
pub fn classify(table: &LocalTable, varbinds: &[VarBind]) -> Disposition {
    let mut resolved = Vec::with_capacity(varbinds.len());

    for (index, vb) in varbinds.iter().enumerate() {
        match table.lookup(&vb.oid) {
            Some(value) => {
                tracing::trace!(snmp.oid = %vb.oid, %value, "local hit");
                resolved.push(VarBind::new(vb.oid.clone(), value.clone()));
            }
            None => {
                tracing::trace!(snmp.oid = %vb.oid, index, "not local");
                return Disposition::NeedsForward {
                    first_remote: index,
                };
            }
        }
    }

    Disposition::AllLocal(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;
    use crate::value::Value;

    fn table() -> LocalTable {
        LocalTable::parse([
            ("1.3.6.1.2.1.1.3.0", "123456"),
            ("1.3.6.1.4.1.6302.2.1.2.28.6.0", "SNMP Proxy Device"),
        ])
        .unwrap()
    }

    #[test]
    fn test_all_local_preserves_order() {
        let request = vec![
            VarBind::null(oid!(1, 3, 6, 1, 4, 1, 6302, 2, 1, 2, 28, 6, 0)),
            VarBind::null(oid!(1, 3, 6, 1, 2, 1, 1, 3, 0)),
        ];
        match classify(&table(), &request) {
            Disposition::AllLocal(vbs) => {
                assert_eq!(
                    vbs,
                    vec![
                        VarBind::new(
                            oid!(1, 3, 6, 1, 4, 1, 6302, 2, 1, 2, 28, 6, 0),
                            Value::from("SNMP Proxy Device")
                        ),
                        VarBind::new(oid!(1, 3, 6, 1, 2, 1, 1, 3, 0), Value::from("123456")),
                    ]
                );
            }
            other => panic!("expected AllLocal, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_request_is_all_local() {
        assert_eq!(classify(&table(), &[]), Disposition::AllLocal(Vec::new()));
    }

    #[test]
    fn test_first_miss_forwards_whole_request() {
        let request = vec![
            VarBind::null(oid!(1, 3, 6, 1, 2, 1, 1, 3, 0)),
            VarBind::null(oid!(1, 3, 6, 1, 2, 1, 1, 5, 0)),
            VarBind::null(oid!(1, 3, 6, 1, 4, 1, 6302, 2, 1, 2, 28, 6, 0)),
        ];
        let disposition = classify(&table(), &request);
        assert!(disposition.is_forward());
        assert_eq!(disposition, Disposition::NeedsForward { first_remote: 1 });
    }

    #[test]
    fn test_request_values_are_ignored() {
        // SET values don't change what the table answers with
        let request = vec![VarBind::new(
            oid!(1, 3, 6, 1, 2, 1, 1, 3, 0),
            Value::Integer(7),
        )];
        assert_eq!(
            classify(&table(), &request),
            Disposition::AllLocal(vec![VarBind::new(
                oid!(1, 3, 6, 1, 2, 1, 1, 3, 0),
                Value::from("123456")
            )])
        );
    }
}
