//! Well-known OID names for the gateway tools.
//!
//! A small fixed table for display and argument parsing. Not MIB support.

use crate::Oid;

static WELL_KNOWN_OIDS: &[(&[u32], &str)] = &[
    // SNMPv2-MIB::system
    (&[1, 3, 6, 1, 2, 1, 1], "system"),
    (&[1, 3, 6, 1, 2, 1, 1, 1, 0], "sysDescr.0"),
    (&[1, 3, 6, 1, 2, 1, 1, 2, 0], "sysObjectID.0"),
    (&[1, 3, 6, 1, 2, 1, 1, 3, 0], "sysUpTime.0"),
    (&[1, 3, 6, 1, 2, 1, 1, 4, 0], "sysContact.0"),
    (&[1, 3, 6, 1, 2, 1, 1, 5, 0], "sysName.0"),
    (&[1, 3, 6, 1, 2, 1, 1, 6, 0], "sysLocation.0"),
    // IF-MIB
    (&[1, 3, 6, 1, 2, 1, 2, 1, 0], "ifNumber.0"),
    (&[1, 3, 6, 1, 2, 1, 2, 2], "ifTable"),
    // SNMP-FRAMEWORK-MIB::snmpEngine
    (&[1, 3, 6, 1, 6, 3, 10, 2, 1, 1, 0], "snmpEngineID.0"),
    (&[1, 3, 6, 1, 6, 3, 10, 2, 1, 3, 0], "snmpEngineTime.0"),
];

/// Friendly name for `oid`, if it is well known.
pub fn lookup(oid: &Oid) -> Option<&'static str> {
    WELL_KNOWN_OIDS
        .iter()
        .find(|(arcs, _)| *arcs == oid.arcs())
        .map(|(_, name)| *name)
}

/// `oid` followed by its friendly name in parentheses, when it has one.
pub fn annotate(oid: &Oid) -> String {
    match lookup(oid) {
        Some(name) => format!("{} ({})", oid, name),
        None => oid.to_string(),
    }
}

/// Parse a command-line OID: dotted notation (optionally with a leading dot)
/// or a well-known name, case-insensitive.
pub fn parse_oid(s: &str) -> Result<Oid, String> {
    if s.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return Oid::parse(s).map_err(|e| format!("invalid OID '{}': {}", s, e));
    }

    WELL_KNOWN_OIDS
        .iter()
        .find(|(_, name)| name.eq_ignore_ascii_case(s))
        .map(|(arcs, _)| Oid::from_slice(arcs))
        .ok_or_else(|| {
            format!(
                "unknown OID name '{}'; use dotted notation (e.g., 1.3.6.1.2.1.1.3.0)",
                s
            )
        })
}
