//! CLI support for the `snmpgw-check` tool: argument parsing, OID name hints,
//! and output formatting.
//!
//! Only available with the `cli` feature.

pub mod args;
pub mod hints;
pub mod output;
