//! Shared test utilities for snmp-gateway integration tests.

// Not every test file uses every utility
#![allow(dead_code)]
#![allow(unused_imports)]

mod engine;
mod fixtures;

pub use engine::*;
pub use fixtures::*;
