#![no_main]

use libfuzzer_sys::fuzz_target;

use snmp_gateway::gateway::LocalTable;
use snmp_gateway::oid::Oid;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    // Anything that parses must print back to something that parses to the same OID
    if let Ok(oid) = Oid::parse(s) {
        let reparsed = Oid::parse(&oid.to_string()).expect("formatted OID must parse");
        assert_eq!(oid, reparsed);
    }

    // Local table construction from untrusted config text must never panic
    let _ = LocalTable::parse(s.split(',').map(|oid| (oid, "v")));
});
