//! Static table of locally answered OIDs.

use crate::error::{ConfigErrorKind, Error, Result};
use crate::oid::Oid;
use crate::value::Value;

/// OID-to-value table answered by the gateway without going upstream.
///
/// Lookups are exact-match only: a table entry for `1.3.6.1.2.1.1.3.0` does not
/// answer `1.3.6.1.2.1.1.3` or `1.3.6.1.2.1.1.3.0.1`. The table is built once
/// at startup and never changes afterwards.
///
/// ```rust
/// use snmp_gateway::gateway::LocalTable;
/// use snmp_gateway::{Value, oid};
///
/// let table = LocalTable::parse([
///     ("1.3.6.1.4.1.6302.2.1.2.28.6.0", "SNMP Proxy Device"),
///     ("1.3.6.1.2.1.1.3.0", "123456"),
/// ])
/// .unwrap();
///
/// assert_eq!(
///     table.lookup(&oid!(1, 3, 6, 1, 2, 1, 1, 3, 0)),
///     Some(&Value::from("123456"))
/// );
/// assert_eq!(table.lookup(&oid!(1, 3, 6, 1, 2, 1, 1, 5, 0)), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct LocalTable {
    /// Kept sorted by OID for binary search.
    entries: Vec<(Oid, Value)>,
}

impl LocalTable {
    /// Create an empty table (every request is forwarded).
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from OID-value pairs.
    ///
    /// Fails if the same OID appears twice.
    pub fn from_entries(entries: impl IntoIterator<Item = (Oid, Value)>) -> Result<Self> {
        let mut entries: Vec<(Oid, Value)> = entries.into_iter().collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));

        if let Some(dup) = entries.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(Error::config(ConfigErrorKind::DuplicateLocalOid(
                dup[0].0.clone(),
            )));
        }

        Ok(Self { entries })
    }

    /// Build a table from dotted OID strings and literal values.
    pub fn parse<S, V>(entries: impl IntoIterator<Item = (S, V)>) -> Result<Self>
    where
        S: AsRef<str>,
        V: Into<Value>,
    {
        let parsed = entries
            .into_iter()
            .map(|(oid, value)| {
                let text = oid.as_ref();
                let oid = Oid::parse(text).map_err(|e| match e {
                    Error::InvalidOid { kind, .. } => {
                        Error::config(ConfigErrorKind::InvalidLocalOid {
                            input: text.into(),
                            kind,
                        })
                    }
                    other => other,
                })?;
                Ok((oid, value.into()))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_entries(parsed)
    }

    /// Exact-match lookup.
    pub fn lookup(&self, oid: &Oid) -> Option<&Value> {
        self.entries
            .binary_search_by(|(o, _)| o.cmp(oid))
            .ok()
            .map(|idx| &self.entries[idx].1)
    }

    /// Returns `true` if `oid` is answered locally.
    pub fn contains(&self, oid: &Oid) -> bool {
        self.lookup(oid).is_some()
    }

    /// Get the number of entries in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all entries in lexicographic OID order.
    pub fn iter(&self) -> impl Iterator<Item = (&Oid, &Value)> {
        self.entries.iter().map(|(o, v)| (o, v))
    }
}
