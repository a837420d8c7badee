//! Object Identifier (OID) type.
//!
//! OIDs are stored as arcs in a `SmallVec` so the common case (system and
//! enterprise scalars, well under 16 arcs) never touches the heap.

use smallvec::SmallVec;

use crate::error::{Error, OidErrorKind, Result};

/// Maximum number of arcs accepted when parsing (RFC 2578 section 3.5).
pub const MAX_OID_LEN: usize = 128;

/// Object identifier.
///
/// Ordering is lexicographic by arc, compared as unsigned integers, so
/// `1.3.6.1.2` < `1.3.6.1.2.1` < `1.3.6.1.3`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Oid {
    arcs: SmallVec<[u32; 16]>,
}

impl Oid {
    /// Create an empty OID.
    pub fn empty() -> Self {
        Self {
            arcs: SmallVec::new(),
        }
    }

    /// Create an OID from a slice of arcs without validation.
    pub fn from_slice(arcs: &[u32]) -> Self {
        Self {
            arcs: SmallVec::from_slice(arcs),
        }
    }

    /// Parse an OID from dotted notation (`"1.3.6.1.2.1.1.1.0"`).
    ///
    /// A single leading dot is accepted (`".1.3.6.1"`), as net-snmp tools print it.
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.strip_prefix('.').unwrap_or(s);
        if trimmed.is_empty() {
            return Err(Error::invalid_oid_with_input(OidErrorKind::Empty, s));
        }

        let mut arcs = SmallVec::new();
        for part in trimmed.split('.') {
            let arc: u32 = part
                .parse()
                .map_err(|_| Error::invalid_oid_with_input(OidErrorKind::InvalidArc, s))?;
            arcs.push(arc);
            if arcs.len() > MAX_OID_LEN {
                return Err(Error::invalid_oid_with_input(
                    OidErrorKind::TooManyArcs {
                        count: trimmed.split('.').count(),
                        max: MAX_OID_LEN,
                    },
                    s,
                ));
            }
        }

        let oid = Self { arcs };
        oid.validate()
            .map_err(|kind| Error::invalid_oid_with_input(kind, s))?;
        Ok(oid)
    }

    /// Check the X.660 arc constraints.
    pub fn validate(&self) -> std::result::Result<(), OidErrorKind> {
        match self.arcs.as_slice() {
            [] => Err(OidErrorKind::Empty),
            [_] => Err(OidErrorKind::TooShort),
            [first, ..] if *first > 2 => Err(OidErrorKind::InvalidFirstArc(*first)),
            [first, second, ..] if *first < 2 && *second >= 40 => {
                Err(OidErrorKind::InvalidSecondArc {
                    first: *first,
                    second: *second,
                })
            }
            _ if self.arcs.len() > MAX_OID_LEN => Err(OidErrorKind::TooManyArcs {
                count: self.arcs.len(),
                max: MAX_OID_LEN,
            }),
            _ => Ok(()),
        }
    }

    /// The arcs of this OID.
    pub fn arcs(&self) -> &[u32] {
        &self.arcs
    }

    /// Number of arcs.
    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    /// Returns `true` if the OID has no arcs.
    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// Returns `true` if `prefix` is a prefix of (or equal to) this OID.
    pub fn starts_with(&self, prefix: &Oid) -> bool {
        self.arcs.starts_with(&prefix.arcs)
    }

    /// Return a new OID with `arc` appended.
    pub fn child(&self, arc: u32) -> Self {
        let mut arcs = self.arcs.clone();
        arcs.push(arc);
        Self { arcs }
    }

    /// Return the parent OID, or `None` for an empty OID.
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.arcs.split_last()?;
        Some(Self::from_slice(rest))
    }
}

impl std::fmt::Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut arcs = self.arcs.iter();
        if let Some(first) = arcs.next() {
            write!(f, "{}", first)?;
            for arc in arcs {
                write!(f, ".{}", arc)?;
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Oid({})", self)
    }
}

impl std::str::FromStr for Oid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<&[u32]> for Oid {
    fn from(arcs: &[u32]) -> Self {
        Self::from_slice(arcs)
    }
}

/// Build an [`Oid`] from literal arcs: `oid!(1, 3, 6, 1, 2, 1, 1, 3, 0)`.
#[macro_export]
macro_rules! oid {
    ($($arc:expr),* $(,)?) => {
        $crate::oid::Oid::from_slice(&[$($arc),*])
    };
}
