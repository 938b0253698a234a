//! Named-curve registry.
//!
//! `keyinfo_from_sexp` resolves a `(curve <name-or-oid>)` parameter: a
//! string whose first character (after stripping an optional `"oid."`
//! prefix) is not a digit is a curve name and goes through this table;
//! otherwise it is parsed directly as a dotted OID (§4.F "Curve-name
//! resolution").

use der::{ErrorKind, ObjectIdentifier, Result};

/// One row of the named-curve table.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CurveEntry {
    /// Canonical curve name, as used in symbolic expressions.
    pub name: &'static str,
    /// The curve's OID.
    pub oid: ObjectIdentifier,
}

/// The named-curve table (§4.E).
pub static CURVE_TABLE: &[CurveEntry] = &[
    CurveEntry {
        name: "NIST P-256",
        oid: ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7"),
    },
    CurveEntry {
        name: "NIST P-384",
        oid: ObjectIdentifier::new_unwrap("1.3.132.0.34"),
    },
    CurveEntry {
        name: "NIST P-521",
        oid: ObjectIdentifier::new_unwrap("1.3.132.0.35"),
    },
    CurveEntry {
        name: "Ed25519",
        oid: ObjectIdentifier::new_unwrap("1.3.101.112"),
    },
    CurveEntry {
        name: "Ed448",
        oid: ObjectIdentifier::new_unwrap("1.3.101.113"),
    },
    CurveEntry {
        name: "X25519",
        oid: ObjectIdentifier::new_unwrap("1.3.101.110"),
    },
    CurveEntry {
        name: "X448",
        oid: ObjectIdentifier::new_unwrap("1.3.101.111"),
    },
];

/// Resolve a curve name to its OID, case-insensitively.
pub fn curve_oid_for_name(name: &str) -> Result<ObjectIdentifier> {
    CURVE_TABLE
        .iter()
        .find(|entry| entry.name.eq_ignore_ascii_case(name))
        .map(|entry| entry.oid)
        .ok_or_else(|| ErrorKind::UnknownAlgorithm.into())
}

/// Resolve an OID to its canonical curve name, if registered.
pub fn curve_name_for_oid(oid: ObjectIdentifier) -> Option<&'static str> {
    CURVE_TABLE
        .iter()
        .find(|entry| entry.oid == oid)
        .map(|entry| entry.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_ed25519_by_name() {
        let oid = curve_oid_for_name("Ed25519").unwrap();
        assert_eq!(oid, ObjectIdentifier::new_unwrap("1.3.101.112"));
    }

    #[test]
    fn resolves_name_case_insensitively() {
        let oid = curve_oid_for_name("ed25519").unwrap();
        assert_eq!(oid, ObjectIdentifier::new_unwrap("1.3.101.112"));
    }

    #[test]
    fn unknown_curve_name_is_unknown_algorithm() {
        let err = curve_oid_for_name("totally-not-a-curve").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownAlgorithm);
    }

    #[test]
    fn recovers_name_from_oid() {
        assert_eq!(
            curve_name_for_oid(ObjectIdentifier::new_unwrap("1.3.132.0.34")),
            Some("NIST P-384")
        );
    }
}
