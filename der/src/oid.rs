//! ASN.1 `OBJECT IDENTIFIER` (X.690 §8.19), re-exported from `const-oid`.
//!
//! The algorithm tables (component E) need both the dotted-string and raw
//! DER-encoded-bytes forms of an OID; [`const_oid::ObjectIdentifier`]
//! already stores the latter internally and derives the former, so this
//! module is a thin re-export plus the one helper the tables need: stripping
//! an optional `"oid."`/`"OID."` prefix before parsing (§4.E).

pub use const_oid::ObjectIdentifier;

use crate::{ErrorKind, Result};

/// Parse a dotted OID string, first stripping a case-insensitive `"oid."`
/// prefix if present (§4.E: "lookup may be by either form, after optional
/// `oid.` / `OID.` prefix stripping").
pub fn parse_oid_str(s: &str) -> Result<ObjectIdentifier> {
    let stripped = s
        .strip_prefix("oid.")
        .or_else(|| s.strip_prefix("OID."))
        .unwrap_or(s);
    stripped.parse().map_err(|_| ErrorKind::InvalidValue.into())
}

/// Parse an [`ObjectIdentifier`] from its raw DER-encoded content octets
/// (the form `read_header`/the BER decoder hand back for an `OBJECT
/// IDENTIFIER` value, as opposed to the dotted-string form).
pub fn parse_oid_bytes(bytes: &[u8]) -> Result<ObjectIdentifier> {
    ObjectIdentifier::from_bytes(bytes).map_err(|_| ErrorKind::InvalidValue.into())
}
