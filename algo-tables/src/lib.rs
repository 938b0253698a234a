//! Static algorithm OID tables -- component §4.E.
//!
//! Three tables (public-key, signature, content/key-encryption) plus a
//! named-curve registry. Every table row carries an [`ObjectIdentifier`];
//! lookup accepts either the dotted string form (optionally prefixed
//! `"oid."`/`"OID."`) or the raw DER content octets, since callers in the
//! keyinfo codec (component F) encounter both -- the former from symbolic
//! expressions, the latter straight off the wire.
//!
//! A row whose [`Supported`] is [`Supported::No`] is present so that
//! `UnknownAlgorithm` (not in any table) can be told apart from
//! `UnsupportedAlgorithm` (recognised, but this codec does not implement it).

#![no_std]
#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

extern crate alloc;

mod curve;
mod enc;
mod pk;
mod shape;
mod sig;

pub use crate::{
    curve::{curve_name_for_oid, curve_oid_for_name, CurveEntry, CURVE_TABLE},
    enc::{enc_algo_table, EncAlgoEntry},
    pk::{pk_algo_table, PkAlgo, PkAlgoEntry},
    shape::{AlgoParams, ValueShape},
    sig::{sig_algo_table, SigAlgoEntry},
};

use der::{ErrorKind, ObjectIdentifier, Result};

/// Whether a table row names an algorithm this codec can parse into
/// key/signature/encrypted-value material.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Supported {
    /// Recognised, but this codec does not implement it.
    No,
    /// Fully supported.
    Yes,
    /// RSASSA-PSS: supported, but flagged so the codec knows to additionally
    /// parse the RFC 4055 PSS parameter sequence.
    RsaPssSpecial,
}

/// A row in one of the three algorithm tables.
pub trait AlgoEntry {
    /// The algorithm's OID.
    fn oid(&self) -> ObjectIdentifier;
    /// Whether this codec supports the algorithm.
    fn supported(&self) -> Supported;
}

fn lookup_by_oid<T: AlgoEntry>(table: &[T], oid: ObjectIdentifier) -> Result<&T> {
    let entry = table
        .iter()
        .find(|entry| entry.oid() == oid)
        .ok_or(ErrorKind::UnknownAlgorithm)?;
    match entry.supported() {
        Supported::No => Err(ErrorKind::UnsupportedAlgorithm.into()),
        Supported::Yes | Supported::RsaPssSpecial => Ok(entry),
    }
}

/// Look up a table row by the dotted-string OID form (§4.E prefix
/// stripping applies via [`der::parse_oid_str`]).
pub fn lookup_by_str<T: AlgoEntry>(table: &[T], s: &str) -> Result<&T> {
    lookup_by_oid(table, der::parse_oid_str(s)?)
}

/// Look up a table row by the raw DER-encoded OID content octets.
pub fn lookup_by_bytes<T: AlgoEntry>(table: &[T], bytes: &[u8]) -> Result<&T> {
    lookup_by_oid(table, der::parse_oid_bytes(bytes)?)
}

/// Look up a table row by an already-parsed [`ObjectIdentifier`].
pub fn lookup<T: AlgoEntry>(table: &[T], oid: ObjectIdentifier) -> Result<&T> {
    lookup_by_oid(table, oid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_oid_is_unknown_algorithm() {
        let table = pk_algo_table();
        let err = lookup_by_str(table, "1.2.3.4.5.6.7").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownAlgorithm);
    }

    #[test]
    fn oid_prefix_is_stripped() {
        let table = pk_algo_table();
        let by_plain = lookup_by_str(table, "1.2.840.113549.1.1.1").unwrap();
        let by_prefixed = lookup_by_str(table, "oid.1.2.840.113549.1.1.1").unwrap();
        assert_eq!(by_plain.oid, by_prefixed.oid);
    }

    #[test]
    fn bytes_and_str_forms_agree() {
        let table = pk_algo_table();
        let oid = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");
        let by_str = lookup_by_str(table, "1.2.840.113549.1.1.1").unwrap();
        let by_bytes = lookup_by_bytes(table, oid.as_bytes()).unwrap();
        assert_eq!(by_str.oid, by_bytes.oid);
    }
}
