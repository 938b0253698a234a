//! Declarative key/signature/parameter layout descriptions.
//!
//! A typed stand-in for the data model's `elem_desc`/`tag_desc` mini-
//! language (§3 "Algorithm-table entry"): rather than interpreting a byte
//! string against the wire at runtime, each table row names its layout as
//! one of these variants and `keyinfo` matches on it directly -- the same
//! declarative, table-driven dispatch the design notes call for (§9 "keep
//! [the algorithm tables] declarative; dispatch on the `pk_algo` tag"),
//! expressed the way `algorithm-registry`'s `check_match!` macro dispatches
//! on OID: a plain `match`, not a generic interpreter.

/// Layout of a key or signature value (the `BIT STRING` content, once its
/// unused-bits byte is stripped).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ValueShape {
    /// The entire remaining bytes, verbatim, under one name -- no ASN.1
    /// framing of its own. Used for ECC/EdDSA public points, EdDSA
    /// signatures, and RSA PKCS#1 v1.5 signatures (a single unframed
    /// integer occupying the whole value).
    Raw(&'static str),
    /// A single DER `INTEGER`, with no enclosing `SEQUENCE` (DSA public key
    /// `y`, RFC 3279 §2.3.2).
    Integer(&'static str),
    /// A DER `SEQUENCE` of `INTEGER`s, named in order (RSA public key
    /// `n,e`; DSA/ECDSA signature `r,s`, RFC 3279/5480 `Dss-Sig-Value`).
    IntegerSequence(&'static [&'static str]),
}

/// Layout of the `AlgorithmIdentifier.parameters` field for a public-key
/// algorithm, used when emitting DER from a symbolic expression (§4.F step
/// 5: "For DSA the `AlgorithmIdentifier` parameters carry a SEQUENCE of
/// `p,q,g`; for RSA they carry NULL; for ECC they carry the curve OID").
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AlgoParams {
    /// `NULL` parameters.
    Null,
    /// The named curve `OBJECT IDENTIFIER`.
    Curve,
    /// A `SEQUENCE` of `INTEGER`s, named in order.
    IntegerSequence(&'static [&'static str]),
    /// No parameters field at all (RFC 8410 EdDSA/X25519/X448 keys).
    Absent,
}
