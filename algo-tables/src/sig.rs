//! Signature algorithm table.

use crate::{AlgoEntry, PkAlgo, Supported, ValueShape};
use der::ObjectIdentifier;

/// One row of the signature algorithm table.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SigAlgoEntry {
    /// Algorithm OID.
    pub oid: ObjectIdentifier,
    /// Short name used in symbolic expressions.
    pub name: &'static str,
    /// Public-key family the signature is computed with.
    pub pk_algo: PkAlgo,
    /// Digest algorithm name to append as `(hash <digest_hint>)`, when the
    /// OID names a fixed digest (§4.F step 8). `None` for algorithms whose
    /// digest is carried elsewhere (RSASSA-PSS parameters, `ecdsa-with-
    /// specified`, EdDSA's digest being part of the signature scheme
    /// itself).
    pub digest_hint: Option<&'static str>,
    /// Layout of the signature `BIT STRING` content.
    pub value_shape: ValueShape,
    /// Whether this codec supports the algorithm.
    pub supported: Supported,
}

impl AlgoEntry for SigAlgoEntry {
    fn oid(&self) -> ObjectIdentifier {
        self.oid
    }

    fn supported(&self) -> Supported {
        self.supported
    }
}

/// The signature algorithm table (§4.E).
pub fn sig_algo_table() -> &'static [SigAlgoEntry] {
    SIG_ALGO_TABLE
}

static SIG_ALGO_TABLE: &[SigAlgoEntry] = &[
    SigAlgoEntry {
        oid: ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.5"),
        name: "rsa",
        pk_algo: PkAlgo::Rsa,
        digest_hint: Some("sha1"),
        value_shape: ValueShape::Raw("s"),
        supported: Supported::Yes,
    },
    SigAlgoEntry {
        oid: ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.11"),
        name: "rsa",
        pk_algo: PkAlgo::Rsa,
        digest_hint: Some("sha256"),
        value_shape: ValueShape::Raw("s"),
        supported: Supported::Yes,
    },
    SigAlgoEntry {
        oid: ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.12"),
        name: "rsa",
        pk_algo: PkAlgo::Rsa,
        digest_hint: Some("sha384"),
        value_shape: ValueShape::Raw("s"),
        supported: Supported::Yes,
    },
    SigAlgoEntry {
        oid: ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.13"),
        name: "rsa",
        pk_algo: PkAlgo::Rsa,
        digest_hint: Some("sha512"),
        value_shape: ValueShape::Raw("s"),
        supported: Supported::Yes,
    },
    SigAlgoEntry {
        // RSASSA-PSS (RFC 4055 §3.1): the digest is carried in the PSS
        // parameters, not fixed by the OID.
        oid: ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.10"),
        name: "rsa",
        pk_algo: PkAlgo::Rsa,
        digest_hint: None,
        value_shape: ValueShape::Raw("s"),
        supported: Supported::RsaPssSpecial,
    },
    SigAlgoEntry {
        oid: ObjectIdentifier::new_unwrap("1.2.840.10040.4.3"),
        name: "dsa",
        pk_algo: PkAlgo::Dsa,
        digest_hint: Some("sha1"),
        value_shape: ValueShape::IntegerSequence(&["r", "s"]),
        supported: Supported::Yes,
    },
    SigAlgoEntry {
        oid: ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.3.2"),
        name: "dsa",
        pk_algo: PkAlgo::Dsa,
        digest_hint: Some("sha256"),
        value_shape: ValueShape::IntegerSequence(&["r", "s"]),
        supported: Supported::Yes,
    },
    SigAlgoEntry {
        oid: ObjectIdentifier::new_unwrap("1.2.840.10045.4.1"),
        name: "ecdsa",
        pk_algo: PkAlgo::Ecc,
        digest_hint: Some("sha1"),
        value_shape: ValueShape::IntegerSequence(&["r", "s"]),
        supported: Supported::Yes,
    },
    SigAlgoEntry {
        oid: ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.1"),
        name: "ecdsa",
        pk_algo: PkAlgo::Ecc,
        digest_hint: Some("sha224"),
        value_shape: ValueShape::IntegerSequence(&["r", "s"]),
        supported: Supported::Yes,
    },
    SigAlgoEntry {
        oid: ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.2"),
        name: "ecdsa",
        pk_algo: PkAlgo::Ecc,
        digest_hint: Some("sha256"),
        value_shape: ValueShape::IntegerSequence(&["r", "s"]),
        supported: Supported::Yes,
    },
    SigAlgoEntry {
        oid: ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.3"),
        name: "ecdsa",
        pk_algo: PkAlgo::Ecc,
        digest_hint: Some("sha384"),
        value_shape: ValueShape::IntegerSequence(&["r", "s"]),
        supported: Supported::Yes,
    },
    SigAlgoEntry {
        oid: ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.4"),
        name: "ecdsa",
        pk_algo: PkAlgo::Ecc,
        digest_hint: Some("sha512"),
        value_shape: ValueShape::IntegerSequence(&["r", "s"]),
        supported: Supported::Yes,
    },
    SigAlgoEntry {
        // ecdsa-with-specified (RFC 5758 §3.2): the real digest OID lives
        // inside this algorithm's own SEQUENCE parameter. `get_algorithm`
        // (§4.F) special-cases this OID before any table lookup happens, so
        // this row exists only to let a raw occurrence be recognised rather
        // than reported unknown.
        oid: ObjectIdentifier::new_unwrap("1.2.840.10045.4.3"),
        name: "ecdsa-with-specified",
        pk_algo: PkAlgo::Ecc,
        digest_hint: None,
        value_shape: ValueShape::IntegerSequence(&["r", "s"]),
        supported: Supported::No,
    },
    SigAlgoEntry {
        // RFC 8410: EdDSA reuses the public-key OID as the signature
        // algorithm OID; the digest (SHA-512 for Ed25519, SHAKE256 for
        // Ed448) is fixed by the signature scheme itself.
        oid: ObjectIdentifier::new_unwrap("1.3.101.112"),
        name: "Ed25519",
        pk_algo: PkAlgo::Ecc,
        digest_hint: None,
        value_shape: ValueShape::Raw("s"),
        supported: Supported::Yes,
    },
    SigAlgoEntry {
        oid: ObjectIdentifier::new_unwrap("1.3.101.113"),
        name: "Ed448",
        pk_algo: PkAlgo::Ecc,
        digest_hint: None,
        value_shape: ValueShape::Raw("s"),
        supported: Supported::Yes,
    },
];
