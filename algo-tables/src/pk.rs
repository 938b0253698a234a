//! Public-key algorithm table.

use crate::{AlgoEntry, AlgoParams, Supported, ValueShape};
use der::ObjectIdentifier;

/// The public-key family a [`PkAlgoEntry`] belongs to.
///
/// EdDSA and X25519/X448 keys are classified as [`PkAlgo::Ecc`] -- the
/// symbolic key form the codec emits for all of them is `(ecc ...)`, the
/// curve-specific OID distinguishing the concrete curve (§4.F step 2, §8
/// end-to-end scenario 2).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum PkAlgo {
    /// RSA (PKCS#1).
    Rsa,
    /// DSA.
    Dsa,
    /// Elliptic-curve (Weierstrass, Edwards or Montgomery).
    Ecc,
}

/// One row of the public-key algorithm table.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PkAlgoEntry {
    /// Algorithm OID.
    pub oid: ObjectIdentifier,
    /// Short name used in symbolic expressions and by name-based lookup in
    /// `keyinfo_from_sexp` (§4.F step 2).
    pub name: &'static str,
    /// Public-key family.
    pub pk_algo: PkAlgo,
    /// Layout of the `SubjectPublicKeyInfo.subjectPublicKey` `BIT STRING`
    /// content, used by `keyinfo_to_sexp`/`keyinfo_from_sexp` (§4.F step 2).
    pub value_shape: ValueShape,
    /// Layout of the `AlgorithmIdentifier.parameters` field.
    pub param_shape: AlgoParams,
    /// Whether this codec supports the algorithm.
    pub supported: Supported,
}

impl AlgoEntry for PkAlgoEntry {
    fn oid(&self) -> ObjectIdentifier {
        self.oid
    }

    fn supported(&self) -> Supported {
        self.supported
    }
}

/// The public-key algorithm table (§4.E).
pub fn pk_algo_table() -> &'static [PkAlgoEntry] {
    PK_ALGO_TABLE
}

static PK_ALGO_TABLE: &[PkAlgoEntry] = &[
    PkAlgoEntry {
        oid: ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1"),
        name: "rsa",
        pk_algo: PkAlgo::Rsa,
        value_shape: ValueShape::IntegerSequence(&["n", "e"]),
        param_shape: AlgoParams::Null,
        supported: Supported::Yes,
    },
    PkAlgoEntry {
        oid: ObjectIdentifier::new_unwrap("1.2.840.10040.4.1"),
        name: "dsa",
        pk_algo: PkAlgo::Dsa,
        // RFC 3279 §2.3.2: `y` is a bare INTEGER, not SEQUENCE-wrapped.
        value_shape: ValueShape::Integer("y"),
        param_shape: AlgoParams::IntegerSequence(&["p", "q", "g"]),
        supported: Supported::Yes,
    },
    PkAlgoEntry {
        oid: ObjectIdentifier::new_unwrap("1.2.840.10045.2.1"),
        name: "ecc",
        pk_algo: PkAlgo::Ecc,
        value_shape: ValueShape::Raw("q"),
        param_shape: AlgoParams::Curve,
        supported: Supported::Yes,
    },
    PkAlgoEntry {
        // RFC 8410.
        oid: ObjectIdentifier::new_unwrap("1.3.101.110"),
        name: "X25519",
        pk_algo: PkAlgo::Ecc,
        value_shape: ValueShape::Raw("q"),
        param_shape: AlgoParams::Absent,
        supported: Supported::Yes,
    },
    PkAlgoEntry {
        oid: ObjectIdentifier::new_unwrap("1.3.101.111"),
        name: "X448",
        pk_algo: PkAlgo::Ecc,
        value_shape: ValueShape::Raw("q"),
        param_shape: AlgoParams::Absent,
        supported: Supported::Yes,
    },
    PkAlgoEntry {
        oid: ObjectIdentifier::new_unwrap("1.3.101.112"),
        name: "Ed25519",
        pk_algo: PkAlgo::Ecc,
        value_shape: ValueShape::Raw("q"),
        param_shape: AlgoParams::Absent,
        supported: Supported::Yes,
    },
    PkAlgoEntry {
        oid: ObjectIdentifier::new_unwrap("1.3.101.113"),
        name: "Ed448",
        pk_algo: PkAlgo::Ecc,
        value_shape: ValueShape::Raw("q"),
        param_shape: AlgoParams::Absent,
        supported: Supported::Yes,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup_by_str;

    #[test]
    fn rsa_entry_classifies_as_rsa() {
        let entry = lookup_by_str(pk_algo_table(), "1.2.840.113549.1.1.1").unwrap();
        assert_eq!(entry.pk_algo, PkAlgo::Rsa);
        assert_eq!(entry.name, "rsa");
    }

    #[test]
    fn ed25519_classifies_as_ecc() {
        let entry = lookup_by_str(pk_algo_table(), "1.3.101.112").unwrap();
        assert_eq!(entry.pk_algo, PkAlgo::Ecc);
    }

    #[test]
    fn dsa_public_value_is_bare_integer() {
        let entry = lookup_by_str(pk_algo_table(), "1.2.840.10040.4.1").unwrap();
        assert_eq!(entry.value_shape, ValueShape::Integer("y"));
        assert_eq!(entry.param_shape, AlgoParams::IntegerSequence(&["p", "q", "g"]));
    }

    #[test]
    fn rsa_public_value_is_integer_sequence() {
        let entry = lookup_by_str(pk_algo_table(), "1.2.840.113549.1.1.1").unwrap();
        assert_eq!(entry.value_shape, ValueShape::IntegerSequence(&["n", "e"]));
        assert_eq!(entry.param_shape, AlgoParams::Null);
    }
}
