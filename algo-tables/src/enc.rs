//! Content/key-encryption algorithm table.
//!
//! Covers the algorithms `cryptval_to_sexp` (§4.F) emits as `encr-algo`/
//! `wrap-algo` for ECDH encrypted-key mode 2, and the symmetric algorithms
//! CMS `EncryptedContentInfo` (§4.H) names as its content-encryption
//! algorithm.

use crate::{AlgoEntry, Supported};
use der::ObjectIdentifier;

/// One row of the encryption algorithm table.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct EncAlgoEntry {
    /// Algorithm OID.
    pub oid: ObjectIdentifier,
    /// Short name used in symbolic expressions.
    pub name: &'static str,
    /// Whether this codec supports the algorithm.
    pub supported: Supported,
}

impl AlgoEntry for EncAlgoEntry {
    fn oid(&self) -> ObjectIdentifier {
        self.oid
    }

    fn supported(&self) -> Supported {
        self.supported
    }
}

/// The content/key-encryption algorithm table (§4.E).
pub fn enc_algo_table() -> &'static [EncAlgoEntry] {
    ENC_ALGO_TABLE
}

static ENC_ALGO_TABLE: &[EncAlgoEntry] = &[
    EncAlgoEntry {
        oid: ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1"),
        name: "rsa",
        supported: Supported::Yes,
    },
    EncAlgoEntry {
        oid: ObjectIdentifier::new_unwrap("1.2.840.113549.3.7"),
        name: "des-ede3-cbc",
        supported: Supported::Yes,
    },
    EncAlgoEntry {
        oid: ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.1.2"),
        name: "aes128-cbc",
        supported: Supported::Yes,
    },
    EncAlgoEntry {
        oid: ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.1.22"),
        name: "aes192-cbc",
        supported: Supported::Yes,
    },
    EncAlgoEntry {
        oid: ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.1.42"),
        name: "aes256-cbc",
        supported: Supported::Yes,
    },
    EncAlgoEntry {
        oid: ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.1.5"),
        name: "aes128-wrap",
        supported: Supported::Yes,
    },
    EncAlgoEntry {
        oid: ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.1.25"),
        name: "aes192-wrap",
        supported: Supported::Yes,
    },
    EncAlgoEntry {
        oid: ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.1.45"),
        name: "aes256-wrap",
        supported: Supported::Yes,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup_by_str;

    #[test]
    fn aes256_cbc_is_supported() {
        let entry = lookup_by_str(enc_algo_table(), "2.16.840.1.101.3.4.1.42").unwrap();
        assert_eq!(entry.name, "aes256-cbc");
    }
}
