//! DER → symbolic conversion (§4.F `keyinfo_to_sexp`/`cryptval_to_sexp`).

use alloc::{format, vec, vec::Vec};
use algo_tables::{pk_algo_table, sig_algo_table, PkAlgo, Supported};
use der::{read_header, ErrorKind, Identifier, ObjectIdentifier, Reader, Result, SliceReader, UniversalTag};

use crate::{
    algoid::{get_algorithm, AlgoIdent, Carrier, Parameters},
    pss::parse_pss_params,
    sexp::Sexp,
    values::{decode_value, enc_value_shape, encode_u32},
};

/// Convert a `SubjectPublicKeyInfo` DER encoding into its symbolic
/// `(public-key ...)` form. Step 1 consumes the outer `SubjectPublicKeyInfo`
/// SEQUENCE before handing its content to [`get_algorithm`].
pub fn keyinfo_to_sexp(der: &[u8]) -> Result<Sexp> {
    let content = read_outer_sequence(der)?;
    let (ident, rest) = get_algorithm(content, true)?;
    if !rest.is_empty() {
        return Err(ErrorKind::InvalidKeyInfo.into());
    }
    let entry = algo_tables::lookup(pk_algo_table(), ident.oid)?;
    let raw = match ident.value {
        Some(Carrier::BitString(bits)) => bits,
        _ => return Err(ErrorKind::InvalidKeyInfo.into()),
    };

    let mut items = Vec::new();
    if entry.pk_algo == PkAlgo::Ecc {
        if let Parameters::Oid(oid) = ident.parameters {
            items.push(curve_sexp(oid));
        }
    }
    items.extend(decode_value(entry.value_shape, raw)?);

    Ok(Sexp::tagged(
        "public-key",
        vec![Sexp::tagged(entry.name, items)],
    ))
}

/// Which kind of value [`cryptval_to_sexp`] is decoding.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CryptValKind {
    /// A signature value (`sig-val`).
    SigVal,
    /// An encrypted value (`enc-val`), key-transport/agreement mode 1 (a
    /// single `AlgorithmIdentifier` + value, as opposed to the ECDH mode 2
    /// handled separately by [`ecdh_enc_val_to_sexp`]).
    EncVal,
}

/// Convert the concatenation of an `AlgorithmIdentifier` SEQUENCE and its
/// following `BIT STRING`/`OCTET STRING` into symbolic `(sig-val ...)`/
/// `(enc-val ...)` form.
///
/// Unlike [`keyinfo_to_sexp`], there is no outer wrapping SEQUENCE here --
/// `x509-cert` feeds this the concatenation of a certificate's
/// `signatureAlgorithm` and `signature` fields, which are sibling fields of
/// the enclosing `Certificate` SEQUENCE, not nested inside their own.
pub fn cryptval_to_sexp(der: &[u8], kind: CryptValKind) -> Result<Sexp> {
    let (ident, rest) = get_algorithm(der, true)?;
    if !rest.is_empty() {
        return Err(ErrorKind::InvalidKeyInfo.into());
    }

    match kind {
        CryptValKind::SigVal => sig_val_to_sexp(ident),
        CryptValKind::EncVal => enc_val_to_sexp(ident),
    }
}

fn sig_val_to_sexp(ident: AlgoIdent<'_>) -> Result<Sexp> {
    let entry = algo_tables::lookup(sig_algo_table(), ident.oid)?;
    let raw = match ident.value {
        Some(Carrier::BitString(bits)) => bits,
        _ => return Err(ErrorKind::InvalidKeyInfo.into()),
    };

    let mut algo_items = Vec::new();
    if entry.pk_algo == PkAlgo::Ecc {
        if let Parameters::Oid(oid) = ident.parameters {
            algo_items.push(curve_sexp(oid));
        }
    }
    algo_items.extend(decode_value(entry.value_shape, raw)?);

    let mut top_items = vec![Sexp::tagged(entry.name, algo_items)];

    if entry.supported == Supported::RsaPssSpecial {
        let params = match ident.parameters {
            Parameters::Sequence(bytes) => parse_pss_params(bytes)?,
            _ => return Err(ErrorKind::InvalidKeyInfo.into()),
        };
        top_items.push(Sexp::tagged("flags", vec![Sexp::atom_str("pss")]));
        top_items.push(Sexp::tagged(
            "hash-algo",
            vec![oid_atom(params.hash_algo)],
        ));
        top_items.push(Sexp::tagged(
            "salt-length",
            vec![Sexp::atom(encode_u32(params.salt_length))],
        ));
    } else if let Some(digest) = entry.digest_hint {
        top_items.push(Sexp::tagged("hash", vec![Sexp::atom_str(digest)]));
    }

    Ok(Sexp::tagged("sig-val", top_items))
}

fn enc_val_to_sexp(ident: AlgoIdent<'_>) -> Result<Sexp> {
    let entry = algo_tables::lookup(pk_algo_table(), ident.oid)?;
    let raw = ident.value.ok_or(ErrorKind::InvalidKeyInfo)?.bytes();

    let mut items = Vec::new();
    if entry.pk_algo == PkAlgo::Ecc {
        if let Parameters::Oid(oid) = ident.parameters {
            items.push(curve_sexp(oid));
        }
    }
    items.extend(decode_value(enc_value_shape(entry.pk_algo), raw)?);

    Ok(Sexp::tagged("enc-val", vec![Sexp::tagged(entry.name, items)]))
}

/// Build an ECDH encrypted-key (mode 2) `(enc-val (ecdh (e ..) (s ..))
/// (encr-algo ..) (wrap-algo ..))` expression directly from its already
/// separated fields (§4.F step 9).
///
/// Unlike [`cryptval_to_sexp`]'s mode-1 path, CMS's `KeyAgreeRecipientInfo`
/// never hands this codec a single concatenated `AlgorithmIdentifier`+value
/// blob to parse for the ECDH case -- the ephemeral point, wrapped key,
/// content-encryption algorithm and key-wrap algorithm arrive as separate
/// fields from the CMS layer, so there is nothing here to decode.
pub fn ecdh_enc_val_to_sexp(
    ephemeral_point: &[u8],
    wrapped_key: &[u8],
    encr_algo: ObjectIdentifier,
    wrap_algo: ObjectIdentifier,
) -> Sexp {
    let ecdh = Sexp::tagged(
        "ecdh",
        vec![
            Sexp::tagged("e", vec![Sexp::atom(ephemeral_point)]),
            Sexp::tagged("s", vec![Sexp::atom(wrapped_key)]),
        ],
    );
    Sexp::List(vec![
        Sexp::atom_str("enc-val"),
        ecdh,
        Sexp::tagged("encr-algo", vec![oid_atom(encr_algo)]),
        Sexp::tagged("wrap-algo", vec![oid_atom(wrap_algo)]),
    ])
}

fn curve_sexp(oid: ObjectIdentifier) -> Sexp {
    match algo_tables::curve_name_for_oid(oid) {
        Some(name) => Sexp::tagged("curve", vec![Sexp::atom_str(name)]),
        None => Sexp::tagged("curve", vec![oid_atom(oid)]),
    }
}

fn oid_atom(oid: ObjectIdentifier) -> Sexp {
    Sexp::atom_str(&format!("{oid}"))
}

fn read_outer_sequence(der: &[u8]) -> Result<&[u8]> {
    let mut reader = SliceReader::new(der);
    let header = read_header(&mut reader, false)?;
    if header.identifier != Identifier::universal(UniversalTag::Sequence) {
        return Err(ErrorKind::UnexpectedTag.into());
    }
    let start = reader.position();
    let end = start + header.length.value() as usize;
    let content = reader.slice(start, end)?;
    if end != der.len() {
        return Err(ErrorKind::InvalidKeyInfo.into());
    }
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn decodes_rsa_public_key() {
        // SPKI { AlgorithmIdentifier{rsaEncryption, NULL}, BIT STRING {
        //   SEQUENCE { INTEGER 0x010203, INTEGER 0x010001 } } }
        let der = hex!(
            "30 1D"
            "30 0D 0609 2a864886f70d010101 0500"
            "03 0C 00"
            "30 09 0203 010203 0203 010001"
        );
        let expr = keyinfo_to_sexp(&der).unwrap();
        let expected = Sexp::tagged(
            "public-key",
            vec![Sexp::tagged(
                "rsa",
                vec![
                    Sexp::tagged("n", vec![Sexp::atom(vec![0x01, 0x02, 0x03])]),
                    Sexp::tagged("e", vec![Sexp::atom(vec![0x01, 0x00, 0x01])]),
                ],
            )],
        );
        assert_eq!(expr, expected);
    }

    #[test]
    fn decodes_ed25519_public_key_with_absent_params() {
        // SPKI { AlgorithmIdentifier{Ed25519, absent}, BIT STRING { 32 raw bytes } }
        let mut der = alloc::vec![0x30, 0x2A, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x03, 0x21, 0x00];
        der.extend_from_slice(&[0xAB; 32]);
        let expr = keyinfo_to_sexp(&der).unwrap();
        let (_, rest) = expr.tagged_parts().unwrap();
        let (algo_name, items) = rest[0].tagged_parts().unwrap();
        assert_eq!(algo_name, "Ed25519");
        assert_eq!(
            items[0],
            Sexp::tagged("q", vec![Sexp::atom(alloc::vec![0xAB; 32])])
        );
    }

    #[test]
    fn decodes_ecdsa_signature_with_digest_hint() {
        // AlgorithmIdentifier{ecdsa-with-SHA256, absent} + BIT STRING {
        //   SEQUENCE { INTEGER 5, INTEGER 7 } }
        let der = hex!(
            "30 0B 0609 2a8648ce3d040302"
            "03 0A 00"
            "30 06 0201 05 0201 07"
        );
        let expr = cryptval_to_sexp(&der, CryptValKind::SigVal).unwrap();
        let expected = Sexp::tagged(
            "sig-val",
            vec![
                Sexp::tagged(
                    "ecdsa",
                    vec![
                        Sexp::tagged("r", vec![Sexp::atom(vec![0x05])]),
                        Sexp::tagged("s", vec![Sexp::atom(vec![0x07])]),
                    ],
                ),
                Sexp::tagged("hash", vec![Sexp::atom_str("sha256")]),
            ],
        );
        assert_eq!(expr, expected);
    }

    #[test]
    fn ecdh_enc_val_builds_expected_shape() {
        let encr = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.1.42");
        let wrap = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.1.45");
        let expr = ecdh_enc_val_to_sexp(&[0x04, 0xAA], &[0xBB, 0xCC], encr, wrap);
        let (tag, rest) = expr.tagged_parts().unwrap();
        assert_eq!(tag, "enc-val");
        let (ecdh_tag, ecdh_items) = rest[0].tagged_parts().unwrap();
        assert_eq!(ecdh_tag, "ecdh");
        assert_eq!(
            ecdh_items[0],
            Sexp::tagged("e", vec![Sexp::atom(vec![0x04, 0xAA])])
        );
        assert_eq!(rest[1].tagged_parts().unwrap().0, "encr-algo");
        assert_eq!(rest[2].tagged_parts().unwrap().0, "wrap-algo");
    }
}
