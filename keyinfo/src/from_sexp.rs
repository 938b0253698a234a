//! Symbolic → DER conversion (§4.F `keyinfo_from_sexp`/`algoinfo_from_sexp`).

use alloc::vec::Vec;
use algo_tables::{
    curve_oid_for_name, pk_algo_table, sig_algo_table, AlgoParams, PkAlgo, PkAlgoEntry,
    SigAlgoEntry, Supported,
};
use der::{parse_oid_str, ErrorKind, Identifier, ObjectIdentifier, Result, UniversalTag};

use crate::{
    sexp::Sexp,
    values::{
        decode_u32, enc_value_shape, encode_integer, encode_sequence, encode_u32, encode_value,
        field, wrap_tlv,
    },
};

/// Convert a symbolic `(public-key ...)` expression into a
/// `SubjectPublicKeyInfo` DER encoding.
pub fn keyinfo_from_sexp(expr: &Sexp) -> Result<Vec<u8>> {
    let (tag, rest) = expr.tagged_parts()?;
    if tag != "public-key" {
        return Err(ErrorKind::UnknownSexp.into());
    }
    let algo_list = rest.first().ok_or(ErrorKind::InvalidSexp)?;
    let (algo_name, algo_items) = algo_list.tagged_parts()?;

    let entry = resolve_pk_entry(algo_name, algo_items)?;
    let params = encode_pk_params(entry, algo_items)?;
    let value = encode_value(entry.value_shape, algo_items)?;
    assemble_spki(entry.oid, &params, &value)
}

fn resolve_pk_entry(algo_name: &str, items: &[Sexp]) -> Result<&'static PkAlgoEntry> {
    let base = pk_algo_table()
        .iter()
        .find(|e| e.name.eq_ignore_ascii_case(algo_name))
        .ok_or(ErrorKind::UnknownAlgorithm)?;

    // Ed25519/Ed448 keys arrive tagged generically as "ecc" with a named
    // curve child; reassign to the dedicated row (AlgoParams::Absent, not
    // AlgoParams::Curve) so the parameters field is correctly omitted.
    if base.pk_algo == PkAlgo::Ecc {
        if let Some(curve) = find_field_str(items, "curve")? {
            if curve.eq_ignore_ascii_case("Ed25519") || curve.eq_ignore_ascii_case("Ed448") {
                return pk_algo_table()
                    .iter()
                    .find(|e| e.name.eq_ignore_ascii_case(curve))
                    .ok_or_else(|| ErrorKind::UnknownAlgorithm.into());
            }
        }
    }
    Ok(base)
}

fn encode_pk_params(entry: &PkAlgoEntry, items: &[Sexp]) -> Result<Vec<u8>> {
    match entry.param_shape {
        AlgoParams::Absent => Ok(Vec::new()),
        AlgoParams::Null => wrap_tlv(Identifier::universal(UniversalTag::Null), &[]),
        AlgoParams::IntegerSequence(names) => {
            let mut content = Vec::new();
            for name in names {
                content.extend(encode_integer(field(items, name)?)?);
            }
            encode_sequence(&content)
        }
        AlgoParams::Curve => {
            let curve_name = find_field_str(items, "curve")?.ok_or(ErrorKind::InvalidSexp)?;
            let oid = curve_name_or_oid(curve_name)?;
            wrap_tlv(
                Identifier::universal(UniversalTag::ObjectIdentifier),
                oid.as_bytes(),
            )
        }
    }
}

fn curve_name_or_oid(s: &str) -> Result<ObjectIdentifier> {
    let stripped = s
        .strip_prefix("oid.")
        .or_else(|| s.strip_prefix("OID."))
        .unwrap_or(s);
    match stripped.chars().next() {
        Some(c) if c.is_ascii_digit() => parse_oid_str(stripped),
        _ => curve_oid_for_name(s),
    }
}

fn assemble_spki(oid: ObjectIdentifier, params: &[u8], value: &[u8]) -> Result<Vec<u8>> {
    let algo_tlv = wrap_algorithm_identifier(oid, if params.is_empty() { None } else { Some(params) })?;

    let mut bit_string_content = Vec::with_capacity(value.len() + 1);
    bit_string_content.push(0);
    bit_string_content.extend_from_slice(value);
    let bit_string_tlv = wrap_tlv(
        Identifier::universal(UniversalTag::BitString),
        &bit_string_content,
    )?;

    let mut spki_content = Vec::new();
    spki_content.extend_from_slice(&algo_tlv);
    spki_content.extend_from_slice(&bit_string_tlv);
    wrap_tlv(Identifier::universal(UniversalTag::Sequence), &spki_content)
}

/// Convert a symbolic `(sig-val ...)`/`(enc-val ...)` expression into the
/// concatenation of an `AlgorithmIdentifier` SEQUENCE and its following
/// `BIT STRING`/`OCTET STRING` (no outer wrapping SEQUENCE, mirroring the
/// asymmetry between `keyinfo_to_sexp`/`keyinfo_from_sexp` and
/// `cryptval_to_sexp`/`algoinfo_from_sexp`).
pub fn algoinfo_from_sexp(expr: &Sexp) -> Result<Vec<u8>> {
    let (tag, rest) = expr.tagged_parts()?;
    match tag {
        "sig-val" => sig_val_from_sexp(rest),
        "enc-val" => {
            let algo_list = rest.first().ok_or(ErrorKind::InvalidSexp)?;
            let (algo_name, algo_items) = algo_list.tagged_parts()?;
            enc_val_from_sexp(algo_name, algo_items)
        }
        _ => Err(ErrorKind::UnknownSexp.into()),
    }
}

fn sig_val_from_sexp(rest: &[Sexp]) -> Result<Vec<u8>> {
    let algo_list = rest.first().ok_or(ErrorKind::InvalidSexp)?;
    let (algo_name, algo_items) = algo_list.tagged_parts()?;
    let siblings = &rest[1..];

    let pss = siblings.iter().any(|it| {
        it.tagged_parts()
            .map(|(n, r)| {
                n == "flags"
                    && r.first()
                        .and_then(|a| a.as_atom().ok())
                        .map(|b| b == b"pss")
                        .unwrap_or(false)
            })
            .unwrap_or(false)
    });
    let hash_name = find_field_str(siblings, "hash")?;

    let entry = resolve_sig_entry(algo_name, pss, hash_name)?;
    let params = encode_sig_params(entry, siblings)?;
    let value = encode_value(entry.value_shape, algo_items)?;
    assemble_algo_value(entry.oid, &params, &value, UniversalTag::BitString)
}

fn resolve_sig_entry(
    algo_name: &str,
    pss: bool,
    hash_name: Option<&str>,
) -> Result<&'static SigAlgoEntry> {
    sig_algo_table()
        .iter()
        .find(|e| {
            e.name.eq_ignore_ascii_case(algo_name)
                && if pss {
                    e.supported == Supported::RsaPssSpecial
                } else {
                    match hash_name {
                        Some(h) => e.digest_hint == Some(h),
                        None => e.digest_hint.is_none() && e.supported == Supported::Yes,
                    }
                }
        })
        .ok_or_else(|| ErrorKind::UnknownAlgorithm.into())
}

const DEFAULT_HASH_OID: &str = "1.3.14.3.2.26";
const MGF1_OID: &str = "1.2.840.113549.1.1.8";
const DEFAULT_SALT_LENGTH: u32 = 20;

fn encode_sig_params(entry: &SigAlgoEntry, siblings: &[Sexp]) -> Result<Vec<u8>> {
    if entry.supported == Supported::RsaPssSpecial {
        build_pss_params(siblings)
    } else if entry.pk_algo == PkAlgo::Rsa {
        wrap_tlv(Identifier::universal(UniversalTag::Null), &[])
    } else {
        // DSA/ECDSA/EdDSA: AlgorithmIdentifier parameters absent.
        Ok(Vec::new())
    }
}

fn build_pss_params(siblings: &[Sexp]) -> Result<Vec<u8>> {
    let hash_str = find_field_str(siblings, "hash-algo")?.ok_or(ErrorKind::InvalidSexp)?;
    let hash_oid = parse_oid_str(hash_str)?;
    let salt_length = match find_field(siblings, "salt-length")? {
        Some(bytes) => decode_u32(bytes)?,
        None => DEFAULT_SALT_LENGTH,
    };
    let default_hash = parse_oid_str(DEFAULT_HASH_OID)?;

    let mut content = Vec::new();
    // DER (X.690 §11.5): DEFAULT-valued optional fields are omitted.
    if hash_oid != default_hash {
        let hash_ai = wrap_algorithm_identifier(hash_oid, None)?;
        content.extend(explicit_tag(0, &hash_ai)?);

        let mgf_inner = wrap_algorithm_identifier(hash_oid, None)?;
        let mgf1_oid = parse_oid_str(MGF1_OID)?;
        let mgf_ai = wrap_algorithm_identifier(mgf1_oid, Some(&mgf_inner))?;
        content.extend(explicit_tag(1, &mgf_ai)?);
    }
    if salt_length != DEFAULT_SALT_LENGTH {
        let salt_int = encode_integer(&encode_u32(salt_length))?;
        content.extend(explicit_tag(2, &salt_int)?);
    }
    encode_sequence(&content)
}

fn wrap_algorithm_identifier(oid: ObjectIdentifier, params: Option<&[u8]>) -> Result<Vec<u8>> {
    let oid_tlv = wrap_tlv(
        Identifier::universal(UniversalTag::ObjectIdentifier),
        oid.as_bytes(),
    )?;
    let mut content = oid_tlv;
    if let Some(p) = params {
        content.extend_from_slice(p);
    }
    wrap_tlv(Identifier::universal(UniversalTag::Sequence), &content)
}

fn explicit_tag(number: u8, inner: &[u8]) -> Result<Vec<u8>> {
    let id = Identifier::context_specific(number, true)?;
    wrap_tlv(id, inner)
}

fn enc_val_from_sexp(algo_name: &str, algo_items: &[Sexp]) -> Result<Vec<u8>> {
    let entry = pk_algo_table()
        .iter()
        .find(|e| e.name.eq_ignore_ascii_case(algo_name))
        .ok_or(ErrorKind::UnknownAlgorithm)?;
    let params = encode_pk_params(entry, algo_items)?;
    let value = encode_value(enc_value_shape(entry.pk_algo), algo_items)?;
    assemble_algo_value(entry.oid, &params, &value, UniversalTag::OctetString)
}

fn assemble_algo_value(
    oid: ObjectIdentifier,
    params: &[u8],
    value: &[u8],
    carrier_tag: UniversalTag,
) -> Result<Vec<u8>> {
    let algo_tlv = wrap_algorithm_identifier(oid, if params.is_empty() { None } else { Some(params) })?;

    let mut carrier_content = Vec::with_capacity(value.len() + 1);
    if carrier_tag == UniversalTag::BitString {
        carrier_content.push(0);
    }
    carrier_content.extend_from_slice(value);
    let carrier_tlv = wrap_tlv(Identifier::universal(carrier_tag), &carrier_content)?;

    let mut out = algo_tlv;
    out.extend_from_slice(&carrier_tlv);
    Ok(out)
}

/// The inverse of [`crate::to_sexp::ecdh_enc_val_to_sexp`]: extract the raw
/// fields back out of an `(enc-val (ecdh (e ..) (s ..)) (encr-algo ..)
/// (wrap-algo ..))` expression, for callers (the CMS layer) that manage the
/// DER encoding of `KeyAgreeRecipientInfo` themselves.
pub fn ecdh_enc_val_from_sexp(
    expr: &Sexp,
) -> Result<(Vec<u8>, Vec<u8>, ObjectIdentifier, ObjectIdentifier)> {
    let (tag, rest) = expr.tagged_parts()?;
    if tag != "enc-val" {
        return Err(ErrorKind::UnknownSexp.into());
    }
    let ecdh = rest.first().ok_or(ErrorKind::InvalidSexp)?;
    let (ecdh_tag, ecdh_items) = ecdh.tagged_parts()?;
    if ecdh_tag != "ecdh" {
        return Err(ErrorKind::UnknownSexp.into());
    }
    let e = field(ecdh_items, "e")?.to_vec();
    let s = field(ecdh_items, "s")?.to_vec();
    let encr_algo = parse_oid_str(
        find_field_str(rest, "encr-algo")?.ok_or(ErrorKind::InvalidSexp)?,
    )?;
    let wrap_algo = parse_oid_str(
        find_field_str(rest, "wrap-algo")?.ok_or(ErrorKind::InvalidSexp)?,
    )?;
    Ok((e, s, encr_algo, wrap_algo))
}

fn find_field<'a>(items: &'a [Sexp], name: &str) -> Result<Option<&'a [u8]>> {
    match items
        .iter()
        .find(|it| it.tagged_parts().map(|(n, _)| n == name).unwrap_or(false))
    {
        None => Ok(None),
        Some(item) => {
            let (_, rest) = item.tagged_parts()?;
            Ok(Some(rest.first().ok_or(ErrorKind::InvalidSexp)?.as_atom()?))
        }
    }
}

fn find_field_str<'a>(items: &'a [Sexp], name: &str) -> Result<Option<&'a str>> {
    match find_field(items, name)? {
        None => Ok(None),
        Some(bytes) => Ok(Some(
            core::str::from_utf8(bytes).map_err(|_| ErrorKind::InvalidSexp)?,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use hex_literal::hex;

    #[test]
    fn builds_rsa_public_key_der() {
        let expr = Sexp::tagged(
            "public-key",
            vec![Sexp::tagged(
                "rsa",
                vec![
                    Sexp::tagged("n", vec![Sexp::atom(vec![0x01, 0x02, 0x03])]),
                    Sexp::tagged("e", vec![Sexp::atom(vec![0x01, 0x00, 0x01])]),
                ],
            )],
        );
        let der = keyinfo_from_sexp(&expr).unwrap();
        let expected = hex!(
            "30 1D"
            "30 0D 0609 2a864886f70d010101 0500"
            "03 0C 00"
            "30 09 0203 010203 0203 010001"
        );
        assert_eq!(der, expected.to_vec());
    }

    #[test]
    fn builds_ecdsa_signature_with_absent_params() {
        let expr = Sexp::tagged(
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
        let der = algoinfo_from_sexp(&expr).unwrap();
        let expected = hex!(
            "30 0B 0609 2a8648ce3d040302"
            "03 0A 00"
            "30 06 0201 05 0201 07"
        );
        assert_eq!(der, expected.to_vec());
    }

    #[test]
    fn ecdh_enc_val_round_trips_fields() {
        let encr = parse_oid_str("2.16.840.1.101.3.4.1.42").unwrap();
        let wrap = parse_oid_str("2.16.840.1.101.3.4.1.45").unwrap();
        let expr = crate::to_sexp::ecdh_enc_val_to_sexp(&[0x04, 0xAA], &[0xBB, 0xCC], encr, wrap);
        let (e, s, encr2, wrap2) = ecdh_enc_val_from_sexp(&expr).unwrap();
        assert_eq!(e, alloc::vec![0x04, 0xAA]);
        assert_eq!(s, alloc::vec![0xBB, 0xCC]);
        assert_eq!(encr2, encr);
        assert_eq!(wrap2, wrap);
    }

    #[test]
    fn key_to_sexp_round_trips_through_from_sexp() {
        let der = hex!(
            "30 1D"
            "30 0D 0609 2a864886f70d010101 0500"
            "03 0C 00"
            "30 09 0203 010203 0203 010001"
        );
        let expr = crate::to_sexp::keyinfo_to_sexp(&der).unwrap();
        let rebuilt = keyinfo_from_sexp(&expr).unwrap();
        assert_eq!(rebuilt, der.to_vec());
    }
}
