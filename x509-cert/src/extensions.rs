//! Certificate extension accessors (RFC 5280 §4.1.2.9): the `extensions()`
//! list plus typed readers for `KeyUsage` (§4.2.1.3) and `BasicConstraints`
//! (§4.2.1.9), the two extensions a verifier reads most often.

use alloc::{format, string::String, vec::Vec};
use ber_decoder::Node;
use der::{
    parse_oid_bytes, read_header, ErrorKind, Identifier, Reader, Result, SliceReader, UniversalTag,
};

pub(crate) const KEY_USAGE_OID: &str = "2.5.29.15";
pub(crate) const BASIC_CONSTRAINTS_OID: &str = "2.5.29.19";

/// One decoded `Extension`: its OID, criticality, and the raw `extnValue`
/// `OCTET STRING` content -- still DER-encoded per-extension payload,
/// undecoded until a caller asks for a specific one.
#[derive(Debug, Clone)]
pub struct ExtensionEntry<'i> {
    /// `extnID`, as a dotted string.
    pub oid: String,
    /// `critical`, `false` when absent (its grammar `DEFAULT`).
    pub critical: bool,
    /// `extnValue`'s content bytes.
    pub value: &'i [u8],
}

/// RFC 5280 §4.2.1.3 `KeyUsage` bit flags, named in the `BIT STRING`'s wire
/// order (`digitalSignature` is bit 0, the first and most-significant named
/// bit).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct KeyUsage {
    /// Bit 0.
    pub digital_signature: bool,
    /// Bit 1.
    pub non_repudiation: bool,
    /// Bit 2.
    pub key_encipherment: bool,
    /// Bit 3.
    pub data_encipherment: bool,
    /// Bit 4.
    pub key_agreement: bool,
    /// Bit 5.
    pub key_cert_sign: bool,
    /// Bit 6.
    pub crl_sign: bool,
    /// Bit 7.
    pub encipher_only: bool,
    /// Bit 8.
    pub decipher_only: bool,
}

/// RFC 5280 §4.2.1.9 `BasicConstraints`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct BasicConstraints {
    /// `cA`, `false` when absent (its grammar `DEFAULT`).
    pub ca: bool,
    /// `pathLenConstraint`, when present.
    pub path_len_constraint: Option<u32>,
}

/// List every `Extension` under a decoded `Extensions` (`SEQUENCE OF`) node.
pub(crate) fn list<'i>(extensions: &Node<'i>) -> Result<Vec<ExtensionEntry<'i>>> {
    let mut out = Vec::with_capacity(extensions.len());
    for (_, ext) in &extensions.children {
        let extn_id = ext.child("extnID").ok_or(ErrorKind::InvalidObject)?;
        let oid = parse_oid_bytes(extn_id.value)?;
        let critical = match ext.child("critical") {
            Some(c) => decode_boolean(c.value)?,
            None => false,
        };
        let extn_value = ext.child("extnValue").ok_or(ErrorKind::InvalidObject)?;
        out.push(ExtensionEntry {
            oid: format!("{oid}"),
            critical,
            value: extn_value.value,
        });
    }
    Ok(out)
}

pub(crate) fn find_value<'a, 'i>(entries: &'a [ExtensionEntry<'i>], oid: &str) -> Option<&'a [u8]> {
    entries.iter().find(|e| e.oid == oid).map(|e| e.value)
}

/// Decode a `KeyUsage` extension's `extnValue` content (the `BIT STRING`
/// TLV it wraps).
pub(crate) fn parse_key_usage(raw: &[u8]) -> Result<KeyUsage> {
    let (id, content) = read_whole_tlv(raw)?;
    if id != Identifier::universal(UniversalTag::BitString) {
        return Err(ErrorKind::UnexpectedTag.into());
    }
    let (_unused_bits, bits) = content.split_first().ok_or(ErrorKind::InvalidObject)?;
    let byte0 = bits.first().copied().unwrap_or(0);
    let byte1 = bits.get(1).copied().unwrap_or(0);
    Ok(KeyUsage {
        digital_signature: byte0 & 0b1000_0000 != 0,
        non_repudiation: byte0 & 0b0100_0000 != 0,
        key_encipherment: byte0 & 0b0010_0000 != 0,
        data_encipherment: byte0 & 0b0001_0000 != 0,
        key_agreement: byte0 & 0b0000_1000 != 0,
        key_cert_sign: byte0 & 0b0000_0100 != 0,
        crl_sign: byte0 & 0b0000_0010 != 0,
        encipher_only: byte0 & 0b0000_0001 != 0,
        decipher_only: byte1 & 0b1000_0000 != 0,
    })
}

/// Decode a `BasicConstraints` extension's `extnValue` content (the
/// `SEQUENCE` TLV it wraps): `cA BOOLEAN DEFAULT FALSE, pathLenConstraint
/// INTEGER OPTIONAL`.
pub(crate) fn parse_basic_constraints(raw: &[u8]) -> Result<BasicConstraints> {
    let (id, content) = read_whole_tlv(raw)?;
    if id != Identifier::universal(UniversalTag::Sequence) {
        return Err(ErrorKind::UnexpectedTag.into());
    }

    let mut reader = SliceReader::new(content);
    let mut ca = false;
    let mut path_len_constraint = None;

    while !reader.is_empty() {
        let (field_id, field_body) = read_tlv(&mut reader)?;
        if field_id == Identifier::universal(UniversalTag::Boolean) && path_len_constraint.is_none() {
            ca = decode_boolean(field_body)?;
        } else if field_id == Identifier::universal(UniversalTag::Integer) {
            path_len_constraint = Some(decode_u32(field_body)?);
        } else {
            return Err(ErrorKind::UnexpectedTag.into());
        }
    }

    Ok(BasicConstraints { ca, path_len_constraint })
}

fn decode_boolean(raw: &[u8]) -> Result<bool> {
    match raw {
        [0x00] => Ok(false),
        [_] => Ok(true),
        _ => Err(ErrorKind::InvalidObject.into()),
    }
}

fn decode_u32(bytes: &[u8]) -> Result<u32> {
    if bytes.is_empty() || bytes.len() > 5 || bytes[0] & 0x80 != 0 {
        // `pathLenConstraint` is non-negative; a leading `0x80` bit would
        // make the DER two's-complement value negative.
        return Err(ErrorKind::InvalidObject.into());
    }
    let mut value = 0u32;
    for &b in bytes {
        value = value
            .checked_shl(8)
            .and_then(|v| v.checked_add(u32::from(b)))
            .ok_or(ErrorKind::ObjectTooLarge)?;
    }
    Ok(value)
}

fn read_whole_tlv(raw: &[u8]) -> Result<(Identifier, &[u8])> {
    let mut reader = SliceReader::new(raw);
    let (id, content) = read_tlv(&mut reader)?;
    if !reader.is_empty() {
        return Err(ErrorKind::InvalidObject.into());
    }
    Ok((id, content))
}

fn read_tlv<'a>(reader: &mut SliceReader<'a>) -> Result<(Identifier, &'a [u8])> {
    let header = read_header(reader, false)?;
    let start = reader.position();
    let end = start + header.length.value() as usize;
    let content = reader.slice(start, end)?;
    reader.seek(end)?;
    Ok((header.identifier, content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn parses_key_usage_digital_signature_and_key_encipherment() {
        // BIT STRING, 1 unused bit, byte 0b1010_0000 -> digitalSignature +
        // keyEncipherment.
        let raw = hex!("03 02 01 a0");
        let usage = parse_key_usage(&raw).unwrap();
        assert!(usage.digital_signature);
        assert!(usage.key_encipherment);
        assert!(!usage.non_repudiation);
        assert!(!usage.decipher_only);
    }

    #[test]
    fn parses_basic_constraints_ca_with_path_len() {
        // SEQUENCE { cA TRUE, pathLenConstraint 3 }
        let raw = hex!("3006 0101 ff 020103");
        let bc = parse_basic_constraints(&raw).unwrap();
        assert_eq!(bc, BasicConstraints { ca: true, path_len_constraint: Some(3) });
    }

    #[test]
    fn parses_basic_constraints_empty_sequence_as_non_ca() {
        let raw = hex!("3000");
        let bc = parse_basic_constraints(&raw).unwrap();
        assert_eq!(bc, BasicConstraints { ca: false, path_len_constraint: None });
    }

    #[test]
    fn rejects_wrong_outer_tag() {
        let raw = hex!("0400");
        assert!(parse_basic_constraints(&raw).is_err());
    }
}
