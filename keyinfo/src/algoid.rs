//! `AlgorithmIdentifier` parsing (§4.F `get_algorithm`).

use der::{read_header, ErrorKind, Identifier, ObjectIdentifier, Reader, Result, SliceReader, UniversalTag};

/// The `AlgorithmIdentifier.parameters` field, classified by shape.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Parameters<'a> {
    /// No `parameters` field present.
    Absent,
    /// `NULL` parameters (content length must be zero).
    Null,
    /// An `OBJECT IDENTIFIER` (named-curve parameters).
    Oid(ObjectIdentifier),
    /// A `SEQUENCE`; `bytes` is its raw content.
    Sequence(&'a [u8]),
    /// Anything else; `bytes` is its raw content.
    Other(&'a [u8]),
}

/// The value following the `AlgorithmIdentifier` SEQUENCE -- a `BIT STRING`
/// (keys and signatures) or an `OCTET STRING` (encrypted content).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Carrier<'a> {
    /// `BIT STRING` content, with the leading unused-bits octet already
    /// stripped. A non-zero unused-bits count is tolerated (every grammar
    /// this workspace decodes only ever carries byte-aligned values) rather
    /// than rejected.
    BitString(&'a [u8]),
    /// `OCTET STRING` content.
    OctetString(&'a [u8]),
}

impl<'a> Carrier<'a> {
    /// The carried bytes, regardless of which wrapper produced them.
    pub fn bytes(self) -> &'a [u8] {
        match self {
            Carrier::BitString(b) | Carrier::OctetString(b) => b,
        }
    }
}

/// A parsed `AlgorithmIdentifier`, plus whatever value followed it.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct AlgoIdent<'a> {
    /// The algorithm OID -- for `ecdsa-with-specified` (RFC 5758 §3.2) this
    /// is the OID carried *inside* the SEQUENCE parameter, per §4.F's
    /// special case, not the outer `1.2.840.10045.4.3`.
    pub oid: ObjectIdentifier,
    /// The raw `parameters` field, as originally encoded (not substituted
    /// by the `ecdsa-with-specified` special case).
    pub parameters: Parameters<'a>,
    /// The `BIT STRING`/`OCTET STRING` that followed the `AlgorithmIdentifier`
    /// SEQUENCE, if the caller asked for one to be consumed.
    pub value: Option<Carrier<'a>>,
}

const ECDSA_WITH_SPECIFIED: &str = "1.2.840.10045.4.3";

/// Parse `SEQUENCE { algorithm OBJECT IDENTIFIER, parameters ANY OPTIONAL }`
/// out of `input`, optionally followed directly by a `BIT STRING` or
/// `OCTET STRING` (`with_value`). Fails with [`ErrorKind::InvalidKeyInfo`] if
/// the SEQUENCE has leftover bytes, or [`ErrorKind::BerError`] if a `NULL`
/// parameter has nonzero length.
pub fn get_algorithm(input: &[u8], with_value: bool) -> Result<(AlgoIdent<'_>, &[u8])> {
    let mut reader = SliceReader::new(input);
    let seq_header = read_header(&mut reader, false)?;
    if seq_header.identifier != Identifier::universal(UniversalTag::Sequence) {
        return Err(ErrorKind::UnexpectedTag.into());
    }
    let seq_start = reader.position();
    let seq_end = seq_start + seq_header.length.value() as usize;
    let seq_bytes = reader.slice(seq_start, seq_end)?;

    let (oid, parameters) = parse_algorithm_content(seq_bytes)?;

    reader.seek(seq_end)?;
    let remainder = reader.slice(seq_end, input.len())?;

    if !with_value {
        return Ok((
            AlgoIdent {
                oid,
                parameters,
                value: None,
            },
            remainder,
        ));
    }

    let mut value_reader = SliceReader::new(remainder);
    let value_header = read_header(&mut value_reader, false)?;
    let value_start = value_reader.position();
    let value_end = value_start + value_header.length.value() as usize;
    let value_bytes = value_reader
        .slice(value_start, value_end)
        .map_err(|_| ErrorKind::ObjectTooShort)?;

    let carrier = if value_header.identifier == Identifier::universal(UniversalTag::BitString) {
        let (_unused_bits, bits) = value_bytes.split_first().ok_or(ErrorKind::ObjectTooShort)?;
        Carrier::BitString(bits)
    } else if value_header.identifier == Identifier::universal(UniversalTag::OctetString) {
        Carrier::OctetString(value_bytes)
    } else {
        return Err(ErrorKind::UnexpectedTag.into());
    };

    Ok((
        AlgoIdent {
            oid,
            parameters,
            value: Some(carrier),
        },
        &remainder[value_end..],
    ))
}

/// Parse `{ algorithm OBJECT IDENTIFIER, parameters ANY OPTIONAL }` directly
/// from the content bytes of an (already-stripped) `AlgorithmIdentifier`
/// SEQUENCE. Shared between [`get_algorithm`] (stripping the outer SEQUENCE
/// itself) and the PSS parameter parser, which encounters the same shape
/// nested one level deeper (RFC 4055's `MaskGenAlgorithm` parameter is
/// itself an `AlgorithmIdentifier`).
pub(crate) fn parse_algorithm_content(seq_bytes: &[u8]) -> Result<(ObjectIdentifier, Parameters<'_>)> {
    let mut inner = SliceReader::new(seq_bytes);
    let oid_header = read_header(&mut inner, false)?;
    if oid_header.identifier != Identifier::universal(UniversalTag::ObjectIdentifier) {
        return Err(ErrorKind::UnexpectedTag.into());
    }
    let oid_start = inner.position();
    let oid_len = oid_header.length.value() as usize;
    let oid_bytes = inner.slice(oid_start, oid_start + oid_len)?;
    inner.seek(oid_start + oid_len)?;
    let raw_oid = der::parse_oid_bytes(oid_bytes)?;

    let parameters = if inner.is_empty() {
        Parameters::Absent
    } else {
        parse_parameters(&mut inner)?
    };
    if !inner.is_empty() {
        return Err(ErrorKind::InvalidKeyInfo.into());
    }

    // RFC 5758 §3.2: ecdsa-with-specified carries the real digest OID
    // inside its own SEQUENCE parameter; report that OID as the effective
    // algorithm rather than the wrapper OID.
    let oid = if raw_oid == der::parse_oid_str(ECDSA_WITH_SPECIFIED)? {
        match parameters {
            Parameters::Sequence(bytes) => read_single_oid(bytes)?,
            _ => return Err(ErrorKind::InvalidKeyInfo.into()),
        }
    } else {
        raw_oid
    };

    Ok((oid, parameters))
}

fn parse_parameters<'a>(reader: &mut SliceReader<'a>) -> Result<Parameters<'a>> {
    let header = read_header(reader, false)?;
    let content_start = reader.position();
    let content_end = content_start + header.length.value() as usize;
    let content = reader
        .slice(content_start, content_end)
        .map_err(|_| ErrorKind::ObjectTooShort)?;
    reader.seek(content_end)?;

    match header.identifier {
        id if id == Identifier::universal(UniversalTag::Null) => {
            if header.length != der::Length::ZERO {
                return Err(ErrorKind::BerError.into());
            }
            Ok(Parameters::Null)
        }
        id if id == Identifier::universal(UniversalTag::ObjectIdentifier) => {
            Ok(Parameters::Oid(der::parse_oid_bytes(content)?))
        }
        id if id == Identifier::universal(UniversalTag::Sequence) => Ok(Parameters::Sequence(content)),
        _ => Ok(Parameters::Other(content)),
    }
}

fn read_single_oid(bytes: &[u8]) -> Result<ObjectIdentifier> {
    let mut reader = SliceReader::new(bytes);
    let header = read_header(&mut reader, false)?;
    if header.identifier != Identifier::universal(UniversalTag::ObjectIdentifier) {
        return Err(ErrorKind::UnexpectedTag.into());
    }
    let start = reader.position();
    let end = start + header.length.value() as usize;
    let oid_bytes = reader.slice(start, end)?;
    if end != bytes.len() {
        return Err(ErrorKind::InvalidKeyInfo.into());
    }
    der::parse_oid_bytes(oid_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn rejects_non_sequence() {
        let err = get_algorithm(&[0x02, 0x01, 0x00], false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedTag);
    }

    #[test]
    fn parses_rsa_algorithm_identifier() {
        // SEQUENCE(13) { OID(9) 1.2.840.113549.1.1.1, NULL(0) }
        let bytes = hex!("300D 0609 2a864886f70d010101 0500");
        let (ident, rest) = get_algorithm(&bytes, false).unwrap();
        assert_eq!(ident.oid, der::parse_oid_str("1.2.840.113549.1.1.1").unwrap());
        assert_eq!(ident.parameters, Parameters::Null);
        assert!(rest.is_empty());
    }

    #[test]
    fn rejects_non_zero_length_null() {
        let bytes = hex!("300F 0609 2a864886f70d010101 0502 0000");
        let err = get_algorithm(&bytes, false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BerError);
    }

    #[test]
    fn rejects_leftover_bytes_in_sequence() {
        // OID followed by NULL followed by a stray extra NULL, all inside
        // one outer SEQUENCE -- this is "leftover bytes in the SEQUENCE".
        let bytes = hex!("300F 0609 2a864886f70d010101 0500 0500");
        let err = get_algorithm(&bytes, false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidKeyInfo);
    }

    #[test]
    fn consumes_trailing_bit_string() {
        let bytes = hex!("300D 0609 2a864886f70d010101 0500 0302 0001");
        let (ident, rest) = get_algorithm(&bytes, true).unwrap();
        match ident.value {
            Some(Carrier::BitString(bits)) => assert_eq!(bits, &[0x01]),
            other => panic!("unexpected carrier: {other:?}"),
        }
        assert!(rest.is_empty());
    }
}
