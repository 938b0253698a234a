//! Shared DER element codec for the value/parameter fields of a key,
//! signature or encrypted-value `BIT STRING`/`OCTET STRING` (§4.F steps 4-6).

use alloc::{vec, vec::Vec};
use algo_tables::{PkAlgo, ValueShape};
use der::{
    count_header, read_header, write_header, ErrorKind, Identifier, Length, Reader, Result,
    SliceReader, UniversalTag,
};

use crate::sexp::Sexp;

/// Find the `(name value)` child of `items` and return `value`'s atom bytes.
pub(crate) fn field<'a>(items: &'a [Sexp], name: &str) -> Result<&'a [u8]> {
    let item = items
        .iter()
        .find(|it| it.tagged_parts().map(|(n, _)| n == name).unwrap_or(false))
        .ok_or(ErrorKind::UnknownSexp)?;
    let (_, rest) = item.tagged_parts()?;
    rest.first().ok_or(ErrorKind::InvalidSexp)?.as_atom()
}

fn read_tlv<'a>(reader: &mut SliceReader<'a>, tag: UniversalTag) -> Result<&'a [u8]> {
    let header = read_header(reader, false)?;
    if header.identifier != Identifier::universal(tag) {
        return Err(ErrorKind::UnexpectedTag.into());
    }
    let start = reader.position();
    let end = start + header.length.value() as usize;
    let bytes = reader.slice(start, end)?;
    reader.seek(end)?;
    Ok(bytes)
}

/// Read one `INTEGER` TLV's content from `reader`.
pub(crate) fn read_integer<'a>(reader: &mut SliceReader<'a>) -> Result<&'a [u8]> {
    read_tlv(reader, UniversalTag::Integer)
}

/// Read one `SEQUENCE` TLV's content from `reader`.
pub(crate) fn read_sequence<'a>(reader: &mut SliceReader<'a>) -> Result<&'a [u8]> {
    read_tlv(reader, UniversalTag::Sequence)
}

/// Write one TLV via the two-pass `count_header`/`write_header` discipline.
pub(crate) fn wrap_tlv(identifier: Identifier, content: &[u8]) -> Result<Vec<u8>> {
    let len = Length::try_from(content.len())?;
    let header_len = count_header(identifier, len)? as usize;
    let mut out = vec![0u8; header_len];
    write_header(identifier, len, &mut out)?;
    out.extend_from_slice(content);
    Ok(out)
}

pub(crate) fn encode_integer(value: &[u8]) -> Result<Vec<u8>> {
    wrap_tlv(Identifier::universal(UniversalTag::Integer), value)
}

pub(crate) fn encode_sequence(content: &[u8]) -> Result<Vec<u8>> {
    wrap_tlv(Identifier::universal(UniversalTag::Sequence), content)
}

/// Decode a value `BIT STRING`/`OCTET STRING` content according to `shape`
/// into `(<param> <mpi>)` items (§4.F step 6).
pub(crate) fn decode_value(shape: ValueShape, raw: &[u8]) -> Result<Vec<Sexp>> {
    match shape {
        ValueShape::Raw(name) => Ok(vec![Sexp::tagged(name, vec![Sexp::atom(raw)])]),
        ValueShape::Integer(name) => {
            let mut reader = SliceReader::new(raw);
            let value = read_integer(&mut reader)?;
            if !reader.is_empty() {
                return Err(ErrorKind::InvalidKeyInfo.into());
            }
            Ok(vec![Sexp::tagged(name, vec![Sexp::atom(value)])])
        }
        ValueShape::IntegerSequence(names) => {
            let mut reader = SliceReader::new(raw);
            let seq = read_sequence(&mut reader)?;
            if !reader.is_empty() {
                return Err(ErrorKind::InvalidKeyInfo.into());
            }
            let mut seq_reader = SliceReader::new(seq);
            let mut items = Vec::new();
            for name in names {
                let value = read_integer(&mut seq_reader)?;
                items.push(Sexp::tagged(name, vec![Sexp::atom(value)]));
            }
            if !seq_reader.is_empty() {
                return Err(ErrorKind::InvalidKeyInfo.into());
            }
            Ok(items)
        }
    }
}

/// Encode `(<param> <mpi>)` items back into a value `BIT STRING`/`OCTET
/// STRING` content buffer, per `shape` (§4.F step 5).
pub(crate) fn encode_value(shape: ValueShape, items: &[Sexp]) -> Result<Vec<u8>> {
    match shape {
        ValueShape::Raw(name) => Ok(field(items, name)?.to_vec()),
        ValueShape::Integer(name) => encode_integer(field(items, name)?),
        ValueShape::IntegerSequence(names) => {
            let mut content = Vec::new();
            for name in names {
                content.extend(encode_integer(field(items, name)?)?);
            }
            encode_sequence(&content)
        }
    }
}

/// The encrypted-value layout for a key-transport/agreement algorithm --
/// distinct from [`algo_tables::PkAlgoEntry::value_shape`], which describes
/// the *public key's* `SubjectPublicKeyInfo` layout (RSA's `n,e` pair), not
/// the shape of a ciphertext produced under that key.
pub(crate) fn enc_value_shape(pk_algo: PkAlgo) -> ValueShape {
    match pk_algo {
        PkAlgo::Rsa | PkAlgo::Dsa => ValueShape::Raw("a"),
        PkAlgo::Ecc => ValueShape::Raw("e"),
    }
}

/// Encode a `u32` as a minimal big-endian byte string, the same convention
/// DER `INTEGER` content uses for non-negative values (a lone `0x00` for
/// zero, no superfluous leading zero bytes otherwise).
pub(crate) fn encode_u32(value: u32) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let first_nonzero = bytes.iter().position(|&b| b != 0).unwrap_or(3);
    bytes[first_nonzero..].to_vec()
}

/// Decode a minimal big-endian byte string produced by [`encode_u32`].
pub(crate) fn decode_u32(bytes: &[u8]) -> Result<u32> {
    if bytes.is_empty() || bytes.len() > 4 {
        return Err(ErrorKind::InvalidSexp.into());
    }
    let mut value = 0u32;
    for &b in bytes {
        value = (value << 8) | u32::from(b);
    }
    Ok(value)
}
