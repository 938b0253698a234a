//! Shared streaming TLV helpers used by both the `SignedData` and
//! `EnvelopedData` outer walks.

use alloc::vec::Vec;
use der::{read_header, write_header, ErrorKind, Identifier, Reader, Result, TagInfo, UniversalTag};

/// Read a definite-length `INTEGER` and interpret it as a small non-negative
/// version number. Rejects multi-byte encodings -- every `CMSVersion` this
/// crate accepts (0..=4) fits in one content octet.
pub(crate) fn read_version<R: Reader>(reader: &mut R) -> Result<u32> {
    let header = read_header(reader, false)?;
    if header.identifier != Identifier::universal(UniversalTag::Integer) {
        return Err(ErrorKind::InvalidCmsObject.into());
    }
    if header.length.value() != 1 {
        return Err(ErrorKind::UnsupportedCmsVersion.into());
    }
    let byte = reader.read_byte()?;
    if byte & 0x80 != 0 {
        return Err(ErrorKind::UnsupportedCmsVersion.into());
    }
    Ok(u32::from(byte))
}

/// Read a definite-length constructed value's header, rejecting indefinite
/// length (every SET/SEQUENCE this crate captures whole into memory must be
/// definite-length -- the potentially-unbounded content lives in `eContent`/
/// `encryptedContent`, which are handled separately by halting before them).
pub(crate) fn read_definite_header<R: Reader>(reader: &mut R, expect: Identifier) -> Result<TagInfo> {
    let header = read_header(reader, true)?;
    if header.identifier != expect {
        return Err(ErrorKind::InvalidCmsObject.into());
    }
    if header.indefinite {
        return Err(ErrorKind::UnsupportedEncoding.into());
    }
    Ok(header)
}

/// Read a definite-length constructed value's full content into an owned
/// buffer.
pub(crate) fn read_definite_content<R: Reader>(reader: &mut R, header: &TagInfo) -> Result<Vec<u8>> {
    let len = usize::try_from(header.length.value()).map_err(|_| ErrorKind::ObjectTooLarge)?;
    let mut buf = alloc::vec![0u8; len];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

/// Read a definite-length TLV's header and content, then re-attach a freshly
/// written header so the whole TLV can be handed to a byte-oriented parser
/// (`ber_decoder::decode`, `keyinfo::get_algorithm`) that expects to see the
/// tag itself, not just its content.
pub(crate) fn read_whole_tlv<R: Reader>(reader: &mut R, expect: Identifier) -> Result<Vec<u8>> {
    let header = read_definite_header(reader, expect)?;
    let content = read_definite_content(reader, &header)?;
    reattach_header(header, &content)
}

fn reattach_header(header: TagInfo, content: &[u8]) -> Result<Vec<u8>> {
    let mut hdr_buf = [0u8; 8];
    let hdr_len = write_header(header.identifier, header.length, &mut hdr_buf)?;
    let mut out = Vec::with_capacity(hdr_len + content.len());
    out.extend_from_slice(&hdr_buf[..hdr_len]);
    out.extend_from_slice(content);
    Ok(out)
}

/// Peek the next identifier octet, if any is available.
pub(crate) fn peek_identifier<R: Reader>(reader: &mut R) -> Result<Option<Identifier>> {
    let mut byte = [0u8; 1];
    let n = reader.peek(&mut byte)?;
    if n == 0 {
        return Ok(None);
    }
    Ok(Some(Identifier::from_octet(byte[0])?))
}

/// `true` if `identifier` is `CONTEXT-SPECIFIC` with the given tag number,
/// regardless of its constructed bit -- `[n] IMPLICIT` fields substitute
/// whatever constructedness their underlying type has, so a field's presence
/// is decided by class and number alone, not by guessing a bit we have no
/// grammar for (see the `cms` crate's top-level docs).
pub(crate) fn is_context_tag(identifier: Identifier, number: u8) -> bool {
    identifier.class == der::Class::ContextSpecific && identifier.number.value() == number
}
