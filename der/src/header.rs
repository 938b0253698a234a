//! TLV header (identifier octet + length octets) codec -- component A.

use crate::{
    length::{decode_length, encode_length},
    Class, ErrorKind, Identifier, Length, Reader, Result, TagNumber,
};

/// A decoded TLV header, with everything a caller needs to locate the value
/// bytes and, for indefinite-length constructed values, to know that the
/// length must instead be discovered by scanning for an end-of-contents
/// marker.
///
/// This is the `tag_info` record from the data model: `(class, tag,
/// is_constructed, length, indefinite, header_bytes)`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TagInfo {
    /// Decoded identifier octet.
    pub identifier: Identifier,
    /// Content length. Meaningless (zero) when `indefinite` is set.
    pub length: Length,
    /// Whether the length was encoded in the indefinite (`0x80`) form.
    pub indefinite: bool,
    /// Number of bytes the identifier + length octets occupied.
    pub header_len: u8,
}

impl TagInfo {
    /// Convenience accessor mirroring [`Identifier::class`].
    pub fn class(&self) -> Class {
        self.identifier.class
    }

    /// Convenience accessor for the tag number.
    pub fn number(&self) -> TagNumber {
        self.identifier.number
    }

    /// Whether this is a constructed encoding.
    pub fn is_constructed(&self) -> bool {
        self.identifier.constructed
    }
}

/// Read one TLV header from `src` (component A / §4.A `read_header`).
///
/// Consumes the minimal number of bytes: one identifier octet (high-tag-number
/// form is rejected, see [`Identifier::from_octet`]) followed by one or more
/// length octets. Indefinite length (`0x80`) is accepted here -- only
/// constructed values may legally carry it, which callers enforce via
/// [`allow_indefinite`](read_header#allow_indefinite) -- and the reserved
/// `0xFF` length octet is always rejected with [`ErrorKind::BerError`].
pub fn read_header<R: Reader>(src: &mut R, allow_indefinite: bool) -> Result<TagInfo> {
    let id_byte = src.read_byte()?;
    let identifier = Identifier::from_octet(id_byte)?;

    // Look ahead far enough to decode the length octets without consuming
    // more than needed; length fields here are never longer than 5 bytes
    // (1 leading + up to 4 long-form octets).
    let mut lookahead = [0u8; 5];
    let available = src.peek(&mut lookahead)?;
    let (length, indefinite, len_octets) = decode_length(&lookahead[..available])?;
    src.advance(len_octets)?;

    if indefinite {
        if !allow_indefinite {
            return Err(ErrorKind::NotDerEncoded.into());
        }
        if !identifier.constructed {
            // X.690 §8.1.3.6.1: indefinite form requires constructed encoding.
            return Err(ErrorKind::BerError.into());
        }
    }

    let header_len = 1 + len_octets;
    Ok(TagInfo {
        identifier,
        length,
        indefinite,
        header_len: header_len as u8,
    })
}

/// Number of bytes [`write_header`] would emit for `identifier` with a
/// definite content length of `content_len`, without writing anything --
/// component A's `count_header`, used by the two-pass DER length
/// computation in the keyinfo codec (component F).
pub fn count_header(identifier: Identifier, content_len: Length) -> Result<u8> {
    let _ = identifier; // identifier contributes exactly one octet regardless of value
    Ok(1 + content_len.encoded_len()?.value() as u8)
}

/// Write a definite-length DER header for `identifier`/`content_len` into
/// `out`, returning the number of bytes written -- component A's
/// `write_header`. DER never emits indefinite length, so there is no
/// "indefinite" mode here; BER indefinite-length output is not a goal of
/// this codec (§1 Non-goals).
pub fn write_header(identifier: Identifier, content_len: Length, out: &mut [u8]) -> Result<usize> {
    let needed = count_header(identifier, content_len)? as usize;
    let buf = out.get_mut(..needed).ok_or(ErrorKind::OutOfCore)?;
    buf[0] = identifier.to_octet();
    let n = encode_length(content_len, &mut buf[1..])?;
    debug_assert_eq!(1 + n, needed);
    Ok(needed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SliceReader, UniversalTag};

    #[test]
    fn count_header_matches_write_header_len() {
        for len in [0u32, 1, 0x7F, 0x80, 0xFF, 0x100, 0xFFFF, 0x1_0000] {
            let id = Identifier::universal(UniversalTag::OctetString);
            let length = Length::new(len);
            let counted = count_header(id, length).unwrap();
            let mut buf = [0u8; 8];
            let written = write_header(id, length, &mut buf).unwrap();
            assert_eq!(counted as usize, written);
        }
    }

    #[test]
    fn read_header_round_trips() {
        let id = Identifier::universal(UniversalTag::Sequence);
        let length = Length::new(300);
        let mut buf = [0u8; 8];
        let written = write_header(id, length, &mut buf).unwrap();

        let mut reader = SliceReader::new(&buf[..written]);
        let info = read_header(&mut reader, false).unwrap();
        assert_eq!(info.identifier, id);
        assert_eq!(info.length, length);
        assert!(!info.indefinite);
        assert_eq!(info.header_len as usize, written);
    }

    #[test]
    fn rejects_indefinite_when_disallowed() {
        // SEQUENCE, indefinite length.
        let bytes = [0x30, 0x80];
        let mut reader = SliceReader::new(&bytes);
        let err = read_header(&mut reader, false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotDerEncoded);
    }

    #[test]
    fn rejects_indefinite_on_primitive_tag() {
        // OCTET STRING (primitive), indefinite length: illegal even in BER.
        let bytes = [0x04, 0x80];
        let mut reader = SliceReader::new(&bytes);
        let err = read_header(&mut reader, true).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BerError);
    }

    #[test]
    fn allows_indefinite_on_constructed_tag() {
        let bytes = [0x30, 0x80];
        let mut reader = SliceReader::new(&bytes);
        let info = read_header(&mut reader, true).unwrap();
        assert!(info.indefinite);
        assert_eq!(info.header_len, 2);
    }
}
