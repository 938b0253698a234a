//! `ContentInfo` / `EncapsulatedContentInfo` outer shape: both are
//! `SEQUENCE { OID, [0] EXPLICIT content OPTIONAL }`, so one streaming reader
//! serves both (§4.H `parse_content_info`).

use der::{read_header, ErrorKind, Identifier, ObjectIdentifier, Reader, Result, UniversalTag};

use crate::util::{is_context_tag, peek_identifier};

/// The outer `SEQUENCE { OID, [0] EXPLICIT content OPTIONAL }` shape, stopped
/// right at the start of `content`'s own TLV (if present) so the caller can
/// decide how much of it to read.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ContentInfoHeader {
    /// `contentType`/`eContentType`.
    pub content_type: ObjectIdentifier,
    /// Content length, when the `[0]` wrapper used definite-length form.
    pub inner_length: Option<u32>,
    /// Whether the `[0]` wrapper used indefinite-length (BER-only) form.
    pub indefinite: bool,
    /// Whether a `[0]` field is present at all.
    pub has_content: bool,
}

/// Read `SEQUENCE { OID, [0] EXPLICIT content OPTIONAL }` off `reader`.
///
/// Used both as the outermost `ContentInfo` parse and for
/// `EncapsulatedContentInfo`. On success with `has_content`, `reader` is
/// positioned exactly at the first octet of `content`'s own TLV (its
/// identifier byte) -- the `[0]` wrapper's header has been consumed but not
/// its value.
///
/// Any BER-layer failure here (malformed header, a length that runs past
/// available input) is reported as [`ErrorKind::NoCmsObject`]: at this
/// outermost point we cannot yet distinguish "not CMS" from "damaged CMS".
pub fn parse_content_info<R: Reader>(reader: &mut R) -> Result<ContentInfoHeader> {
    parse_content_info_inner(reader).map_err(to_no_cms_object)
}

fn parse_content_info_inner<R: Reader>(reader: &mut R) -> Result<ContentInfoHeader> {
    let outer = read_header(reader, true)?;
    if outer.identifier != Identifier::universal(UniversalTag::Sequence) {
        return Err(ErrorKind::InvalidCmsObject.into());
    }

    let oid_header = read_header(reader, false)?;
    if oid_header.identifier != Identifier::universal(UniversalTag::ObjectIdentifier) {
        return Err(ErrorKind::InvalidCmsObject.into());
    }
    let oid_len = usize::try_from(oid_header.length.value()).map_err(|_| ErrorKind::ObjectTooLarge)?;
    let mut oid_buf = alloc::vec![0u8; oid_len];
    reader.read_exact(&mut oid_buf)?;
    let content_type = der::parse_oid_bytes(&oid_buf)?;

    let next = peek_identifier(reader)?;
    let wrapper_present = matches!(next, Some(id) if is_context_tag(id, 0));

    if !wrapper_present {
        return Ok(ContentInfoHeader {
            content_type,
            inner_length: None,
            indefinite: false,
            has_content: false,
        });
    }

    let wrapper = read_header(reader, true)?;
    Ok(ContentInfoHeader {
        content_type,
        inner_length: if wrapper.indefinite { None } else { Some(wrapper.length.value()) },
        indefinite: wrapper.indefinite,
        has_content: true,
    })
}

fn to_no_cms_object(err: der::Error) -> der::Error {
    match err.kind() {
        ErrorKind::BerError | ErrorKind::InvalidCmsObject | ErrorKind::ObjectTooShort => {
            ErrorKind::NoCmsObject.into()
        }
        _ => err,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use der::SliceReader;
    use hex_literal::hex;

    #[test]
    fn reads_content_type_and_halts_before_wrapped_content() {
        // ContentInfo { OID 1.2.840.113549.1.7.2, [0] EXPLICIT INTEGER 0x12 }
        let bytes = hex!("3010 0609 2a864886f70d010702 a003 020112");
        let mut reader = SliceReader::new(&bytes);
        let header = parse_content_info(&mut reader).unwrap();
        assert_eq!(header.content_type, der::parse_oid_str("1.2.840.113549.1.7.2").unwrap());
        assert!(header.has_content);
        assert_eq!(header.inner_length, Some(3));
        // Positioned at the inner INTEGER's own tag.
        assert_eq!(reader.remaining(), &hex!("020112")[..]);
    }

    #[test]
    fn reports_absent_content_when_no_zero_wrapper() {
        let bytes = hex!("300B 0609 2a864886f70d010701");
        let mut reader = SliceReader::new(&bytes);
        let header = parse_content_info(&mut reader).unwrap();
        assert!(!header.has_content);
        assert_eq!(header.inner_length, None);
    }

    #[test]
    fn rejects_non_sequence_outer_tag() {
        let bytes = hex!("0400");
        let mut reader = SliceReader::new(&bytes);
        let err = parse_content_info(&mut reader).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoCmsObject);
    }
}
