//! RSASSA-PSS parameter parsing (RFC 4055 §3.1, §4.F "PSS parameter parse").
//!
//! ```text
//! RSASSA-PSS-params  ::=  SEQUENCE  {
//!     hashAlgorithm      [0] HashAlgorithm     DEFAULT sha1,
//!     maskGenAlgorithm   [1] MaskGenAlgorithm  DEFAULT mgf1SHA1,
//!     saltLength         [2] INTEGER           DEFAULT 20,
//!     trailerField       [3] INTEGER           DEFAULT 1  }
//! ```
//!
//! All three context tags this codec cares about are `EXPLICIT`.

use der::{read_header, Class, ErrorKind, Identifier, ObjectIdentifier, Reader, Result, SliceReader};

const MGF1_OID: &str = "1.2.840.113549.1.1.8";
const DEFAULT_HASH_OID: &str = "1.3.14.3.2.26"; // sha1
const DEFAULT_SALT_LENGTH: u32 = 20;

/// The digest and salt length a PSS parameter sequence names.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PssParams {
    /// The OID shared by both `hashAlgorithm` and the MGF1 inner hash.
    pub hash_algo: ObjectIdentifier,
    /// `saltLength`, defaulting to 20 when `[2]` is absent.
    pub salt_length: u32,
}

/// Parse an `RSASSA-PSS-params` SEQUENCE's content bytes.
///
/// Fails with [`ErrorKind::InvalidObject`] on any malformed sub-object, a
/// mask-generation OID other than MGF1, or an MGF1 inner hash that
/// disagrees with the outer `hashAlgorithm`.
pub fn parse_pss_params(content: &[u8]) -> Result<PssParams> {
    let mut reader = SliceReader::new(content);

    let mut hash_algo: Option<ObjectIdentifier> = None;
    let mut mgf_inner_hash: Option<ObjectIdentifier> = None;
    let mut salt_length = DEFAULT_SALT_LENGTH;

    while !reader.is_empty() {
        let header = read_header(&mut reader, false).map_err(|_| ErrorKind::InvalidObject)?;
        if header.class() != Class::ContextSpecific || !header.is_constructed() {
            return Err(ErrorKind::InvalidObject.into());
        }
        let start = reader.position();
        let end = start + header.length.value() as usize;
        let field = reader
            .slice(start, end)
            .map_err(|_| ErrorKind::InvalidObject)?;
        reader.seek(end).map_err(|_| ErrorKind::InvalidObject)?;

        match header.number().value() {
            0 => hash_algo = Some(parse_nested_algorithm(field)?.0),
            1 => {
                let (mgf_oid, mgf_param) = parse_nested_algorithm(field)?;
                if mgf_oid != der::parse_oid_str(MGF1_OID).map_err(|_| ErrorKind::InvalidObject)? {
                    return Err(ErrorKind::InvalidObject.into());
                }
                let mgf_param = match mgf_param {
                    crate::algoid::Parameters::Sequence(b) => b,
                    _ => return Err(ErrorKind::InvalidObject.into()),
                };
                let (inner_hash, _) =
                    crate::algoid::parse_algorithm_content(mgf_param).map_err(|_| ErrorKind::InvalidObject)?;
                mgf_inner_hash = Some(inner_hash);
            }
            2 => salt_length = parse_integer_field(field)?,
            3 => { /* trailerField: not consulted (must be the default 1, not enforced). */ }
            _ => return Err(ErrorKind::InvalidObject.into()),
        }
    }

    let default_hash = der::parse_oid_str(DEFAULT_HASH_OID).map_err(|_| ErrorKind::InvalidObject)?;
    let hash_algo = hash_algo.unwrap_or(default_hash);
    let mgf_inner_hash = mgf_inner_hash.unwrap_or(default_hash);
    if mgf_inner_hash != hash_algo {
        return Err(ErrorKind::InvalidObject.into());
    }

    Ok(PssParams {
        hash_algo,
        salt_length,
    })
}

/// Parse an `AlgorithmIdentifier` whose bytes are the `EXPLICIT` content of
/// a context tag -- i.e. a complete SEQUENCE TLV, tag included.
fn parse_nested_algorithm(explicit_content: &[u8]) -> Result<(ObjectIdentifier, crate::algoid::Parameters<'_>)> {
    let (ident, rest) =
        crate::algoid::get_algorithm(explicit_content, false).map_err(|_| ErrorKind::InvalidObject)?;
    if !rest.is_empty() {
        return Err(ErrorKind::InvalidObject.into());
    }
    Ok((ident.oid, ident.parameters))
}

/// Parse the `EXPLICIT` content of a `[2] INTEGER` field (a single INTEGER
/// TLV) into a `u32` salt length.
fn parse_integer_field(explicit_content: &[u8]) -> Result<u32> {
    let mut reader = SliceReader::new(explicit_content);
    let header = read_header(&mut reader, false).map_err(|_| ErrorKind::InvalidObject)?;
    if header.identifier != Identifier::universal(der::UniversalTag::Integer) {
        return Err(ErrorKind::InvalidObject.into());
    }
    let start = reader.position();
    let end = start + header.length.value() as usize;
    let digits = reader
        .slice(start, end)
        .map_err(|_| ErrorKind::InvalidObject)?;
    if digits.is_empty() || digits.len() > 4 || (digits[0] & 0x80) != 0 {
        return Err(ErrorKind::InvalidObject.into());
    }
    let mut value: u32 = 0;
    for &b in digits {
        value = (value << 8) | u32::from(b);
    }
    Ok(value)
}
