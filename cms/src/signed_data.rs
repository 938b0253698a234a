//! `SignedData` streaming outer walk (§4.H `parse_signed_data_part_1`/`_2`)
//! plus the supplemented `signed_attrs()` accessor.

use alloc::vec::Vec;
use asn1_schema::Schema;
use ber_decoder::Node;
use der::{read_header, ErrorKind, Identifier, ObjectIdentifier, Reader, Result, UniversalTag};

use crate::content_info::parse_content_info;
use crate::util::{
    is_context_tag, peek_identifier, read_definite_content, read_definite_header, read_version,
};

const CMS_MODULE: &str = "cms";
const SIGNER_INFOS_TYPE: &str = "CryptographicMessageSyntax.SignerInfos";

/// `version`, `digestAlgorithms`, and `encapContentInfo`'s header -- the
/// prefix of `SignedData` that precedes the (possibly huge) `eContent`
/// bytes a streaming caller wants to hash rather than buffer.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SignedDataPart1 {
    /// `CMSVersion`, restricted to `0..=4` (the range this codec accepts).
    pub version: u32,
    /// `digestAlgorithms`, each re-parsed through [`keyinfo::get_algorithm`]
    /// to recover its OID.
    pub digest_algos: Vec<ObjectIdentifier>,
    /// `encapContentInfo.eContentType`.
    pub content_type: ObjectIdentifier,
    /// `eContent`'s content length, when present and definite-length.
    pub content_len: Option<u32>,
    /// `true` when `eContent` is absent -- a detached signature, whose
    /// signed content the caller must supply from elsewhere.
    pub detached_data: bool,
}

/// Read `version`, `digestAlgorithms`, and `encapContentInfo` off `reader`,
/// halting exactly at the start of `eContent`'s content bytes (if present)
/// so the caller can stream them through a digest rather than buffer them.
///
/// `reader` must already be positioned at the start of the `SignedData`
/// SEQUENCE itself (i.e. just after [`parse_content_info`] reported
/// `has_content` for the outer `ContentInfo`).
pub fn parse_signed_data_part_1<R: Reader>(reader: &mut R) -> Result<SignedDataPart1> {
    let sd_header = read_header(reader, true)?;
    if sd_header.identifier != Identifier::universal(UniversalTag::Sequence) {
        return Err(ErrorKind::InvalidCmsObject.into());
    }

    let version = read_version(reader)?;
    if version > 4 {
        return Err(ErrorKind::UnsupportedCmsVersion.into());
    }

    let set_header = read_definite_header(reader, Identifier::universal(UniversalTag::Set))?;
    let set_bytes = read_definite_content(reader, &set_header)?;
    let mut digest_algos = Vec::new();
    let mut rest: &[u8] = &set_bytes;
    while !rest.is_empty() {
        let (ident, remainder) = keyinfo::get_algorithm(rest, false)?;
        digest_algos.push(ident.oid);
        rest = remainder;
    }

    let eci = parse_content_info(reader)?;
    let (content_len, detached_data) = if eci.has_content {
        let octet_header = read_header(reader, true)?;
        if octet_header.identifier != Identifier::universal(UniversalTag::OctetString) {
            return Err(ErrorKind::InvalidCmsObject.into());
        }
        if octet_header.indefinite {
            return Err(ErrorKind::UnsupportedEncoding.into());
        }
        (Some(octet_header.length.value()), false)
    } else {
        (None, true)
    };

    Ok(SignedDataPart1 {
        version,
        digest_algos,
        content_type: eci.content_type,
        content_len,
        detached_data,
    })
}

/// `SignedData`'s tail: certificates and `signerInfos` (a present `crls`
/// field is rejected, not represented here -- see [`parse_signed_data_part_2`]).
#[derive(Debug, Clone)]
pub struct SignedDataPart2 {
    /// Each embedded certificate, as raw DER bytes -- parse with
    /// [`x509_cert::Certificate::parse`].
    pub certificates: Vec<Vec<u8>>,
    /// The `signerInfos` `SET OF SignerInfo`'s whole TLV bytes, still
    /// DER-encoded -- decode with [`CmsContext::parse_signer_infos`].
    pub signer_infos_image: Vec<u8>,
}

/// Read the optional `[0] IMPLICIT certificates`, optional `[1] IMPLICIT
/// crls`, and required `signerInfos` fields off `reader`, which must be
/// positioned right after `eContent` (or right after `encapContentInfo`, for
/// a detached signature).
///
/// `certificates`/`crls` are `[n] IMPLICIT` over a `SET OF` whose element
/// type (`CertificateChoices`) this grammar doesn't model, so they are
/// walked by hand rather than handed to the schema decoder (which has no
/// rule to expect for them beyond a bare tag number). A present `crls`
/// field fails with [`ErrorKind::UnsupportedCmsObject`] rather than being
/// silently dropped.
pub fn parse_signed_data_part_2<R: Reader>(reader: &mut R) -> Result<SignedDataPart2> {
    let certificates = read_optional_certificates(reader)?;
    reject_crls(reader)?;

    let signer_infos_header = read_definite_header(reader, Identifier::universal(UniversalTag::Set))?;
    let content = read_definite_content(reader, &signer_infos_header)?;
    let mut signer_infos_image = Vec::with_capacity(content.len() + 4);
    let mut hdr_buf = [0u8; 8];
    let hdr_len = der::write_header(signer_infos_header.identifier, signer_infos_header.length, &mut hdr_buf)?;
    signer_infos_image.extend_from_slice(&hdr_buf[..hdr_len]);
    signer_infos_image.extend_from_slice(&content);

    Ok(SignedDataPart2 { certificates, signer_infos_image })
}

fn read_optional_certificates<R: Reader>(reader: &mut R) -> Result<Vec<Vec<u8>>> {
    match peek_identifier(reader)? {
        Some(id) if is_context_tag(id, 0) => {
            let header = read_header(reader, true)?;
            if header.indefinite {
                return Err(ErrorKind::UnsupportedEncoding.into());
            }
            let content = read_definite_content(reader, &header)?;
            split_certificates(&content)
        }
        _ => Ok(Vec::new()),
    }
}

/// Reject a present `crls` (`[1] IMPLICIT`) field rather than silently
/// skipping it -- CRL parsing is out of scope, and a verifier that never
/// sees the CRLs a signer bundled shouldn't be handed a `SignedData` as if
/// they weren't there.
fn reject_crls<R: Reader>(reader: &mut R) -> Result<()> {
    match peek_identifier(reader)? {
        Some(id) if is_context_tag(id, 1) => Err(ErrorKind::UnsupportedCmsObject.into()),
        _ => Ok(()),
    }
}

/// Split `certificates`'s `SET OF Certificate` content into each member's
/// whole DER encoding by walking top-level TLVs.
fn split_certificates(content: &[u8]) -> Result<Vec<Vec<u8>>> {
    let mut certs = Vec::new();
    let mut reader = der::SliceReader::new(content);
    while !reader.is_empty() {
        let start = reader.position();
        let header = read_header(&mut reader, true)?;
        if header.identifier != Identifier::universal(UniversalTag::Sequence) {
            return Err(ErrorKind::InvalidCmsObject.into());
        }
        let body_start = reader.position();
        let end = if header.indefinite {
            return Err(ErrorKind::UnsupportedEncoding.into());
        } else {
            body_start + usize::try_from(header.length.value()).map_err(|_| ErrorKind::ObjectTooLarge)?
        };
        let whole = reader.slice(start, end)?;
        certs.push(whole.to_vec());
        reader.seek(end)?;
    }
    Ok(certs)
}

/// A decoded `signerInfos` `SET OF SignerInfo`, ready for the supplemented
/// per-signer accessor.
#[derive(Debug, Clone)]
pub struct CmsContext<'i> {
    image: &'i [u8],
    signer_infos: Node<'i>,
}

/// One signer's `digestAlgorithm`/`signedAttrs`/`signature`, the fields a
/// verifier actually recomputes the hash and checks the signature over.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SignedAttrs<'i> {
    /// `digestAlgorithm.algorithm`.
    pub digest_algorithm: ObjectIdentifier,
    /// `signedAttrs`'s content bytes (the encoded `SET OF Attribute`
    /// elements, without the `[0]` tag/length), when present. RFC 5652 §5.4:
    /// when present, this -- not `eContent` -- is what `signature` actually
    /// covers.
    pub signed_attrs: Option<&'i [u8]>,
    /// `signature`.
    pub signature: &'i [u8],
}

impl<'i> CmsContext<'i> {
    /// Decode `image` (a [`SignedDataPart2::signer_infos_image`]) as
    /// `CryptographicMessageSyntax.SignerInfos`.
    pub fn parse_signer_infos(schema: &Schema, image: &'i [u8]) -> Result<Self> {
        let signer_infos = ber_decoder::decode(schema, CMS_MODULE, SIGNER_INFOS_TYPE, image)?;
        Ok(CmsContext { image, signer_infos })
    }

    /// Number of signers.
    pub fn signer_count(&self) -> usize {
        self.signer_infos.len()
    }

    /// The `index`th signer's `digestAlgorithm`/`signedAttrs`/`signature`.
    pub fn signed_attrs(&self, index: usize) -> Result<SignedAttrs<'i>> {
        let signer = self
            .signer_infos
            .find(&alloc::format!("{index}"))
            .ok_or(ErrorKind::InvalidCmsObject)?;
        let digest_algo_node = signer.child("digestAlgorithm").ok_or(ErrorKind::InvalidCmsObject)?;
        let algo_oid_node = digest_algo_node.child("algorithm").ok_or(ErrorKind::InvalidCmsObject)?;
        let digest_algorithm = der::parse_oid_bytes(algo_oid_node.value)?;
        let signed_attrs = signer.child("signedAttrs").map(|n| n.value);
        let signature = signer.child("signature").ok_or(ErrorKind::InvalidCmsObject)?.value;
        Ok(SignedAttrs { digest_algorithm, signed_attrs, signature })
    }

    /// The image this context was decoded from.
    pub fn image(&self) -> &'i [u8] {
        self.image
    }
}
