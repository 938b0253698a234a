//! `EnvelopedData` streaming outer walk (§4.H `parse_enveloped_data_part_1`).

use alloc::vec::Vec;
use der::{read_header, ErrorKind, Identifier, ObjectIdentifier, Reader, Result, UniversalTag};
use keyinfo::Parameters;

use crate::util::{
    is_context_tag, peek_identifier, read_definite_content, read_definite_header, read_version, read_whole_tlv,
};

/// `version` through `encryptedContentInfo`'s algorithm and IV, halting
/// right before the (possibly huge) `encryptedContent` ciphertext so a
/// streaming caller can decrypt it in place rather than buffer it.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct EnvelopedDataPart1 {
    /// `CMSVersion`.
    pub version: u32,
    /// `recipientInfos`' whole `SET OF RecipientInfo` TLV bytes, still
    /// DER-encoded -- decode with `ber_decoder::decode` against
    /// `CryptographicMessageSyntax.RecipientInfos`.
    pub recipient_infos_image: Vec<u8>,
    /// `encryptedContentInfo.contentType`.
    pub content_type: ObjectIdentifier,
    /// `encryptedContentInfo.contentEncryptionAlgorithm.algorithm`.
    pub content_encryption_algo: ObjectIdentifier,
    /// The content-encryption algorithm's parameters, when they carry an
    /// initialization vector (an `OCTET STRING` parameter) -- the common
    /// case for CBC-mode algorithms.
    pub content_encryption_iv: Option<Vec<u8>>,
    /// `encryptedContent`'s content length, when present and definite-length.
    pub encrypted_content_len: Option<u32>,
    /// `true` when `encryptedContent` is absent.
    pub has_encrypted_content: bool,
}

/// Read `version` through `encryptedContentInfo`'s header off `reader`,
/// halting exactly at the start of `encryptedContent`'s content bytes (if
/// present).
///
/// `reader` must already be positioned at the start of the `EnvelopedData`
/// SEQUENCE itself (i.e. just after [`crate::parse_content_info`] reported
/// `has_content` for the outer `ContentInfo`).
///
/// `originatorInfo` (`[0] IMPLICIT ANY OPTIONAL`) is rejected rather than
/// skipped: it carries certificates/CRLs this codec has no model for, and
/// silently dropping it would let a verifier miss material the sender
/// intended to ship alongside the recipients.
pub fn parse_enveloped_data_part_1<R: Reader>(reader: &mut R) -> Result<EnvelopedDataPart1> {
    let ed_header = read_header(reader, true)?;
    if ed_header.identifier != Identifier::universal(UniversalTag::Sequence) {
        return Err(ErrorKind::InvalidCmsObject.into());
    }

    let version = read_version(reader)?;
    if version > 4 {
        return Err(ErrorKind::UnsupportedCmsVersion.into());
    }

    if let Some(id) = peek_identifier(reader)? {
        if is_context_tag(id, 0) {
            return Err(ErrorKind::UnsupportedCmsObject.into());
        }
    }

    let recipients_header = read_definite_header(reader, Identifier::universal(UniversalTag::Set))?;
    let recipients_content = read_definite_content(reader, &recipients_header)?;
    let mut recipient_infos_image = Vec::with_capacity(recipients_content.len() + 4);
    let mut hdr_buf = [0u8; 8];
    let hdr_len = der::write_header(recipients_header.identifier, recipients_header.length, &mut hdr_buf)?;
    recipient_infos_image.extend_from_slice(&hdr_buf[..hdr_len]);
    recipient_infos_image.extend_from_slice(&recipients_content);

    // `EncryptedContentInfo`'s own header, not its content: `encryptedContent`
    // can be arbitrarily large, so every field up to it is read directly off
    // `reader` rather than buffered as one block.
    let _eci_header = read_definite_header(reader, Identifier::universal(UniversalTag::Sequence))?;

    let type_header = read_header(reader, false)?;
    if type_header.identifier != Identifier::universal(UniversalTag::ObjectIdentifier) {
        return Err(ErrorKind::InvalidCmsObject.into());
    }
    let type_len = usize::try_from(type_header.length.value()).map_err(|_| ErrorKind::ObjectTooLarge)?;
    let mut type_bytes = alloc::vec![0u8; type_len];
    reader.read_exact(&mut type_bytes)?;
    let content_type = der::parse_oid_bytes(&type_bytes)?;

    // `contentEncryptionAlgorithm` is bounded (an OID plus a handful of
    // parameter bytes), unlike `encryptedContent` -- buffering its whole TLV
    // to hand to `keyinfo::get_algorithm` is fine.
    let algo_tlv = read_whole_tlv(reader, Identifier::universal(UniversalTag::Sequence))?;
    let (algo_ident, _) = keyinfo::get_algorithm(&algo_tlv, false)?;
    let content_encryption_algo = algo_ident.oid;
    let content_encryption_iv = match algo_ident.parameters {
        Parameters::Other(bytes) => Some(bytes.to_vec()),
        _ => None,
    };

    let (encrypted_content_len, has_encrypted_content) = match peek_identifier(reader)? {
        Some(id) if is_context_tag(id, 0) => {
            let ec_header = read_header(reader, true)?;
            if ec_header.indefinite {
                return Err(ErrorKind::UnsupportedEncoding.into());
            }
            (Some(ec_header.length.value()), true)
        }
        _ => (None, false),
    };

    Ok(EnvelopedDataPart1 {
        version,
        recipient_infos_image,
        content_type,
        content_encryption_algo,
        content_encryption_iv,
        encrypted_content_len,
        has_encrypted_content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use der::SliceReader;
    use hex_literal::hex;

    fn wrap(tag: u8, content: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(content.len() + 4);
        out.push(tag);
        if content.len() < 0x80 {
            out.push(content.len() as u8);
        } else {
            out.push(0x81);
            out.push(content.len() as u8);
        }
        out.extend_from_slice(content);
        out
    }

    // One `ktri KeyTransRecipientInfo`: version, rid (placeholder ANY),
    // keyEncryptionAlgorithm (rsaEncryption/NULL), encryptedKey.
    fn sample_recipient_info() -> Vec<u8> {
        let rid = hex!("3000");
        let key_enc_algo = wrap(0x30, &hex!("0609 2a864886f70d010101 0500"));
        let encrypted_key = wrap(0x04, &hex!("aa"));
        let mut content = Vec::new();
        content.extend_from_slice(&hex!("020100"));
        content.extend_from_slice(&rid);
        content.extend_from_slice(&key_enc_algo);
        content.extend_from_slice(&encrypted_key);
        wrap(0x30, &content)
    }

    fn sample_enveloped_data(with_content: bool) -> Vec<u8> {
        let recipient_infos = wrap(0x31, &sample_recipient_info());

        // aes128-CBC (2.16.840.1.101.3.4.1.2) AlgorithmIdentifier with an
        // OCTET STRING IV parameter.
        let content_type = hex!("0609 2a864886f70d010701"); // id-data
        let cea_oid = hex!("0609 608648016503040102");
        let iv = wrap(0x04, &hex!("000102030405060708090a0b0c0d0e0f"));
        let cea = wrap(0x30, &{
            let mut c = Vec::new();
            c.extend_from_slice(&cea_oid);
            c.extend_from_slice(&iv);
            c
        });

        let mut eci_content = Vec::new();
        eci_content.extend_from_slice(&content_type);
        eci_content.extend_from_slice(&cea);
        if with_content {
            eci_content.extend_from_slice(&wrap(0x80, &hex!("deadbeef")));
        }
        let eci = wrap(0x30, &eci_content);

        let mut content = Vec::new();
        content.extend_from_slice(&hex!("020100"));
        content.extend_from_slice(&recipient_infos);
        content.extend_from_slice(&eci);
        wrap(0x30, &content)
    }

    #[test]
    fn reads_recipient_infos_and_content_encryption_iv() {
        let bytes = sample_enveloped_data(true);
        let mut reader = SliceReader::new(&bytes);
        let part1 = parse_enveloped_data_part_1(&mut reader).unwrap();
        assert_eq!(part1.version, 0);
        assert_eq!(part1.content_type, der::parse_oid_str("1.2.840.113549.1.7.1").unwrap());
        assert_eq!(
            part1.content_encryption_algo,
            der::parse_oid_str("2.16.840.1.101.3.4.1.2").unwrap()
        );
        assert_eq!(
            part1.content_encryption_iv.as_deref(),
            Some(&hex!("000102030405060708090a0b0c0d0e0f")[..])
        );
        assert!(part1.has_encrypted_content);
        assert_eq!(part1.encrypted_content_len, Some(4));
        assert_eq!(reader.remaining(), &hex!("deadbeef")[..]);
    }

    #[test]
    fn reports_absent_encrypted_content() {
        let bytes = sample_enveloped_data(false);
        let mut reader = SliceReader::new(&bytes);
        let part1 = parse_enveloped_data_part_1(&mut reader).unwrap();
        assert!(!part1.has_encrypted_content);
        assert_eq!(part1.encrypted_content_len, None);
    }

    #[test]
    fn rejects_originator_info() {
        let originator = wrap(0xA0, &hex!("3000"));
        let recipient_infos = wrap(0x31, &sample_recipient_info());
        let mut content = Vec::new();
        content.extend_from_slice(&hex!("020100"));
        content.extend_from_slice(&originator);
        content.extend_from_slice(&recipient_infos);
        let bytes = wrap(0x30, &content);
        let mut reader = SliceReader::new(&bytes);
        let err = parse_enveloped_data_part_1(&mut reader).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedCmsObject);
    }
}
