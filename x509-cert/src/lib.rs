//! X.509 certificate facade (§4.G): applies the schema-driven BER decoder to
//! the `Certificate` grammar and exposes the fields a verifier or inspector
//! actually wants, without generating a Rust type for the whole ASN.1 tree.

#![no_std]
#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

extern crate alloc;

mod extensions;
mod name;
mod time;

use alloc::string::String;
use asn1_schema::{default_schema, Schema};
use ber_decoder::Node;
use der::{ErrorKind, Result};
use keyinfo::{cryptval_to_sexp, keyinfo_to_sexp, CryptValKind, Sexp};

pub use crate::extensions::{BasicConstraints, ExtensionEntry, KeyUsage};

/// Which TLV region [`Certificate::hash`] should feed to its sink.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum HashRegion {
    /// The entire `Certificate` SEQUENCE, header included.
    Whole,
    /// Just the `tbsCertificate` SEQUENCE (what the signature actually
    /// covers).
    Tbs,
}

/// Which `Validity` bound [`Certificate::validity`] should read.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ValidityBound {
    /// `notBefore`.
    NotBefore,
    /// `notAfter`.
    NotAfter,
}

/// A decoded X.509 certificate: a node tree over a captured image (§4.D),
/// specialised to the RFC 5280 `Certificate` grammar.
#[derive(Debug, Clone)]
pub struct Certificate<'i> {
    image: &'i [u8],
    root: Node<'i>,
}

impl<'i> Certificate<'i> {
    /// Parse `image` as a single DER-encoded `Certificate`, failing if any
    /// bytes are left over.
    pub fn parse(image: &'i [u8]) -> Result<Self> {
        let schema = default_schema()?;
        Self::parse_with_schema(&schema, image)
    }

    /// Parse `image` against an already-loaded schema, avoiding re-parsing
    /// the built-in grammar text for every certificate in a batch.
    pub fn parse_with_schema(schema: &Schema, image: &'i [u8]) -> Result<Self> {
        let root = ber_decoder::decode(schema, "tmttv2", "Certificate", image)?;
        Ok(Certificate { image, root })
    }

    /// The captured encoding, in its entirety.
    pub fn image(&self) -> &'i [u8] {
        self.image
    }

    /// Feed the chosen region's exact TLV byte range -- header and content,
    /// nothing more or less -- to `sink`.
    pub fn hash<F: FnMut(&[u8])>(&self, region: HashRegion, mut sink: F) {
        let node = match region {
            HashRegion::Whole => &self.root,
            HashRegion::Tbs => self
                .root
                .child("tbsCertificate")
                .expect("tbsCertificate is a required Certificate field"),
        };
        sink(tlv_bytes(self.image, node));
    }

    /// Maps `signatureAlgorithm.algorithm` through the signature algorithm
    /// table's `digest_hint`, returning `None` when the algorithm is
    /// unrecognised or names no fixed digest (PSS, EdDSA, `ecdsa-with-
    /// specified`).
    pub fn digest_algo(&self) -> Option<&'static str> {
        let sig_algo = self.signature_algorithm_node()?;
        let oid = der::parse_oid_bytes(sig_algo.child("algorithm")?.value).ok()?;
        let entry = algo_tables::lookup(algo_tables::sig_algo_table(), oid).ok()?;
        entry.digest_hint
    }

    /// `serialNumber`, as a 4-byte big-endian length prefix followed by the
    /// raw two's-complement `INTEGER` content bytes.
    pub fn serial(&self) -> Result<alloc::vec::Vec<u8>> {
        let raw = self
            .root
            .find("tbsCertificate.serialNumber")
            .ok_or(ErrorKind::InvalidObject)?
            .value;
        let len = u32::try_from(raw.len()).map_err(|_| ErrorKind::ObjectTooLarge)?;
        let mut out = alloc::vec::Vec::with_capacity(4 + raw.len());
        out.extend_from_slice(&len.to_be_bytes());
        out.extend_from_slice(raw);
        Ok(out)
    }

    /// `tbsCertificate.issuer`, in RFC 2253 string form.
    pub fn issuer(&self) -> Result<String> {
        let node = self
            .root
            .find("tbsCertificate.issuer")
            .ok_or(ErrorKind::InvalidObject)?;
        name::to_rfc2253(node)
    }

    /// `tbsCertificate.subject`, in RFC 2253 string form.
    pub fn subject(&self) -> Result<String> {
        let node = self
            .root
            .find("tbsCertificate.subject")
            .ok_or(ErrorKind::InvalidObject)?;
        name::to_rfc2253(node)
    }

    /// `tbsCertificate.validity`'s chosen bound, as seconds since the Unix
    /// epoch.
    pub fn validity(&self, which: ValidityBound) -> Result<i64> {
        let field = match which {
            ValidityBound::NotBefore => "notBefore",
            ValidityBound::NotAfter => "notAfter",
        };
        let time_node = self
            .root
            .find(&alloc::format!("tbsCertificate.validity.{field}"))
            .ok_or(ErrorKind::InvalidObject)?;
        let (tag, leaf) = time_node
            .children
            .first()
            .ok_or(ErrorKind::InvalidObject)?;
        time::to_epoch_secs(tag, leaf.value)
    }

    /// `tbsCertificate.subjectPublicKeyInfo`, converted to its symbolic
    /// `(public-key ...)` form (§4.F).
    pub fn public_key(&self) -> Result<Sexp> {
        let node = self
            .root
            .find("tbsCertificate.subjectPublicKeyInfo")
            .ok_or(ErrorKind::InvalidObject)?;
        keyinfo_to_sexp(tlv_bytes(self.image, node))
    }

    /// The concatenation of `signatureAlgorithm` and `signatureValue`,
    /// converted to its symbolic `(sig-val ...)` form (§4.F). The two fields
    /// are adjacent siblings of the `Certificate` SEQUENCE, so their TLV
    /// spans are contiguous in the image and need no copying to concatenate.
    pub fn sig_val(&self) -> Result<Sexp> {
        let algo = self
            .root
            .child("signatureAlgorithm")
            .ok_or(ErrorKind::InvalidObject)?;
        let value = self
            .root
            .child("signatureValue")
            .ok_or(ErrorKind::InvalidObject)?;
        let start = algo.offset;
        let end = value.offset + value.tag_info.header_len as usize + value.value.len();
        let span = self
            .image
            .get(start..end)
            .ok_or(ErrorKind::ObjectTooShort)?;
        cryptval_to_sexp(span, CryptValKind::SigVal)
    }

    fn signature_algorithm_node(&self) -> Option<&Node<'i>> {
        self.root.child("signatureAlgorithm")
    }

    /// `tbsCertificate.extensions`, or an empty list when the field is
    /// absent (it's `OPTIONAL` in the grammar).
    pub fn extensions(&self) -> Result<alloc::vec::Vec<ExtensionEntry<'i>>> {
        match self.root.find("tbsCertificate.extensions") {
            Some(node) => extensions::list(node),
            None => Ok(alloc::vec::Vec::new()),
        }
    }

    /// The `id-ce-keyUsage` (2.5.29.15) extension, decoded, or `None` when
    /// the certificate carries no such extension.
    pub fn key_usage(&self) -> Result<Option<KeyUsage>> {
        let entries = self.extensions()?;
        match extensions::find_value(&entries, extensions::KEY_USAGE_OID) {
            Some(raw) => Ok(Some(extensions::parse_key_usage(raw)?)),
            None => Ok(None),
        }
    }

    /// The `id-ce-basicConstraints` (2.5.29.19) extension, decoded, or
    /// `None` when the certificate carries no such extension.
    pub fn basic_constraints(&self) -> Result<Option<BasicConstraints>> {
        let entries = self.extensions()?;
        match extensions::find_value(&entries, extensions::BASIC_CONSTRAINTS_OID) {
            Some(raw) => Ok(Some(extensions::parse_basic_constraints(raw)?)),
            None => Ok(None),
        }
    }
}

fn tlv_bytes<'i>(image: &'i [u8], node: &Node<'i>) -> &'i [u8] {
    let start = node.offset;
    let end = start + node.tag_info.header_len as usize + node.value.len();
    &image[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    // A minimal but structurally complete certificate: self-consistent
    // lengths, RSA key and signature, a single-RDN issuer/subject, no
    // extensions or unique IDs.
    fn sample_certificate() -> alloc::vec::Vec<u8> {
        build_certificate(None)
    }

    // One `[3] EXPLICIT Extensions` field: a critical `keyUsage`
    // (digitalSignature + keyEncipherment) and a non-critical
    // `basicConstraints` (cA=true, pathLenConstraint=3).
    fn sample_certificate_with_extensions() -> alloc::vec::Vec<u8> {
        let key_usage_ext = {
            let extn_id = hex!("0603 551d0f"); // OID 2.5.29.15
            let critical = hex!("0101 ff");
            let extn_value = wrap(0x04, &hex!("03 02 01 a0")); // OCTET STRING(BIT STRING)
            let mut content = alloc::vec::Vec::new();
            content.extend_from_slice(&extn_id);
            content.extend_from_slice(&critical);
            content.extend_from_slice(&extn_value);
            wrap(0x30, &content)
        };
        let basic_constraints_ext = {
            let extn_id = hex!("0603 551d13"); // OID 2.5.29.19
            let inner = hex!("3006 0101 ff 020103"); // BasicConstraints{cA:TRUE, pathLen:3}
            let extn_value = wrap(0x04, &inner);
            let mut content = alloc::vec::Vec::new();
            content.extend_from_slice(&extn_id);
            content.extend_from_slice(&extn_value);
            wrap(0x30, &content)
        };
        let mut extensions_seq = alloc::vec::Vec::new();
        extensions_seq.extend_from_slice(&key_usage_ext);
        extensions_seq.extend_from_slice(&basic_constraints_ext);
        let extensions_seq = wrap(0x30, &extensions_seq);
        let explicit_tag = wrap(0xA3, &extensions_seq);
        build_certificate(Some(explicit_tag))
    }

    fn build_certificate(extensions_field: Option<alloc::vec::Vec<u8>>) -> alloc::vec::Vec<u8> {
        let spki = hex!(
            "30 1D"
            "30 0D 0609 2a864886f70d010101 0500"
            "03 0C 00"
            "30 09 0203 010203 0203 010001"
        );
        let not_before = hex!("170d 3230303130313030303030305a"); // UTCTime 2020-01-01T00:00:00Z
        let not_after = hex!("170d 3330303130313030303030305a"); // UTCTime 2030-01-01T00:00:00Z
        let mut validity = alloc::vec::Vec::new();
        validity.extend_from_slice(&not_before);
        validity.extend_from_slice(&not_after);
        let validity = wrap(0x30, &validity);

        let rdn_attr = hex!("300B 0603 550403 0c04 41434d45"); // CN=ACME
        let rdn = wrap(0x31, &rdn_attr);
        let name = wrap(0x30, &rdn);

        // sha1WithRSAEncryption (1.2.840.113549.1.1.5), distinct from the
        // SPKI's plain rsaEncryption (1.2.840.113549.1.1.1) above.
        let sig_algo = hex!("300D 0609 2a864886f70d010105 0500");
        let serial = hex!("020101");

        let mut tbs_content = alloc::vec::Vec::new();
        tbs_content.extend_from_slice(&serial);
        tbs_content.extend_from_slice(&sig_algo);
        tbs_content.extend_from_slice(&name); // issuer
        tbs_content.extend_from_slice(&validity);
        tbs_content.extend_from_slice(&name); // subject
        tbs_content.extend_from_slice(&spki);
        if let Some(ext) = &extensions_field {
            tbs_content.extend_from_slice(ext);
        }
        let tbs = wrap(0x30, &tbs_content);

        let sig_value_content = hex!("00 01 02 03");
        let sig_value = wrap(0x03, &sig_value_content);

        let mut cert_content = alloc::vec::Vec::new();
        cert_content.extend_from_slice(&tbs);
        cert_content.extend_from_slice(&sig_algo);
        cert_content.extend_from_slice(&sig_value);
        wrap(0x30, &cert_content)
    }

    fn wrap(tag: u8, content: &[u8]) -> alloc::vec::Vec<u8> {
        assert!(content.len() < 256, "sample fixture needs at most one length octet");
        let mut out = alloc::vec::Vec::with_capacity(content.len() + 3);
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

    #[test]
    fn parses_sample_certificate() {
        let der = sample_certificate();
        let cert = Certificate::parse(&der).unwrap();
        assert_eq!(cert.image(), der.as_slice());
    }

    #[test]
    fn reads_serial_with_length_prefix() {
        let der = sample_certificate();
        let cert = Certificate::parse(&der).unwrap();
        assert_eq!(cert.serial().unwrap(), alloc::vec![0, 0, 0, 1, 0x01]);
    }

    #[test]
    fn reads_issuer_and_subject() {
        let der = sample_certificate();
        let cert = Certificate::parse(&der).unwrap();
        assert_eq!(cert.issuer().unwrap(), "CN=ACME");
        assert_eq!(cert.subject().unwrap(), "CN=ACME");
    }

    #[test]
    fn reads_validity_bounds() {
        let der = sample_certificate();
        let cert = Certificate::parse(&der).unwrap();
        let not_before = cert.validity(ValidityBound::NotBefore).unwrap();
        let not_after = cert.validity(ValidityBound::NotAfter).unwrap();
        assert!(not_before < not_after);
    }

    #[test]
    fn reads_public_key_as_symbolic_expression() {
        let der = sample_certificate();
        let cert = Certificate::parse(&der).unwrap();
        let expr = cert.public_key().unwrap();
        let (tag, _) = expr.tagged_parts().unwrap();
        assert_eq!(tag, "public-key");
    }

    #[test]
    fn reads_sig_val_with_digest_hint() {
        let der = sample_certificate();
        let cert = Certificate::parse(&der).unwrap();
        let expr = cert.sig_val().unwrap();
        let (tag, rest) = expr.tagged_parts().unwrap();
        assert_eq!(tag, "sig-val");
        assert!(rest.iter().any(|it| it.tagged_parts().map(|(n, _)| n == "hash").unwrap_or(false)));
    }

    #[test]
    fn digest_algo_matches_sha1_rsa() {
        let der = sample_certificate();
        let cert = Certificate::parse(&der).unwrap();
        assert_eq!(cert.digest_algo(), Some("sha1"));
    }

    #[test]
    fn hash_whole_covers_entire_image() {
        let der = sample_certificate();
        let cert = Certificate::parse(&der).unwrap();
        let mut seen = alloc::vec::Vec::new();
        cert.hash(HashRegion::Whole, |b| seen.extend_from_slice(b));
        assert_eq!(seen, der);
    }

    #[test]
    fn hash_tbs_excludes_outer_signature_fields() {
        let der = sample_certificate();
        let cert = Certificate::parse(&der).unwrap();
        let mut seen = alloc::vec::Vec::new();
        cert.hash(HashRegion::Tbs, |b| seen.extend_from_slice(b));
        assert!(seen.len() < der.len());
        assert_eq!(seen[0], 0x30);
    }

    #[test]
    fn certificate_without_extensions_reports_empty_list() {
        let der = sample_certificate();
        let cert = Certificate::parse(&der).unwrap();
        assert!(cert.extensions().unwrap().is_empty());
        assert_eq!(cert.key_usage().unwrap(), None);
        assert_eq!(cert.basic_constraints().unwrap(), None);
    }

    #[test]
    fn reads_extensions_list() {
        let der = sample_certificate_with_extensions();
        let cert = Certificate::parse(&der).unwrap();
        let exts = cert.extensions().unwrap();
        assert_eq!(exts.len(), 2);
        assert_eq!(exts[0].oid, "2.5.29.15");
        assert!(exts[0].critical);
        assert_eq!(exts[1].oid, "2.5.29.19");
        assert!(!exts[1].critical);
    }

    #[test]
    fn reads_key_usage_extension() {
        let der = sample_certificate_with_extensions();
        let cert = Certificate::parse(&der).unwrap();
        let usage = cert.key_usage().unwrap().unwrap();
        assert!(usage.digital_signature);
        assert!(usage.key_encipherment);
        assert!(!usage.crl_sign);
    }

    #[test]
    fn reads_basic_constraints_extension() {
        let der = sample_certificate_with_extensions();
        let cert = Certificate::parse(&der).unwrap();
        let bc = cert.basic_constraints().unwrap().unwrap();
        assert!(bc.ca);
        assert_eq!(bc.path_len_constraint, Some(3));
    }
}
