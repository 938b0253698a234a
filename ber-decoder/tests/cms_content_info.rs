//! Cross-crate smoke test: the built-in CMS grammar decodes a real
//! `ContentInfo` shape end to end.

#[test]
fn decodes_content_info_without_content() {
    let schema = asn1_schema::default_schema().unwrap();
    // SEQUENCE { OBJECT IDENTIFIER 1.2.3 }
    let bytes = hex_literal::hex!("3004 0602 2a03");
    let node = ber_decoder::decode(&schema, "cms", "ContentInfo", &bytes).unwrap();
    assert_eq!(node.child("contentType").unwrap().value, [0x2a, 0x03]);
    assert!(node.child("content").is_none());
}

#[test]
fn decodes_content_info_with_explicit_any_content() {
    let schema = asn1_schema::default_schema().unwrap();
    // SEQUENCE { OID 1.2.3, [0] EXPLICIT { INTEGER 5 } }
    let bytes = hex_literal::hex!("3009 0602 2a03 a003 020105");
    let node = ber_decoder::decode(&schema, "cms", "ContentInfo", &bytes).unwrap();
    assert_eq!(node.child("contentType").unwrap().value, [0x2a, 0x03]);
    assert_eq!(node.child("content").unwrap().value, [0x05]);
}
