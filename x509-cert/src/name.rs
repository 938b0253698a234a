//! RFC 2253 string form of a `Name` (`RDNSequence`).

use alloc::{format, string::String, vec::Vec};
use ber_decoder::Node;
use der::{parse_oid_bytes, ErrorKind, Result};

/// Render a decoded `Name` CHOICE node (its single `rdnSequence` alternative)
/// as an RFC 2253 string, most-specific RDN first -- the reverse of the
/// `RDNSequence`'s wire order, which runs root-to-leaf.
pub(crate) fn to_rfc2253(name: &Node<'_>) -> Result<String> {
    let rdn_sequence = name
        .child("rdnSequence")
        .ok_or(ErrorKind::InvalidObject)?;

    let mut rdns = Vec::new();
    for (_, rdn) in &rdn_sequence.children {
        rdns.push(render_rdn(rdn)?);
    }
    rdns.reverse();
    Ok(rdns.join(","))
}

fn render_rdn(rdn: &Node<'_>) -> Result<String> {
    let mut avas = Vec::new();
    for (_, ava) in &rdn.children {
        avas.push(render_ava(ava)?);
    }
    Ok(avas.join("+"))
}

fn render_ava(ava: &Node<'_>) -> Result<String> {
    let attr_type = ava.child("attrType").ok_or(ErrorKind::InvalidObject)?;
    let attr_value = ava.child("attrValue").ok_or(ErrorKind::InvalidObject)?;

    let oid = parse_oid_bytes(attr_type.value)?;
    let name = short_name(&format!("{oid}")).unwrap_or_else(|| format!("OID.{oid}"));
    let value = render_value(attr_value.value);
    Ok(format!("{name}={value}"))
}

/// Standard RFC 2253 §2.3 short attribute names.
fn short_name(dotted: &str) -> Option<&'static str> {
    Some(match dotted {
        "2.5.4.3" => "CN",
        "2.5.4.7" => "L",
        "2.5.4.8" => "ST",
        "2.5.4.10" => "O",
        "2.5.4.11" => "OU",
        "2.5.4.6" => "C",
        "2.5.4.9" => "STREET",
        "0.9.2342.19200300.100.1.25" => "DC",
        "0.9.2342.19200300.100.1.1" => "UID",
        _ => return None,
    })
}

/// Render an `AttributeValue`'s raw content bytes, escaping the characters
/// RFC 2253 §2.4 requires. The content is treated as UTF-8 text (true for
/// every string type this facade's grammar accepts as `attrValue`); bytes
/// that aren't valid UTF-8 fall back to a `#`-prefixed hex dump (X.690
/// `ANY`'s native escape for values with no string interpretation).
fn render_value(raw: &[u8]) -> String {
    let text = match core::str::from_utf8(raw) {
        Ok(s) => s,
        Err(_) => return hex_escape(raw),
    };

    let mut out = String::with_capacity(text.len());
    let chars: Vec<char> = text.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        let leading_space = i == 0 && c == ' ';
        let leading_hash = i == 0 && c == '#';
        let trailing_space = i == chars.len() - 1 && c == ' ';
        if leading_space || leading_hash || trailing_space {
            out.push('\\');
            out.push(c);
        } else if matches!(c, ',' | '+' | '"' | '\\' | '<' | '>' | ';') {
            out.push('\\');
            out.push(c);
        } else {
            out.push(c);
        }
    }
    out
}

fn hex_escape(raw: &[u8]) -> String {
    let mut out = String::with_capacity(1 + raw.len() * 2);
    out.push('#');
    for &b in raw {
        out.push_str(&format!("{b:02x}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use asn1_schema::default_schema;

    fn parse_name<'i>(bytes: &'i [u8]) -> Node<'i> {
        let schema = default_schema().unwrap();
        // Reuse the certificate grammar's `Name` type directly.
        ber_decoder::decode(&schema, "tmttv2", "Name", bytes).unwrap()
    }

    #[test]
    fn renders_single_rdn_with_known_short_name() {
        // rdnSequence { RDN { AttributeTypeAndValue { CN, "ACME" } } }, built
        // bottom-up so each SEQUENCE/SET length prefix is computed from its
        // actual encoded content rather than hand-counted.
        let attr = hex_literal::hex!("300B 0603 550403 0c04 41434d45"); // SEQ{OID cn, UTF8String "ACME"}
        let rdn = {
            let mut v = alloc::vec![0x31, attr.len() as u8];
            v.extend_from_slice(&attr);
            v
        };
        let name = {
            let mut v = alloc::vec![0x30, rdn.len() as u8];
            v.extend_from_slice(&rdn);
            v
        };
        let node = parse_name(&name);
        assert_eq!(to_rfc2253(&node).unwrap(), "CN=ACME");
    }

    #[test]
    fn escapes_comma_in_value() {
        assert_eq!(render_value(b"Smith, Jr."), "Smith\\, Jr.");
    }

    #[test]
    fn escapes_leading_and_trailing_space() {
        assert_eq!(render_value(b" hi "), "\\ hi\\ ");
    }

    #[test]
    fn unknown_oid_falls_back_to_oid_dot_form() {
        assert_eq!(short_name("1.2.3.4"), None);
    }
}
