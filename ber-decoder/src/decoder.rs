//! Drives an [`asn1_schema`] grammar over a captured image -- component D.

use crate::Node;
use alloc::{string::String, string::ToString, vec::Vec};
use asn1_schema::{Field, Module, Primitive, Schema, Tagging, TypeExpr};
use der::{
    read_header, Class, ErrorKind, Identifier, Reader, Result, SliceReader, TagInfo, TagNumber,
    UniversalTag,
};

/// Decode `image` against `type_name` in `module_name` of `schema`,
/// producing a [`Node`] tree rooted at that type.
///
/// This is component D's entry point (§4.D `decode`): the whole message
/// must be a single, complete value of the named type, with no trailing
/// bytes left over.
pub fn decode<'i>(
    schema: &Schema,
    module_name: &str,
    type_name: &str,
    image: &'i [u8],
) -> Result<Node<'i>> {
    let module = schema.module(module_name).ok_or(ErrorKind::InvalidObject)?;
    let ty = module.get(type_name).ok_or(ErrorKind::InvalidObject)?;

    let mut reader = SliceReader::new(image);
    let node = decode_type(&mut reader, image, ty, module, None)?;
    if reader.position() != image.len() {
        return Err(ErrorKind::InvalidObject.into());
    }
    Ok(node)
}

/// Decode one value of `ty`, optionally reusing an already-read header
/// (used for implicit tagging, where the context tag substitutes for the
/// field's own universal tag and must not be read twice).
fn decode_type<'i>(
    reader: &mut SliceReader<'i>,
    image: &'i [u8],
    ty: &TypeExpr,
    module: &Module,
    preread: Option<TagInfo>,
) -> Result<Node<'i>> {
    let resolved = module.resolve(ty)?;
    let header = match preread {
        Some(h) => h,
        None => read_header(reader, true)?,
    };
    let header_start = reader.position() - header.header_len as usize;
    let (start, end) = content_span(reader, &header)?;

    match resolved {
        TypeExpr::Tagged { tagging, inner, .. } => {
            let expect = expected_identifier(resolved, module)?
                .ok_or(ErrorKind::UnsupportedEncoding)?;
            check_identifier(&header, expect)?;

            match tagging {
                Tagging::Explicit => {
                    reader.seek(start)?;
                    let inner_node = decode_type(reader, image, inner, module, None)?;
                    finish_constructed(reader, &header, end)?;
                    let mut node = inner_node;
                    node.offset = header_start;
                    Ok(node)
                }
                Tagging::Implicit => {
                    decode_body(reader, image, inner, module, header, start, end, false)
                }
            }
        }
        other => decode_body(reader, image, other, module, header, start, end, true),
    }
}

/// Decode the content of an already-identified TLV (`header`, spanning
/// `[start, end)` in `image`) as `ty`'s body. `reader` must already be
/// positioned at `start`.
///
/// `check_identity` is `false` when `header` was substituted by an implicit
/// tag: the universal-tag/constructed-bit checks that would otherwise apply
/// to `ty` itself are skipped, since the wire tag legitimately differs.
#[allow(clippy::too_many_arguments)]
fn decode_body<'i>(
    reader: &mut SliceReader<'i>,
    image: &'i [u8],
    ty: &TypeExpr,
    module: &Module,
    header: TagInfo,
    start: usize,
    end: usize,
    check_identity: bool,
) -> Result<Node<'i>> {
    let header_start = start - header.header_len as usize;

    match ty {
        TypeExpr::Primitive(p) => {
            if check_identity {
                check_identifier(&header, universal_identifier(*p))?;
            }
            if header.is_constructed() {
                return Err(ErrorKind::UnexpectedTag.into());
            }
            reader.seek(end)?;
            Ok(leaf(header, header_start, slice(image, start, end)?))
        }
        TypeExpr::Any => {
            reader.seek(end)?;
            Ok(leaf(header, header_start, slice(image, start, end)?))
        }
        TypeExpr::Sequence(fields) => {
            if check_identity {
                check_identifier(&header, Identifier::universal(UniversalTag::Sequence))?;
            }
            let children = decode_fields(reader, image, fields, module, end)?;
            finish_constructed(reader, &header, end)?;
            Ok(Node {
                tag_info: header,
                offset: header_start,
                value: slice(image, start, end)?,
                children,
            })
        }
        TypeExpr::Set(fields) => {
            if check_identity {
                check_identifier(&header, Identifier::universal(UniversalTag::Set))?;
            }
            let children = decode_fields(reader, image, fields, module, end)?;
            finish_constructed(reader, &header, end)?;
            Ok(Node {
                tag_info: header,
                offset: header_start,
                value: slice(image, start, end)?,
                children,
            })
        }
        TypeExpr::SequenceOf(inner) => {
            if check_identity {
                check_identifier(&header, Identifier::universal(UniversalTag::Sequence))?;
            }
            let children = decode_repeated(reader, image, inner, module, end)?;
            finish_constructed(reader, &header, end)?;
            Ok(Node {
                tag_info: header,
                offset: header_start,
                value: slice(image, start, end)?,
                children,
            })
        }
        TypeExpr::SetOf(inner) => {
            if check_identity {
                check_identifier(&header, Identifier::universal(UniversalTag::Set))?;
            }
            let children = decode_repeated(reader, image, inner, module, end)?;
            finish_constructed(reader, &header, end)?;
            Ok(Node {
                tag_info: header,
                offset: header_start,
                value: slice(image, start, end)?,
                children,
            })
        }
        TypeExpr::Choice(alts) => {
            // The header already read IS the chosen alternative's own wire
            // tag -- CHOICE never wraps with a tag of its own -- so find the
            // alternative whose expected identifier matches it.
            for field in alts {
                if identifier_matches(&field.ty, module, header.identifier)? {
                    let resolved_alt = module.resolve(&field.ty)?;
                    let node =
                        decode_body(reader, image, resolved_alt, module, header, start, end, true)?;
                    return Ok(Node {
                        tag_info: node.tag_info,
                        offset: node.offset,
                        value: node.value,
                        children: alloc::vec![(field.name.clone(), node)],
                    });
                }
            }
            Err(ErrorKind::UnexpectedTag.into())
        }
        TypeExpr::Tagged { .. } => decode_type(reader, image, ty, module, Some(header)),
        TypeExpr::Reference(_) => unreachable!("module.resolve never returns a bare Reference"),
    }
}

fn leaf<'i>(header: TagInfo, header_start: usize, value: &'i [u8]) -> Node<'i> {
    Node {
        tag_info: header,
        offset: header_start,
        value,
        children: Vec::new(),
    }
}

/// Decode `fields` in order against the sequence/set content bounded by
/// `end`, skipping absent `OPTIONAL` fields whose tag doesn't appear next.
fn decode_fields<'i>(
    reader: &mut SliceReader<'i>,
    image: &'i [u8],
    fields: &[Field],
    module: &Module,
    end: usize,
) -> Result<Vec<(String, Node<'i>)>> {
    let mut children = Vec::new();
    let mut idx = 0;

    while idx < fields.len() {
        if reader.position() >= end {
            break;
        }
        let field = &fields[idx];
        let next_id = peek_identifier(reader)?;
        let matches = match next_id {
            Some(id) => identifier_matches(&field.ty, module, id)?,
            None => false,
        };

        if matches {
            let node = decode_type(reader, image, &field.ty, module, None)?;
            children.push((field.name.clone(), node));
            idx += 1;
        } else if field.optional {
            idx += 1;
        } else {
            return Err(ErrorKind::UnexpectedTag.into());
        }
    }

    if fields[idx..].iter().any(|f| !f.optional) {
        return Err(ErrorKind::ObjectTooShort.into());
    }
    if reader.position() != end {
        return Err(ErrorKind::InvalidObject.into());
    }
    Ok(children)
}

fn decode_repeated<'i>(
    reader: &mut SliceReader<'i>,
    image: &'i [u8],
    inner: &TypeExpr,
    module: &Module,
    end: usize,
) -> Result<Vec<(String, Node<'i>)>> {
    let mut children = Vec::new();
    let mut index = 0usize;
    while reader.position() < end {
        let node = decode_type(reader, image, inner, module, None)?;
        children.push((index.to_string(), node));
        index += 1;
    }
    if reader.position() != end {
        return Err(ErrorKind::InvalidObject.into());
    }
    Ok(children)
}

/// `true` if a value of `ty` would legitimately appear on the wire under
/// `identifier` -- used both to decide whether an `OPTIONAL` field is
/// present and to pick a `CHOICE` alternative.
fn identifier_matches(ty: &TypeExpr, module: &Module, identifier: Identifier) -> Result<bool> {
    let expected = expected_identifier(ty, module)?;
    Ok(match expected {
        Some(id) => id == identifier,
        // `ANY` matches whatever is present.
        None => true,
    })
}

/// The wire identifier a value of `ty` must carry, or `None` if any
/// identifier is acceptable (`ANY`/`CHOICE`, which dispatch by trying each
/// possibility instead of comparing a single tag).
fn expected_identifier(ty: &TypeExpr, module: &Module) -> Result<Option<Identifier>> {
    let resolved = module.resolve(ty)?;
    Ok(match resolved {
        TypeExpr::Tagged {
            class,
            number,
            tagging,
            inner,
        } => {
            let constructed = *tagging == Tagging::Explicit || is_constructed_shape(inner, module)?;
            Some(match class {
                Class::ContextSpecific => Identifier::context_specific(*number, constructed)?,
                other => Identifier {
                    class: *other,
                    constructed,
                    number: TagNumber::new(*number)?,
                },
            })
        }
        TypeExpr::Primitive(p) => Some(universal_identifier(*p)),
        TypeExpr::Sequence(_) | TypeExpr::SequenceOf(_) => {
            Some(Identifier::universal(UniversalTag::Sequence))
        }
        TypeExpr::Set(_) | TypeExpr::SetOf(_) => Some(Identifier::universal(UniversalTag::Set)),
        TypeExpr::Any => None,
        TypeExpr::Choice(_) => None,
        TypeExpr::Reference(_) => unreachable!("module.resolve never returns a bare Reference"),
    })
}

fn universal_identifier(p: Primitive) -> Identifier {
    let tag = match p {
        Primitive::Boolean => UniversalTag::Boolean,
        Primitive::Integer => UniversalTag::Integer,
        Primitive::BitString => UniversalTag::BitString,
        Primitive::OctetString => UniversalTag::OctetString,
        Primitive::Null => UniversalTag::Null,
        Primitive::ObjectIdentifier => UniversalTag::ObjectIdentifier,
        Primitive::UtcTime => UniversalTag::UtcTime,
        Primitive::GeneralizedTime => UniversalTag::GeneralizedTime,
        Primitive::Utf8String => UniversalTag::Utf8String,
        Primitive::PrintableString => UniversalTag::PrintableString,
        Primitive::Ia5String => UniversalTag::Ia5String,
        Primitive::T61String => UniversalTag::T61String,
        Primitive::BmpString => UniversalTag::BmpString,
        Primitive::UniversalString => UniversalTag::UniversalString,
    };
    Identifier::universal(tag)
}

fn is_constructed_shape(ty: &TypeExpr, module: &Module) -> Result<bool> {
    match module.resolve(ty)? {
        TypeExpr::Sequence(_) | TypeExpr::Set(_) | TypeExpr::SequenceOf(_) | TypeExpr::SetOf(_) => {
            Ok(true)
        }
        TypeExpr::Tagged { tagging, inner, .. } => {
            Ok(*tagging == Tagging::Explicit || is_constructed_shape(inner, module)?)
        }
        TypeExpr::Primitive(_) | TypeExpr::Any => Ok(false),
        // X.680 §31.2.7: a CHOICE type cannot itself be implicitly tagged.
        TypeExpr::Choice(_) => Err(ErrorKind::UnsupportedEncoding.into()),
        TypeExpr::Reference(_) => unreachable!("module.resolve never returns a bare Reference"),
    }
}

/// Borrow `image[start..end]`, failing with [`ErrorKind::ObjectTooShort`]
/// rather than panicking when a declared length overruns the image (e.g. a
/// corrupt or truncated message).
fn slice(image: &[u8], start: usize, end: usize) -> Result<&[u8]> {
    image.get(start..end).ok_or_else(|| ErrorKind::ObjectTooShort.into())
}

fn check_identifier(header: &TagInfo, expected: Identifier) -> Result<()> {
    if header.identifier != expected {
        return Err(ErrorKind::UnexpectedTag.into());
    }
    Ok(())
}

/// Peek the next identifier octet without consuming it, or `None` at the
/// current boundary (end of available bytes).
fn peek_identifier(reader: &mut SliceReader<'_>) -> Result<Option<Identifier>> {
    let mut byte = [0u8; 1];
    let n = reader.peek(&mut byte)?;
    if n == 0 {
        return Ok(None);
    }
    Ok(Some(Identifier::from_octet(byte[0])?))
}

/// Compute the absolute `[start, end)` content range for a just-read
/// `header`, without consuming it -- callers decide whether to skip the
/// range outright (leaves) or iterate sub-TLVs within it (constructed
/// types). `reader` is left positioned at `start` in both cases.
fn content_span(reader: &mut SliceReader<'_>, header: &TagInfo) -> Result<(usize, usize)> {
    let start = reader.position();
    if header.indefinite {
        let end = find_indefinite_end(reader, start)?;
        reader.seek(start)?;
        Ok((start, end))
    } else {
        let end = start
            .checked_add(header.length.value() as usize)
            .ok_or(ErrorKind::ObjectTooLarge)?;
        Ok((start, end))
    }
}

/// Scan forward from `content_start` to locate the offset of the
/// end-of-contents marker matching an indefinite-length value, recursing
/// through (and past) any nested indefinite-length constructs. Leaves the
/// reader's position unspecified on return; callers must `seek` before
/// continuing.
fn find_indefinite_end(reader: &mut SliceReader<'_>, content_start: usize) -> Result<usize> {
    reader.seek(content_start)?;
    loop {
        let mut two = [0u8; 2];
        let avail = reader.peek(&mut two)?;
        if avail >= 2 && two == [0, 0] {
            return Ok(reader.position());
        }
        if avail < 2 {
            return Err(ErrorKind::ObjectTooShort.into());
        }
        let nested = read_header(reader, true)?;
        if nested.indefinite {
            let nested_start = reader.position();
            let nested_end = find_indefinite_end(reader, nested_start)?;
            reader.seek(nested_end)?;
            reader.read_exact(&mut two)?; // consume the nested EOC marker
        } else {
            let nested_end = reader
                .position()
                .checked_add(nested.length.value() as usize)
                .ok_or(ErrorKind::ObjectTooLarge)?;
            reader.seek(nested_end)?;
        }
    }
}

/// After decoding a constructed value's content up to `end`, consume the
/// trailing end-of-contents marker if the header used indefinite length.
fn finish_constructed(reader: &mut SliceReader<'_>, header: &TagInfo, end: usize) -> Result<()> {
    if reader.position() != end {
        return Err(ErrorKind::InvalidObject.into());
    }
    if header.indefinite {
        let mut eoc = [0u8; 2];
        reader.read_exact(&mut eoc)?;
        if eoc != [0, 0] {
            return Err(ErrorKind::BerError.into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use asn1_schema::Schema;

    const TEST_GRAMMAR: &str = "test DEFINITIONS IMPLICIT TAGS ::= BEGIN
        Widget ::= SEQUENCE {
            id   INTEGER,
            tag  [0] EXPLICIT INTEGER OPTIONAL,
            name UTF8String OPTIONAL
        }
        List ::= SEQUENCE OF INTEGER
        Pick ::= CHOICE {
            num INTEGER,
            str UTF8String
        }
        END";

    fn schema() -> Schema {
        let mut schema = Schema::new();
        schema.load(TEST_GRAMMAR).unwrap();
        schema
    }

    #[test]
    fn decodes_trailing_optional_present_middle_absent() {
        // Widget { id: 5, tag: absent, name: "hi" }
        let bytes = hex_literal::hex!("3007020105 0c026869");
        let node = decode(&schema(), "test", "Widget", &bytes).unwrap();
        assert_eq!(node.child("id").unwrap().value, [0x05]);
        assert!(node.child("tag").is_none());
        assert_eq!(node.child("name").unwrap().value, b"hi");
    }

    #[test]
    fn decodes_explicit_tagged_optional_present() {
        // Widget { id: 5, tag: [0] EXPLICIT 9, name: absent }
        let bytes = hex_literal::hex!("3008020105 a003020109");
        let node = decode(&schema(), "test", "Widget", &bytes).unwrap();
        assert_eq!(node.child("id").unwrap().value, [0x05]);
        assert_eq!(node.child("tag").unwrap().value, [0x09]);
        assert!(node.child("name").is_none());
    }

    #[test]
    fn decodes_sequence_of() {
        let bytes = hex_literal::hex!("3009 020101 020102 020103");
        let node = decode(&schema(), "test", "List", &bytes).unwrap();
        assert_eq!(node.len(), 3);
        assert_eq!(node.find("0").unwrap().value, [0x01]);
        assert_eq!(node.find("2").unwrap().value, [0x03]);
    }

    #[test]
    fn decodes_choice_by_wire_tag() {
        let bytes = hex_literal::hex!("020107");
        let node = decode(&schema(), "test", "Pick", &bytes).unwrap();
        assert_eq!(node.child("num").unwrap().value, [0x07]);
        assert!(node.child("str").is_none());
    }

    #[test]
    fn decodes_indefinite_length_sequence() {
        // SEQUENCE (indefinite) { INTEGER 42 } EOC, no optional fields present.
        let bytes = hex_literal::hex!("3080 02012a 0000");
        let node = decode(&schema(), "test", "Widget", &bytes).unwrap();
        assert_eq!(node.child("id").unwrap().value, [0x2a]);
        assert!(node.child("tag").is_none());
        assert!(node.child("name").is_none());
    }

    #[test]
    fn rejects_missing_required_field() {
        // Empty SEQUENCE: `id` is required but absent.
        let bytes = hex_literal::hex!("3000");
        assert!(decode(&schema(), "test", "Widget", &bytes).is_err());
    }

    #[test]
    fn rejects_trailing_garbage_after_object() {
        let mut bytes = hex_literal::hex!("3003020105").to_vec();
        bytes.push(0xff);
        assert!(decode(&schema(), "test", "Widget", &bytes).is_err());
    }
}
