//! The decoded node tree -- component D's data model.

use alloc::{string::String, vec::Vec};
use der::TagInfo;

/// One decoded TLV, tied to its byte range in the captured image.
///
/// A [`Node`] never owns bytes: `value` and the image range implied by
/// `offset`/`header_len`/`tag_info.length` all borrow from the original
/// input, so decoding a certificate or CMS message costs no more memory
/// than the message itself plus this tree's bookkeeping.
#[derive(Debug, Clone)]
pub struct Node<'i> {
    /// The TLV header as actually read from the wire (for implicitly-tagged
    /// fields, this is the substituted context tag, not the field type's own
    /// universal tag).
    pub tag_info: TagInfo,
    /// Absolute offset of this TLV's first header octet within the image.
    pub offset: usize,
    /// Content (value) bytes: the raw leaf payload for primitives and `ANY`,
    /// or the encoded bytes of a constructed value's children.
    pub value: &'i [u8],
    /// Named children, present for `SEQUENCE`/`SET`/`CHOICE`/explicit-tagged
    /// values. `SEQUENCE OF`/`SET OF` children are named by decimal index
    /// (`"0"`, `"1"`, ...).
    pub children: Vec<(String, Node<'i>)>,
}

impl<'i> Node<'i> {
    /// Look up an immediate child by field name.
    pub fn child(&self, name: &str) -> Option<&Node<'i>> {
        self.children
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, node)| node)
    }

    /// Resolve a dotted path (`"tbsCertificate.subjectPublicKeyInfo"`)
    /// against this node, descending one field per path component.
    pub fn find(&self, path: &str) -> Option<&Node<'i>> {
        let mut node = self;
        for component in path.split('.') {
            node = node.child(component)?;
        }
        Some(node)
    }

    /// Number of immediate children (e.g. the element count of a `SEQUENCE
    /// OF`/`SET OF`).
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// `true` if this node has no children (a leaf, or an empty
    /// `SEQUENCE OF`/`SET OF`).
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}
