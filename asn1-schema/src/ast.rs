//! The in-memory grammar tree produced by [`crate::parse_module`].

use alloc::{boxed::Box, string::String, vec::Vec};
use der::Class;

/// One of the ASN.1 primitive (non-constructed, non-reference) types this
/// grammar subset understands.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[non_exhaustive]
pub enum Primitive {
    /// `BOOLEAN`
    Boolean,
    /// `INTEGER`
    Integer,
    /// `BIT STRING`
    BitString,
    /// `OCTET STRING`
    OctetString,
    /// `NULL`
    Null,
    /// `OBJECT IDENTIFIER`
    ObjectIdentifier,
    /// `UTCTime`
    UtcTime,
    /// `GeneralizedTime`
    GeneralizedTime,
    /// `UTF8String`
    Utf8String,
    /// `PrintableString`
    PrintableString,
    /// `IA5String`
    Ia5String,
    /// `T61String`
    T61String,
    /// `BMPString`
    BmpString,
    /// `UniversalString`
    UniversalString,
}

/// Explicit vs. implicit tagging (X.690 §31.2).
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Tagging {
    /// `[n] EXPLICIT T`: the context tag wraps a full nested TLV of `T`.
    Explicit,
    /// `[n] IMPLICIT T`: the context tag replaces `T`'s own tag outright.
    Implicit,
}

/// A type expression: the right-hand side of a `::=` or a field's type.
#[derive(Debug, Clone)]
pub enum TypeExpr {
    /// One of the built-in primitive types.
    Primitive(Primitive),
    /// `SEQUENCE { ... }`
    Sequence(Vec<Field>),
    /// `SET { ... }`
    Set(Vec<Field>),
    /// `SEQUENCE OF T`
    SequenceOf(Box<TypeExpr>),
    /// `SET OF T`
    SetOf(Box<TypeExpr>),
    /// `CHOICE { ... }`: exactly one alternative is realised per value.
    Choice(Vec<Field>),
    /// `[class number] EXPLICIT|IMPLICIT T`
    Tagged {
        /// Tag class (almost always `ContextSpecific` in the grammars this
        /// workspace loads).
        class: Class,
        /// Tag number within the class.
        number: u8,
        /// Explicit or implicit tagging.
        tagging: Tagging,
        /// The tagged type.
        inner: Box<TypeExpr>,
    },
    /// `ANY` / `ANY DEFINED BY ...`: an opaque leaf, captured as a raw TLV
    /// without further interpretation (§4.D).
    Any,
    /// A reference to another named type in the same module, resolved by
    /// [`crate::Module::resolve`].
    Reference(String),
}

/// One field of a `SEQUENCE`/`SET`/`CHOICE`.
#[derive(Debug, Clone)]
pub struct Field {
    /// Field name (used as the node-tree path component, §4.D `find`).
    pub name: String,
    /// Field type.
    pub ty: TypeExpr,
    /// Whether the field may be absent from the encoding.
    pub optional: bool,
}

/// A single `Name ::= TypeExpr` definition.
#[derive(Debug, Clone)]
pub struct TypeDef {
    /// The defined type's name, as it appears to the left of `::=`. May
    /// contain a `.` for the dotted names this workspace's CMS grammar uses
    /// (e.g. `CryptographicMessageSyntax.SignerInfos`) -- a deliberate
    /// extension of strict X.680 identifier syntax, see [`crate::lexer`].
    pub name: String,
    /// The right-hand side.
    pub ty: TypeExpr,
}
