//! Error types.
//!
//! [`ErrorKind`] enumerates every failure mode a caller of this workspace can
//! observe, from the lowest TLV framing layer up through the CMS outer
//! parser. Structural errors never leak a Rust type name: callers match on
//! the kind, not on `std::any::type_name`.

use crate::Length;
use core::fmt;

/// Result type.
pub type Result<T> = core::result::Result<T, Error>;

/// An error, tagged with the byte offset (within the message currently being
/// decoded or encoded) at which it occurred.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    position: Option<Length>,
}

impl Error {
    /// Create a new [`Error`] at a known byte position.
    pub fn new(kind: ErrorKind, position: Length) -> Self {
        Self {
            kind,
            position: Some(position),
        }
    }

    /// Get the [`ErrorKind`].
    pub fn kind(self) -> ErrorKind {
        self.kind
    }

    /// Get the byte position at which the error occurred, if known.
    pub fn position(self) -> Option<Length> {
        self.position
    }

    /// Annotate an error bubbling up from a nested message with the offset
    /// at which the nested message begins.
    #[must_use]
    pub fn nested(self, nested_position: Length) -> Self {
        let position = (nested_position + self.position.unwrap_or_default()).ok();
        Self {
            kind: self.kind,
            position,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(pos) = self.position {
            write!(f, " at byte {pos}")?;
        }
        Ok(())
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self {
            kind,
            position: None,
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "oid")]
impl From<const_oid::Error> for Error {
    fn from(_: const_oid::Error) -> Self {
        ErrorKind::InvalidObject.into()
    }
}

/// The distinct failure modes surfaced by this workspace.
///
/// Every crate in the workspace (`der`, `asn1-schema`, `ber-decoder`,
/// `algo-tables`, `keyinfo`, `x509-cert`, `cms`) returns this same
/// [`ErrorKind`] rather than inventing a per-crate error enum, mirroring how
/// `spki`/`x509` reuse `der::Error` in the teacher crates this workspace is
/// built from.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A value was syntactically well-formed BER but semantically invalid
    /// for the context it appeared in.
    InvalidValue,
    /// A bounded internal buffer (image, node arena, symbolic expression
    /// builder) ran out of room.
    OutOfCore,
    /// Two pieces of already-accepted state contradict each other (e.g. a
    /// length that was computed twice disagrees between passes).
    Conflict,
    /// An accessor found no applicable data (distinct from [`ErrorKind::NoValue`]:
    /// this means the structure itself is absent, not merely empty).
    NoData,
    /// An optional field/alternative was not present. Not itself fatal;
    /// accessors that return `Option` convert this into `None`.
    NoValue,
    /// Malformed BER: bad length octets, disallowed indefinite form, a tag
    /// the underlying grammar never expects.
    BerError,
    /// The input is syntactically valid BER but violates a DER canonicality
    /// rule (non-minimal length, indefinite length in a DER-only context).
    NotDerEncoded,
    /// A decoded tag did not match what the active schema node expected.
    UnexpectedTag,
    /// An `AlgorithmIdentifier`/`SubjectPublicKeyInfo` could not be parsed
    /// into key material (see component F).
    InvalidKeyInfo,
    /// A sub-object (e.g. RSASSA-PSS parameters) was malformed.
    InvalidObject,
    /// A symbolic s-expression failed to parse.
    InvalidSexp,
    /// A symbolic s-expression used a shape this codec does not recognise.
    UnknownSexp,
    /// An OID was not present in any algorithm table.
    UnknownAlgorithm,
    /// An OID was found in an algorithm table but marked unsupported.
    UnsupportedAlgorithm,
    /// Fewer bytes remained in the input than a length field promised.
    ObjectTooShort,
    /// A length field exceeded the bound known for its enclosing object.
    ObjectTooLarge,
    /// The underlying byte source returned an I/O-level error.
    ReadError,
    /// A CMS structural invariant (version range, SET OF shape) was
    /// violated.
    InvalidCmsObject,
    /// The outermost `ContentInfo` could not be recognised as CMS at all.
    NoCmsObject,
    /// A recognised but unimplemented CMS content type or sub-structure
    /// (e.g. `OriginatorInfo`).
    UnsupportedCmsObject,
    /// `CMSVersion` fell outside the range this codec accepts.
    UnsupportedCmsVersion,
    /// A construct used an encoding this codec intentionally does not
    /// tolerate (e.g. indefinite-length `SET OF AlgorithmIdentifier`).
    UnsupportedEncoding,
    /// Catch-all for conditions with no more specific kind.
    General,
}

impl ErrorKind {
    /// Annotate this kind with a byte position, producing an [`Error`].
    pub fn at(self, position: Length) -> Error {
        Error::new(self, position)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ErrorKind::InvalidValue => "invalid value",
            ErrorKind::OutOfCore => "out of core (buffer exhausted)",
            ErrorKind::Conflict => "conflicting length computation",
            ErrorKind::NoData => "no data",
            ErrorKind::NoValue => "no value",
            ErrorKind::BerError => "malformed BER",
            ErrorKind::NotDerEncoded => "not canonically DER encoded",
            ErrorKind::UnexpectedTag => "unexpected tag",
            ErrorKind::InvalidKeyInfo => "invalid key info",
            ErrorKind::InvalidObject => "invalid object",
            ErrorKind::InvalidSexp => "invalid s-expression",
            ErrorKind::UnknownSexp => "unrecognised s-expression shape",
            ErrorKind::UnknownAlgorithm => "unknown algorithm",
            ErrorKind::UnsupportedAlgorithm => "unsupported algorithm",
            ErrorKind::ObjectTooShort => "object too short",
            ErrorKind::ObjectTooLarge => "object too large",
            ErrorKind::ReadError => "read error",
            ErrorKind::InvalidCmsObject => "invalid CMS object",
            ErrorKind::NoCmsObject => "no CMS object found",
            ErrorKind::UnsupportedCmsObject => "unsupported CMS object",
            ErrorKind::UnsupportedCmsVersion => "unsupported CMS version",
            ErrorKind::UnsupportedEncoding => "unsupported encoding",
            ErrorKind::General => "general error",
        };
        f.write_str(msg)
    }
}
