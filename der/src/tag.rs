//! ASN.1 identifier octets: class + tag number + primitive/constructed bit.

use crate::{Class, ErrorKind, Result};
use core::fmt;

/// Indicator bit for constructed-form encoding (vs. primitive form),
/// X.690 §8.1.2.5.
const CONSTRUCTED_FLAG: u8 = 0b0010_0000;

/// A tag number in the range `0..=30`.
///
/// X.690 §8.1.2.4 allows tag numbers above 30 via a multi-byte high-tag-number
/// form (leading number `0b11111`). Every grammar this workspace decodes --
/// X.509 and CMS -- only ever uses tag numbers in the low range, so, like the
/// teacher `der` crate this is grounded on, high-tag-number form is rejected
/// with [`crate::ErrorKind::UnknownTag`]'s stand-in, [`ErrorKind::BerError`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub struct TagNumber(u8);

impl TagNumber {
    /// Largest tag number representable in the single-octet identifier form.
    pub const MAX: u8 = 30;

    /// Build a tag number, rejecting values above [`TagNumber::MAX`].
    pub fn new(value: u8) -> Result<Self> {
        if value <= Self::MAX {
            Ok(Self(value))
        } else {
            Err(ErrorKind::BerError.into())
        }
    }

    /// The raw tag number.
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for TagNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A decoded identifier octet: class, primitive/constructed bit, tag number.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Identifier {
    /// Tag class.
    pub class: Class,
    /// Primitive (`false`) or constructed (`true`) encoding.
    pub constructed: bool,
    /// Tag number within the class.
    pub number: TagNumber,
}

impl Identifier {
    /// Build a `UNIVERSAL` identifier for one of the well-known primitive
    /// ASN.1 types.
    pub const fn universal(tag: UniversalTag) -> Self {
        Self {
            class: Class::Universal,
            constructed: tag.is_constructed(),
            number: TagNumber(tag as u8),
        }
    }

    /// Build a `CONTEXT-SPECIFIC` identifier, as used by implicit/explicit
    /// tagging (`[n]`).
    pub fn context_specific(number: u8, constructed: bool) -> Result<Self> {
        match TagNumber::new(number) {
            Ok(number) => Ok(Self {
                class: Class::ContextSpecific,
                constructed,
                number,
            }),
            Err(e) => Err(e),
        }
    }

    /// Decode an identifier octet.
    pub fn from_octet(byte: u8) -> Result<Self> {
        let class = Class::from_octet(byte);
        let constructed = byte & CONSTRUCTED_FLAG != 0;
        let number = byte & 0b0001_1111;
        if number == 0b0001_1111 {
            // High-tag-number form: unsupported by this grammar subset.
            return Err(ErrorKind::BerError.into());
        }
        Ok(Self {
            class,
            constructed,
            number: TagNumber(number),
        })
    }

    /// Encode this identifier to a single octet.
    pub const fn to_octet(self) -> u8 {
        self.class.octet_bits()
            | if self.constructed { CONSTRUCTED_FLAG } else { 0 }
            | self.number.0
    }

    /// `true` if this identifier names the BER end-of-contents marker
    /// (`UNIVERSAL 0`, primitive, used only to terminate indefinite-length
    /// constructed values).
    pub const fn is_end_of_contents(self) -> bool {
        matches!(self.class, Class::Universal) && !self.constructed && self.number.0 == 0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} {}] {}",
            self.class,
            self.number,
            if self.constructed {
                "constructed"
            } else {
                "primitive"
            }
        )
    }
}

/// The `UNIVERSAL`-class tags this workspace's ASN.1 schemas reference by
/// name (X.680 §8, Table 1).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(u8)]
#[non_exhaustive]
pub enum UniversalTag {
    /// `BOOLEAN`
    Boolean = 0x01,
    /// `INTEGER`
    Integer = 0x02,
    /// `BIT STRING`
    BitString = 0x03,
    /// `OCTET STRING`
    OctetString = 0x04,
    /// `NULL`
    Null = 0x05,
    /// `OBJECT IDENTIFIER`
    ObjectIdentifier = 0x06,
    /// `ENUMERATED`
    Enumerated = 0x0A,
    /// `UTF8String`
    Utf8String = 0x0C,
    /// `SEQUENCE` / `SEQUENCE OF`
    Sequence = 0x10,
    /// `SET` / `SET OF`
    Set = 0x11,
    /// `PrintableString`
    PrintableString = 0x13,
    /// `T61String` (`TeletexString`)
    T61String = 0x14,
    /// `IA5String`
    Ia5String = 0x16,
    /// `UTCTime`
    UtcTime = 0x17,
    /// `GeneralizedTime`
    GeneralizedTime = 0x18,
    /// `UniversalString`
    UniversalString = 0x1C,
    /// `BMPString`
    BmpString = 0x1E,
}

impl UniversalTag {
    /// Whether values of this type are always encoded in constructed form.
    /// `SEQUENCE` and `SET` are; every other universal type this workspace
    /// uses is primitive (string types are never emitted here in the
    /// constructed/segmented BER form).
    pub const fn is_constructed(self) -> bool {
        matches!(self, UniversalTag::Sequence | UniversalTag::Set)
    }

    /// Recover a [`UniversalTag`] from a raw tag number, when `class` is
    /// `UNIVERSAL`.
    pub const fn from_number(number: u8) -> Option<Self> {
        Some(match number {
            0x01 => UniversalTag::Boolean,
            0x02 => UniversalTag::Integer,
            0x03 => UniversalTag::BitString,
            0x04 => UniversalTag::OctetString,
            0x05 => UniversalTag::Null,
            0x06 => UniversalTag::ObjectIdentifier,
            0x0A => UniversalTag::Enumerated,
            0x0C => UniversalTag::Utf8String,
            0x10 => UniversalTag::Sequence,
            0x11 => UniversalTag::Set,
            0x13 => UniversalTag::PrintableString,
            0x14 => UniversalTag::T61String,
            0x16 => UniversalTag::Ia5String,
            0x17 => UniversalTag::UtcTime,
            0x18 => UniversalTag::GeneralizedTime,
            0x1C => UniversalTag::UniversalString,
            0x1E => UniversalTag::BmpString,
            _ => return None,
        })
    }
}

impl fmt::Display for UniversalTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UniversalTag::Boolean => "BOOLEAN",
            UniversalTag::Integer => "INTEGER",
            UniversalTag::BitString => "BIT STRING",
            UniversalTag::OctetString => "OCTET STRING",
            UniversalTag::Null => "NULL",
            UniversalTag::ObjectIdentifier => "OBJECT IDENTIFIER",
            UniversalTag::Enumerated => "ENUMERATED",
            UniversalTag::Utf8String => "UTF8String",
            UniversalTag::Sequence => "SEQUENCE",
            UniversalTag::Set => "SET",
            UniversalTag::PrintableString => "PrintableString",
            UniversalTag::T61String => "T61String",
            UniversalTag::Ia5String => "IA5String",
            UniversalTag::UtcTime => "UTCTime",
            UniversalTag::GeneralizedTime => "GeneralizedTime",
            UniversalTag::UniversalString => "UniversalString",
            UniversalTag::BmpString => "BMPString",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_universal_identifiers() {
        for tag in [
            UniversalTag::Boolean,
            UniversalTag::Integer,
            UniversalTag::BitString,
            UniversalTag::OctetString,
            UniversalTag::Sequence,
            UniversalTag::Set,
        ] {
            let id = Identifier::universal(tag);
            let byte = id.to_octet();
            let decoded = Identifier::from_octet(byte).unwrap();
            assert_eq!(decoded, id);
        }
    }

    #[test]
    fn context_specific_round_trip() {
        let id = Identifier::context_specific(0, true).unwrap();
        let byte = id.to_octet();
        assert_eq!(byte, 0xA0);
        let decoded = Identifier::from_octet(byte).unwrap();
        assert_eq!(decoded, id);
    }

    #[test]
    fn rejects_high_tag_number_form() {
        assert!(Identifier::from_octet(0b0001_1111).is_err());
    }
}
