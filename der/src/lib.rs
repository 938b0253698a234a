//! Tag-Length-Value framing and DER header codec for ASN.1 (ITU X.690).
//!
//! This crate provides the lowest layer of the workspace: identifier-octet
//! and length-octet codecs (component A), a cooperative streaming byte
//! source (component B), and the shared [`Error`]/[`ErrorKind`] every other
//! crate in the workspace returns.
//!
//! It deliberately knows nothing about any particular grammar -- X.509, CMS,
//! or otherwise. [`asn1_schema`](https://docs.rs/asn1-schema) and
//! [`ber_decoder`](https://docs.rs/ber-decoder) build the schema-driven
//! decoder on top of it.
//!
//! # Minimum Supported Rust Version
//!
//! This crate requires **Rust 1.65** at a minimum.

#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

mod class;
mod error;
mod header;
mod length;
mod reader;
mod tag;

#[cfg(feature = "oid")]
mod oid;

pub use crate::{
    class::Class,
    error::{Error, ErrorKind, Result},
    header::{count_header, read_header, write_header, TagInfo},
    length::{decode_length, encode_length, Length},
    reader::{PushbackReader, Reader, SliceReader, PUSHBACK_CAPACITY},
    tag::{Identifier, TagNumber, UniversalTag},
};

#[cfg(feature = "oid")]
#[cfg_attr(docsrs, doc(cfg(feature = "oid")))]
pub use crate::oid::{parse_oid_bytes, parse_oid_str, ObjectIdentifier};
