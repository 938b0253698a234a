//! Cryptographic Message Syntax (RFC 5652) streaming outer parser (§4.H).
//!
//! `ContentInfo`, `SignedData`, and `EnvelopedData` are read a header at a
//! time off a [`der::Reader`] rather than assumed to be fully buffered, so a
//! caller can stream `eContent`/`encryptedContent` through a digest or
//! cipher instead of holding the whole message in memory. Bounded
//! sub-objects that already have a schema -- `signerInfos`,
//! `recipientInfos`, the `AlgorithmIdentifier`s mixed into both -- are
//! delegated to [`ber_decoder::decode`] or [`keyinfo::get_algorithm`] once
//! their bytes are captured.
//!
//! `certificates`/`crls`/`originatorInfo` are `[n] IMPLICIT ANY OPTIONAL` in
//! the grammar this crate loads: the schema decoder always predicts a
//! primitive wire shape for an `ANY`-typed field, which is wrong whenever
//! the field's actual encoding is constructed (a `SET OF` certificates
//! commonly is). These three fields are walked by hand instead, matching
//! only the context-specific class and tag number and ignoring the
//! constructed bit, to sidestep that mismatch entirely.

#![no_std]
#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

extern crate alloc;

mod content_info;
mod enveloped_data;
mod signed_data;
mod util;

pub use crate::{
    content_info::{parse_content_info, ContentInfoHeader},
    enveloped_data::{parse_enveloped_data_part_1, EnvelopedDataPart1},
    signed_data::{
        parse_signed_data_part_1, parse_signed_data_part_2, CmsContext, SignedAttrs, SignedDataPart1,
        SignedDataPart2,
    },
};
