//! Schema-driven BER decoder -- component §4.D.
//!
//! Instead of generating a Rust type per ASN.1 structure, [`decode`] drives
//! an [`asn1_schema::Module`] over a captured byte image directly, producing
//! a [`Node`] tree addressable by dotted field path
//! (`node.find("tbsCertificate.subjectPublicKeyInfo")`). Every [`Node`]
//! borrows from the original image, so decoding costs no more memory than
//! the message itself.
//!
//! Both definite- and indefinite-length constructed encodings are accepted
//! (the indefinite form is scanned for its end-of-contents marker before
//! being decoded structurally) -- required for CMS's streaming encodings,
//! which this crate's schema-free caller, `cms`, drives a header at a time.

#![no_std]
#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

extern crate alloc;

mod decoder;
mod node;

pub use crate::{decoder::decode, node::Node};
