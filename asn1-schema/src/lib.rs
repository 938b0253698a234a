//! Parses a textual ASN.1 module definition into an in-memory grammar tree.
//!
//! This is component §4.C: a restricted, hand-written subset of ITU X.680
//! module syntax (`SEQUENCE`/`SET`/`CHOICE`/`SEQUENCE OF`/tagged types and
//! the primitive leaf types), just large enough to express the X.509 and
//! CMS grammars the rest of the workspace ships as built-in assets.
//!
//! The grammar text itself never ships compiled: [`x509_module`] and
//! [`cms_module`] parse it lazily from the embedded `.asn1` files under
//! `src/grammar/`, the same way [`der`] treats DER as a codec over bytes
//! rather than a generated type per message.

#![no_std]
#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

extern crate alloc;

mod ast;
mod lexer;
mod module;
mod parser;

pub use crate::{
    ast::{Field, Primitive, Tagging, TypeDef, TypeExpr},
    module::{Module, Schema},
    parser::parse_module,
};

use der::Result;

/// Grammar text for the X.509 module, module name `tmttv2`, containing at
/// least `Certificate`.
pub const X509_GRAMMAR: &str = include_str!("grammar/tmttv2.asn1");

/// Grammar text for the CMS module, module name `cms`, containing
/// `CryptographicMessageSyntax.SignerInfos` and
/// `CryptographicMessageSyntax.RecipientInfos`.
pub const CMS_GRAMMAR: &str = include_str!("grammar/cms.asn1");

/// Parse and return the built-in X.509 module (`tmttv2`).
pub fn x509_module() -> Result<Module> {
    parse_module(X509_GRAMMAR)
}

/// Parse and return the built-in CMS module (`cms`).
pub fn cms_module() -> Result<Module> {
    parse_module(CMS_GRAMMAR)
}

/// Build a [`Schema`] with both built-in modules loaded.
pub fn default_schema() -> Result<Schema> {
    let mut schema = Schema::new();
    schema.load(X509_GRAMMAR)?;
    schema.load(CMS_GRAMMAR)?;
    Ok(schema)
}
