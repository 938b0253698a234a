//! Codec between DER-encoded key/signature/encrypted-value material and a
//! canonical symbolic s-expression form (§4.F).
//!
//! [`get_algorithm`] parses an `AlgorithmIdentifier`; [`keyinfo_to_sexp`]/
//! [`cryptval_to_sexp`] and [`keyinfo_from_sexp`]/[`algoinfo_from_sexp`]
//! convert between DER and the symbolic form; [`Sexp`] is the symbolic
//! expression type itself.

#![no_std]
#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

extern crate alloc;

mod algoid;
mod from_sexp;
mod pss;
mod sexp;
mod to_sexp;
mod values;

pub use crate::{
    algoid::{get_algorithm, AlgoIdent, Carrier, Parameters},
    from_sexp::{algoinfo_from_sexp, ecdh_enc_val_from_sexp, keyinfo_from_sexp},
    pss::{parse_pss_params, PssParams},
    sexp::Sexp,
    to_sexp::{cryptval_to_sexp, ecdh_enc_val_to_sexp, keyinfo_to_sexp, CryptValKind},
};
