//! Canonical symbolic key expressions (§6 "Symbolic expression format").
//!
//! A minimal s-expression: a list is parenthesised, an atom is
//! `<ascii-decimal-length>:<raw-bytes>`, no whitespace and no comments
//! anywhere in the wire form. This is the representation `keyinfo_to_sexp`/
//! `cryptval_to_sexp` emit and `keyinfo_from_sexp`/`algoinfo_from_sexp`
//! consume.

use alloc::{vec, vec::Vec};
use der::{ErrorKind, Result};

/// One symbolic expression: either a leaf byte string, or an ordered list of
/// sub-expressions.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Sexp {
    /// A leaf atom.
    Atom(Vec<u8>),
    /// An ordered list of sub-expressions, e.g. `(rsa (n ...) (e ...))`.
    List(Vec<Sexp>),
}

impl Sexp {
    /// Build an atom from raw bytes.
    pub fn atom(bytes: impl Into<Vec<u8>>) -> Self {
        Sexp::Atom(bytes.into())
    }

    /// Build an atom from a UTF-8 string (used for algorithm/parameter
    /// names, which are always ASCII).
    pub fn atom_str(s: &str) -> Self {
        Sexp::Atom(s.as_bytes().to_vec())
    }

    /// Build a `(name value...)` list whose first element is the atom
    /// `name` -- the shape every named field in the grammar uses.
    pub fn tagged(name: &str, rest: Vec<Sexp>) -> Self {
        let mut items = vec![Sexp::atom_str(name)];
        items.extend(rest);
        Sexp::List(items)
    }

    /// View this expression as an atom's bytes.
    pub fn as_atom(&self) -> Result<&[u8]> {
        match self {
            Sexp::Atom(bytes) => Ok(bytes),
            Sexp::List(_) => Err(ErrorKind::UnknownSexp.into()),
        }
    }

    /// View this expression as a list's elements.
    pub fn as_list(&self) -> Result<&[Sexp]> {
        match self {
            Sexp::List(items) => Ok(items),
            Sexp::Atom(_) => Err(ErrorKind::UnknownSexp.into()),
        }
    }

    /// For a `(name value...)` list, return `name` and the remaining
    /// elements.
    pub fn tagged_parts(&self) -> Result<(&str, &[Sexp])> {
        let items = self.as_list()?;
        let (head, rest) = items.split_first().ok_or(ErrorKind::InvalidSexp)?;
        let name = core::str::from_utf8(head.as_atom()?).map_err(|_| ErrorKind::InvalidSexp)?;
        Ok((name, rest))
    }

    /// Find the first child list whose tag name is `name`, inside a list
    /// expression, e.g. looking up `(curve ...)` inside `(ecc (curve ...)
    /// (q ...))`.
    pub fn find(&self, name: &str) -> Option<&Sexp> {
        self.as_list().ok()?.iter().find(|item| {
            item.tagged_parts()
                .map(|(tag, _)| tag == name)
                .unwrap_or(false)
        })
    }

    /// Serialise this expression into its canonical wire form, appending to
    /// `out`.
    pub fn write(&self, out: &mut Vec<u8>) {
        match self {
            Sexp::Atom(bytes) => {
                let mut len_buf = Vec::new();
                write_decimal(bytes.len(), &mut len_buf);
                out.extend_from_slice(&len_buf);
                out.push(b':');
                out.extend_from_slice(bytes);
            }
            Sexp::List(items) => {
                out.push(b'(');
                for item in items {
                    item.write(out);
                }
                out.push(b')');
            }
        }
    }

    /// Serialise this expression into a freshly allocated byte vector.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write(&mut out);
        out
    }

    /// Parse one expression from `input`, returning it and the unconsumed
    /// remainder. `input` must not contain leading whitespace -- the
    /// grammar has none.
    pub fn parse(input: &[u8]) -> Result<(Self, &[u8])> {
        match input.first() {
            Some(b'(') => {
                let mut rest = &input[1..];
                let mut items = Vec::new();
                loop {
                    match rest.first() {
                        Some(b')') => {
                            rest = &rest[1..];
                            break;
                        }
                        Some(_) => {
                            let (item, tail) = Sexp::parse(rest)?;
                            items.push(item);
                            rest = tail;
                        }
                        None => return Err(ErrorKind::InvalidSexp.into()),
                    }
                }
                Ok((Sexp::List(items), rest))
            }
            Some(c) if c.is_ascii_digit() => {
                let mut len: usize = 0;
                let mut idx = 0;
                while let Some(&c) = input.get(idx) {
                    if c == b':' {
                        break;
                    }
                    if !c.is_ascii_digit() {
                        return Err(ErrorKind::InvalidSexp.into());
                    }
                    len = len
                        .checked_mul(10)
                        .and_then(|n| n.checked_add(usize::from(c - b'0')))
                        .ok_or(ErrorKind::InvalidSexp)?;
                    idx += 1;
                }
                if input.get(idx) != Some(&b':') {
                    return Err(ErrorKind::InvalidSexp.into());
                }
                let value_start = idx + 1;
                let value_end = value_start.checked_add(len).ok_or(ErrorKind::InvalidSexp)?;
                let bytes = input
                    .get(value_start..value_end)
                    .ok_or(ErrorKind::InvalidSexp)?;
                Ok((Sexp::Atom(bytes.to_vec()), &input[value_end..]))
            }
            _ => Err(ErrorKind::InvalidSexp.into()),
        }
    }

    /// Parse a complete expression from `input`, failing if any bytes are
    /// left over.
    pub fn from_bytes(input: &[u8]) -> Result<Self> {
        let (expr, rest) = Sexp::parse(input)?;
        if !rest.is_empty() {
            return Err(ErrorKind::InvalidSexp.into());
        }
        Ok(expr)
    }
}

fn write_decimal(mut value: usize, out: &mut Vec<u8>) {
    if value == 0 {
        out.push(b'0');
        return;
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(b'0' + (value % 10) as u8);
        value /= 10;
    }
    digits.reverse();
    out.extend_from_slice(&digits);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_atom() {
        let expr = Sexp::atom_str("hello");
        let bytes = expr.to_bytes();
        assert_eq!(bytes, b"5:hello");
        assert_eq!(Sexp::from_bytes(&bytes).unwrap(), expr);
    }

    #[test]
    fn round_trips_nested_list() {
        let expr = Sexp::tagged(
            "public-key",
            vec![Sexp::tagged(
                "rsa",
                vec![
                    Sexp::tagged("n", vec![Sexp::atom(vec![1, 2, 3])]),
                    Sexp::tagged("e", vec![Sexp::atom(vec![1, 0, 1])]),
                ],
            )],
        );
        let bytes = expr.to_bytes();
        assert_eq!(Sexp::from_bytes(&bytes).unwrap(), expr);
        assert!(!bytes.iter().any(u8::is_ascii_whitespace));
    }

    #[test]
    fn rejects_trailing_garbage() {
        let err = Sexp::from_bytes(b"3:abcX").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSexp);
    }

    #[test]
    fn tagged_parts_splits_name_and_rest() {
        let expr = Sexp::tagged("q", vec![Sexp::atom(vec![9, 9])]);
        let (name, rest) = expr.tagged_parts().unwrap();
        assert_eq!(name, "q");
        assert_eq!(rest.len(), 1);
    }

    #[test]
    fn find_locates_named_child() {
        let expr = Sexp::List(vec![
            Sexp::tagged("curve", vec![Sexp::atom_str("Ed25519")]),
            Sexp::tagged("q", vec![Sexp::atom(vec![0xAB])]),
        ]);
        let curve = expr.find("curve").unwrap();
        assert_eq!(curve.tagged_parts().unwrap().0, "curve");
        assert!(expr.find("missing").is_none());
    }
}
