//! Recursive-descent parser: token stream -> [`crate::Module`].

use crate::{
    ast::{Field, Primitive, Tagging, TypeDef, TypeExpr},
    lexer::{tokenize, Token},
    Module,
};
use alloc::{boxed::Box, string::String, vec::Vec};
use der::{Class, ErrorKind, Result};

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> Parser<'t> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Result<Token> {
        let tok = self.tokens.get(self.pos).cloned().ok_or(ErrorKind::InvalidValue)?;
        self.pos += 1;
        Ok(tok)
    }

    fn expect_word(&mut self, word: &str) -> Result<()> {
        match self.bump()? {
            Token::Word(w) if w.eq_ignore_ascii_case(word) => Ok(()),
            _ => Err(ErrorKind::InvalidValue.into()),
        }
    }

    fn expect(&mut self, tok: Token) -> Result<()> {
        if self.bump()? == tok {
            Ok(())
        } else {
            Err(ErrorKind::InvalidValue.into())
        }
    }

    fn peek_is_word(&self, word: &str) -> bool {
        matches!(self.peek(), Some(Token::Word(w)) if w.eq_ignore_ascii_case(word))
    }

    fn ident(&mut self) -> Result<String> {
        match self.bump()? {
            Token::Word(w) => Ok(w),
            _ => Err(ErrorKind::InvalidValue.into()),
        }
    }

    /// Parse a module: `Name DEFINITIONS [IMPLICIT|EXPLICIT] TAGS ::= BEGIN
    /// ... END`.
    fn module(&mut self) -> Result<Module> {
        let name = self.ident()?;
        self.expect_word("DEFINITIONS")?;

        // Optional `IMPLICIT TAGS` / `EXPLICIT TAGS` header; only affects
        // nothing in this parser (every field spells out its own tagging),
        // but real ASN.1 modules carry it, so tolerate and discard it.
        if self.peek_is_word("IMPLICIT") || self.peek_is_word("EXPLICIT") {
            self.bump()?;
            self.expect_word("TAGS")?;
        }

        self.expect(Token::Assign)?;
        self.expect_word("BEGIN")?;

        let mut defs = Vec::new();
        while !self.peek_is_word("END") {
            defs.push(self.type_def()?);
        }
        self.expect_word("END")?;

        Ok(Module::new(name, defs))
    }

    fn type_def(&mut self) -> Result<TypeDef> {
        let name = self.ident()?;
        self.expect(Token::Assign)?;
        let ty = self.type_expr()?;
        Ok(TypeDef { name, ty })
    }

    /// Parse a type expression, not including a following `OPTIONAL`.
    fn type_expr(&mut self) -> Result<TypeExpr> {
        if matches!(self.peek(), Some(Token::LBracket)) {
            return self.tagged_type();
        }

        let word = match self.bump()? {
            Token::Word(w) => w,
            _ => return Err(ErrorKind::InvalidValue.into()),
        };

        let upper = word.to_ascii_uppercase();
        Ok(match upper.as_str() {
            "SEQUENCE" => {
                if self.peek_is_word("OF") {
                    self.bump()?;
                    TypeExpr::SequenceOf(Box::new(self.type_expr()?))
                } else {
                    TypeExpr::Sequence(self.field_list()?)
                }
            }
            "SET" => {
                if self.peek_is_word("OF") {
                    self.bump()?;
                    TypeExpr::SetOf(Box::new(self.type_expr()?))
                } else {
                    TypeExpr::Set(self.field_list()?)
                }
            }
            "CHOICE" => TypeExpr::Choice(self.field_list()?),
            "ANY" => {
                // `ANY DEFINED BY fieldName` -- the dispatch field name isn't
                // needed by this schema-driven decoder (§4.D treats `ANY` as
                // an opaque leaf unconditionally); tolerate and discard it.
                if self.peek_is_word("DEFINED") {
                    self.bump()?;
                    self.expect_word("BY")?;
                    self.ident()?;
                }
                TypeExpr::Any
            }
            "BOOLEAN" => TypeExpr::Primitive(Primitive::Boolean),
            "INTEGER" => TypeExpr::Primitive(Primitive::Integer),
            "NULL" => TypeExpr::Primitive(Primitive::Null),
            "UTCTIME" => TypeExpr::Primitive(Primitive::UtcTime),
            "GENERALIZEDTIME" => TypeExpr::Primitive(Primitive::GeneralizedTime),
            "UTF8STRING" => TypeExpr::Primitive(Primitive::Utf8String),
            "PRINTABLESTRING" => TypeExpr::Primitive(Primitive::PrintableString),
            "IA5STRING" => TypeExpr::Primitive(Primitive::Ia5String),
            "T61STRING" => TypeExpr::Primitive(Primitive::T61String),
            "BMPSTRING" => TypeExpr::Primitive(Primitive::BmpString),
            "UNIVERSALSTRING" => TypeExpr::Primitive(Primitive::UniversalString),
            "BIT" => {
                self.expect_word("STRING")?;
                TypeExpr::Primitive(Primitive::BitString)
            }
            "OCTET" => {
                self.expect_word("STRING")?;
                TypeExpr::Primitive(Primitive::OctetString)
            }
            "OBJECT" => {
                self.expect_word("IDENTIFIER")?;
                TypeExpr::Primitive(Primitive::ObjectIdentifier)
            }
            _ => TypeExpr::Reference(word),
        })
    }

    fn tagged_type(&mut self) -> Result<TypeExpr> {
        self.expect(Token::LBracket)?;
        let number = match self.bump()? {
            Token::Number(n) => n,
            _ => return Err(ErrorKind::InvalidValue.into()),
        };
        self.expect(Token::RBracket)?;

        let tagging = if self.peek_is_word("EXPLICIT") {
            self.bump()?;
            Tagging::Explicit
        } else if self.peek_is_word("IMPLICIT") {
            self.bump()?;
            Tagging::Implicit
        } else {
            // Default tagging when unspecified: implicit, matching the
            // `IMPLICIT TAGS` module header every grammar this workspace
            // loads declares.
            Tagging::Implicit
        };

        let inner = self.type_expr()?;
        Ok(TypeExpr::Tagged {
            class: Class::ContextSpecific,
            number: number as u8,
            tagging,
            inner: Box::new(inner),
        })
    }

    fn field_list(&mut self) -> Result<Vec<Field>> {
        self.expect(Token::LBrace)?;
        let mut fields = Vec::new();
        if matches!(self.peek(), Some(Token::RBrace)) {
            self.bump()?;
            return Ok(fields);
        }
        loop {
            let name = self.ident()?;
            let ty = self.type_expr()?;
            let optional = if self.peek_is_word("OPTIONAL") {
                self.bump()?;
                true
            } else {
                false
            };
            fields.push(Field { name, ty, optional });

            match self.peek() {
                Some(Token::Comma) => {
                    self.bump()?;
                }
                Some(Token::RBrace) => {
                    self.bump()?;
                    break;
                }
                _ => return Err(ErrorKind::InvalidValue.into()),
            }
        }
        Ok(fields)
    }
}

/// Parse one textual ASN.1 module definition into a [`Module`].
pub fn parse_module(src: &str) -> Result<Module> {
    let tokens = tokenize(src)?;
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
    };
    parser.module()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_sequence() {
        let module = parse_module(
            "test DEFINITIONS IMPLICIT TAGS ::= BEGIN
             Widget ::= SEQUENCE {
                 id    INTEGER,
                 name  UTF8String OPTIONAL
             }
             END",
        )
        .unwrap();

        let ty = module.get("Widget").unwrap();
        match ty {
            TypeExpr::Sequence(fields) => {
                assert_eq!(fields.len(), 2);
                assert_eq!(fields[0].name, "id");
                assert!(!fields[0].optional);
                assert_eq!(fields[1].name, "name");
                assert!(fields[1].optional);
            }
            _ => panic!("expected SEQUENCE"),
        }
    }

    #[test]
    fn parses_tagged_and_choice() {
        let module = parse_module(
            "test DEFINITIONS IMPLICIT TAGS ::= BEGIN
             Thing ::= CHOICE {
                 a [0] EXPLICIT INTEGER,
                 b [1] IMPLICIT OCTET STRING
             }
             END",
        )
        .unwrap();

        match module.get("Thing").unwrap() {
            TypeExpr::Choice(fields) => assert_eq!(fields.len(), 2),
            _ => panic!("expected CHOICE"),
        }
    }
}
