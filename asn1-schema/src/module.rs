//! Named collections of type definitions and cross-module lookup.

use crate::ast::{TypeDef, TypeExpr};
use alloc::{string::String, vec::Vec};
use der::{ErrorKind, Result};

/// One parsed ASN.1 module: a name and its ordered type definitions.
#[derive(Debug, Clone)]
pub struct Module {
    name: String,
    defs: Vec<TypeDef>,
}

impl Module {
    pub(crate) fn new(name: String, defs: Vec<TypeDef>) -> Self {
        Module { name, defs }
    }

    /// The module's name, as declared before `DEFINITIONS`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a type by its defined name (the left side of `::=`).
    pub fn get(&self, name: &str) -> Option<&TypeExpr> {
        self.defs
            .iter()
            .find(|def| def.name == name)
            .map(|def| &def.ty)
    }

    /// Resolve a [`TypeExpr::Reference`] to the type it names, recursing
    /// through chains of references. Non-reference expressions resolve to
    /// themselves.
    pub fn resolve<'m>(&'m self, ty: &'m TypeExpr) -> Result<&'m TypeExpr> {
        let mut current = ty;
        // Bounded by the module's own definition count: a well-formed module
        // cannot have a reference chain longer than its number of type defs
        // without cycling, so this also catches reference cycles.
        for _ in 0..=self.defs.len() {
            match current {
                TypeExpr::Reference(name) => {
                    current = self.get(name).ok_or(ErrorKind::InvalidObject)?;
                }
                other => return Ok(other),
            }
        }
        Err(ErrorKind::InvalidObject.into())
    }
}

/// A set of named [`Module`]s, loaded together (this workspace always loads
/// the X.509 module `tmttv2` and the CMS module `cms`, see
/// [`crate::x509_module`] and [`crate::cms_module`]).
#[derive(Debug, Clone, Default)]
pub struct Schema {
    modules: Vec<Module>,
}

impl Schema {
    /// An empty schema with no modules loaded.
    pub fn new() -> Self {
        Schema { modules: Vec::new() }
    }

    /// Parse and add a module's grammar text to this schema.
    pub fn load(&mut self, src: &str) -> Result<()> {
        let module = crate::parser::parse_module(src)?;
        self.modules.push(module);
        Ok(())
    }

    /// Look up a loaded module by name.
    pub fn module(&self, name: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.name() == name)
    }

    /// Look up a type by `module_name`/`type_name`, as the dotted references
    /// in spec-level identifiers like `cms`/`CryptographicMessageSyntax.SignerInfos`
    /// name it.
    pub fn find(&self, module_name: &str, type_name: &str) -> Result<&TypeExpr> {
        self.module(module_name)
            .ok_or(ErrorKind::InvalidObject)?
            .get(type_name)
            .ok_or_else(|| ErrorKind::InvalidObject.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_reference_chain() {
        let mut schema = Schema::new();
        schema
            .load(
                "test DEFINITIONS IMPLICIT TAGS ::= BEGIN
                 A ::= INTEGER
                 B ::= A
                 C ::= SEQUENCE { x B }
                 END",
            )
            .unwrap();

        let module = schema.module("test").unwrap();
        let c = module.get("C").unwrap();
        let fields = match c {
            TypeExpr::Sequence(f) => f,
            _ => panic!("expected SEQUENCE"),
        };
        let resolved = module.resolve(&fields[0].ty).unwrap();
        assert!(matches!(
            resolved,
            TypeExpr::Primitive(crate::ast::Primitive::Integer)
        ));
    }

    #[test]
    fn missing_type_is_invalid_object() {
        let mut schema = Schema::new();
        schema
            .load("test DEFINITIONS IMPLICIT TAGS ::= BEGIN A ::= INTEGER END")
            .unwrap();
        assert!(schema.find("test", "Missing").is_err());
        assert!(schema.find("nope", "A").is_err());
    }
}
