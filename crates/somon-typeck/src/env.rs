//! Lexical symbol table with scope snapshot/restore (`spec.md` §4.3:
//! "entering a function/block snapshots the table; leaving restores it").

use crate::ty::Type;
use rustc_hash::FxHashMap;

pub struct SymbolTable {
    scopes: Vec<FxHashMap<String, Type>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            scopes: vec![FxHashMap::default()],
        }
    }

    /// Snapshot the table by pushing a fresh scope frame.
    pub fn enter_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    /// Restore the table by popping the innermost scope frame.
    pub fn exit_scope(&mut self) {
        assert!(self.scopes.len() > 1, "cannot exit the global scope");
        self.scopes.pop();
    }

    pub fn define(&mut self, name: impl Into<String>, ty: Type) {
        self.scopes
            .last_mut()
            .expect("scope stack is never empty")
            .insert(name.into(), ty);
    }

    pub fn lookup(&self, name: &str) -> Option<&Type> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_finds_innermost_binding() {
        let mut table = SymbolTable::new();
        table.define("x", Type::string());
        table.enter_scope();
        table.define("x", Type::number());
        assert_eq!(table.lookup("x"), Some(&Type::number()));
        table.exit_scope();
        assert_eq!(table.lookup("x"), Some(&Type::string()));
    }

    #[test]
    fn lookup_falls_through_to_outer_scope() {
        let mut table = SymbolTable::new();
        table.define("outer", Type::boolean());
        table.enter_scope();
        assert_eq!(table.lookup("outer"), Some(&Type::boolean()));
    }

    #[test]
    fn unknown_name_is_none() {
        let table = SymbolTable::new();
        assert_eq!(table.lookup("missing"), None);
    }

    #[test]
    #[should_panic]
    fn exit_scope_on_global_panics() {
        let mut table = SymbolTable::new();
        table.exit_scope();
    }
}
