//! Type errors and warnings (`spec.md` §4.3). The error code set is closed
//! and stable -- it is part of the external contract (`spec.md` §6).

use crate::ty::Type;
use somon_common::{codes, Category, Diagnostic, Position};

#[derive(Debug, Clone, PartialEq)]
pub enum TypeError {
    NotAssignable {
        source: Type,
        target: Type,
        position: Position,
    },
    ClassNotFound {
        name: String,
        position: Position,
    },
    InvalidExtends {
        name: String,
        position: Position,
    },
    CircularInheritance {
        cycle: Vec<String>,
        position: Position,
    },
}

impl TypeError {
    pub fn code(&self) -> &'static str {
        match self {
            TypeError::NotAssignable { .. } => codes::TYPE_NOT_ASSIGNABLE,
            TypeError::ClassNotFound { .. } => codes::CLASS_NOT_FOUND,
            TypeError::InvalidExtends { .. } => codes::INVALID_EXTENDS,
            TypeError::CircularInheritance { .. } => codes::CIRCULAR_INHERITANCE,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            TypeError::NotAssignable { position, .. }
            | TypeError::ClassNotFound { position, .. }
            | TypeError::InvalidExtends { position, .. }
            | TypeError::CircularInheritance { position, .. } => *position,
        }
    }

    pub fn message(&self) -> String {
        match self {
            TypeError::NotAssignable { source, target, .. } => {
                format!("type '{source}' is not assignable to type '{target}'")
            }
            TypeError::ClassNotFound { name, .. } => {
                format!("base class '{name}' was not found")
            }
            TypeError::InvalidExtends { name, .. } => {
                format!("'{name}' is not a class and cannot be extended")
            }
            TypeError::CircularInheritance { cycle, .. } => {
                format!("circular inheritance: {}", cycle.join(" -> "))
            }
        }
    }

    /// Render as the external `Diagnostic` contract (`spec.md` §6).
    pub fn to_diagnostic(&self, file: Option<&str>, snippet: impl Into<String>) -> Diagnostic {
        let diag = Diagnostic::error(self.code(), self.message(), self.position(), snippet, Category::Type);
        match file {
            Some(file) => diag.with_file(file),
            None => diag,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeWarning {
    UnreachableCode { position: Position },
    UnusedImport { name: String, position: Position },
}

impl TypeWarning {
    pub fn code(&self) -> &'static str {
        match self {
            TypeWarning::UnreachableCode { .. } => codes::UNREACHABLE_CODE,
            TypeWarning::UnusedImport { .. } => codes::UNUSED_IMPORT,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            TypeWarning::UnreachableCode { position } | TypeWarning::UnusedImport { position, .. } => *position,
        }
    }

    pub fn message(&self) -> String {
        match self {
            TypeWarning::UnreachableCode { .. } => "unreachable code".to_string(),
            TypeWarning::UnusedImport { name, .. } => format!("'{name}' is imported but never used"),
        }
    }

    pub fn to_diagnostic(&self, file: Option<&str>, snippet: impl Into<String>) -> Diagnostic {
        let diag = Diagnostic::warning(self.code(), self.message(), self.position(), snippet, Category::Validation);
        match file {
            Some(file) => diag.with_file(file),
            None => diag,
        }
    }
}
