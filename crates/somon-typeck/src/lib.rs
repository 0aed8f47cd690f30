//! Structural, bidirectional type checker (`spec.md` §4.3).
//!
//! Consumes a [`somon_parser::Program`] and produces the errors/warnings that
//! the rest of the toolchain renders as [`somon_common::Diagnostic`]s. The
//! checker never fails the process itself -- a non-empty `errors` list is a
//! normal, expected result for ill-typed input.

mod check;
mod env;
mod error;
mod ty;

pub use check::{check, is_assignable, CheckResult};
pub use env::SymbolTable;
pub use error::{TypeError, TypeWarning};
pub use ty::{Member, MethodSig, Primitive, Property, Type};
