//! The SomonScript compiler core (`spec.md` §6): lexer, parser, type
//! checker, code generator and module subsystem wired into the external
//! entry points `compile`, `loadModule`, `compileModule`, `bundle`,
//! `validate`.

mod compile;
mod modules;

pub use compile::{compile, CompileOptions, CompileResult, Target};
pub use modules::{bundle, compile_module, load_module, validate, BundleRequest, OsIo};

pub use somon_common::{Category, Diagnostic, Severity};
pub use somon_module::{BundleError, CircularPolicy, LoadError, Module, ResolveOptions, ValidationResult};
