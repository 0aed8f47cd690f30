//! Types shared across every stage of the SomonScript compiler: source
//! positions, the token model, diagnostics, and the module dependency graph.

mod diagnostic;
mod module_graph;
mod position;
mod token;

pub use diagnostic::{codes, Category, Diagnostic, Severity};
pub use module_graph::{topological_sort, CycleError, ModuleGraph, ModuleId, ModuleInfo};
pub use position::Position;
pub use token::{keyword_from_str, Token, TokenKind};
