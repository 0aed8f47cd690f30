//! JavaScript code generator (`spec.md` §4.4). Turns a [`somon_parser::Program`]
//! into readable, two-space-indented ES2020-flavored JavaScript text.
//! Stateless across calls: every [`generate`] call starts with a fresh
//! depth counter and import-temporary counter.

mod builtins;
mod emit;

use emit::Generator;
use somon_parser::Program;

/// `generate(program) -> string`. Never fails on a well-formed `Program`.
pub fn generate(program: &Program) -> String {
    let mut generator = Generator::new();
    generator.emit_program(program);
    generator.finish()
}
