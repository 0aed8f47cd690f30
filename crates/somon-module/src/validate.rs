//! `validate() -> {isValid, errors[]}` (`spec.md` §4.5, "validate").
//!
//! Runs a cycle check over the already-loaded graph, then re-resolves every
//! recorded dependency of every module to surface files that moved or were
//! deleted since loading.

use crate::loader::{Loader, ModuleIo};
use crate::registry::Registry;
use crate::resolver::{self, ResolveOptions};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

pub fn validate(loader: &Loader, io: &dyn ModuleIo, options: &ResolveOptions) -> ValidationResult {
    let mut errors = Vec::new();
    let registry = Registry::new(&loader.graph);

    for cycle in registry.cycles() {
        let names: Vec<String> = cycle.iter().map(|id| registry.path_of(*id).to_string()).collect();
        errors.push(format!("circular dependency: {}", names.join(" -> ")));
    }

    for module in loader.modules() {
        let module_dir = Path::new(&module.path).parent().unwrap_or_else(|| Path::new("."));
        let placeholder = module_dir.join("__enclosing_module__");
        for dependency in &module.dependencies {
            if let Err(e) = resolver::resolve(dependency, &placeholder, options, io) {
                errors.push(format!("{}: {e}", module.path));
            }
        }
    }

    ValidationResult { is_valid: errors.is_empty(), errors }
}
