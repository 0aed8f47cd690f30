//! Module-system entry points (`spec.md` §6): `loadModule`, `compileModule`,
//! `bundle`, `validate`, backed by the real filesystem.

use somon_module::{
    bundle as bundle_graph, validate as validate_graph, BundleOptions, CircularPolicy, FileSystem, LoadError, Loader,
    Module, ModuleIo, ResolveOptions, ValidationResult,
};
use std::path::Path;

/// `ModuleIo` backed by `std::fs`. `package_main` reads `package.json`'s
/// `main` field with a minimal hand-rolled scan rather than pulling in a
/// JSON parser for one string field.
pub struct OsIo;

impl FileSystem for OsIo {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn package_main(&self, dir: &Path) -> Option<String> {
        let contents = std::fs::read_to_string(dir.join("package.json")).ok()?;
        let json: serde_json::Value = serde_json::from_str(&contents).ok()?;
        json.get("main")?.as_str().map(str::to_string)
    }
}

impl ModuleIo for OsIo {
    fn read(&self, path: &Path) -> std::io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// `loadModule(specifier, from) -> Module`.
pub fn load_module(specifier: &str, from: &Path) -> Result<Module, LoadError> {
    let io = OsIo;
    let mut loader = Loader::new(&io, ResolveOptions::default(), CircularPolicy::Error);
    let id = loader.load(specifier, from)?;
    Ok(loader.module(id).expect("just-loaded module is cached").clone())
}

/// `compileModule(entry) -> {code, diagnostics}` for the entry module alone
/// (dependencies are loaded for graph bookkeeping but not individually
/// compiled here; use [`bundle`] to emit a full program).
pub fn compile_module(entry: &Path) -> Result<String, LoadError> {
    let module = load_module(&entry.to_string_lossy(), entry)?;
    Ok(somon_codegen::generate(&module.ast))
}

pub struct BundleRequest<'a> {
    pub entry_point: &'a Path,
    pub externals: Vec<String>,
}

/// `bundle({entryPoint, externals[], format: 'commonjs'}) -> string`.
pub fn bundle(request: &BundleRequest) -> Result<String, String> {
    let entry_specifier = request.entry_point.to_string_lossy().into_owned();
    let io = OsIo;
    let options = ResolveOptions::default();
    let mut loader = Loader::new(&io, options.clone(), CircularPolicy::Error);
    loader.load(&entry_specifier, request.entry_point).map_err(|e| e.to_string())?;

    let bundle_options = BundleOptions { externals: request.externals.clone() };
    bundle_graph(&loader, &io, &options, &entry_specifier, &bundle_options).map_err(|e| e.to_string())
}

/// `validate() -> {isValid, errors[]}` over the transitive graph rooted at
/// `entry_point`.
pub fn validate(entry_point: &Path) -> Result<ValidationResult, LoadError> {
    let entry_specifier = entry_point.to_string_lossy().into_owned();
    let io = OsIo;
    let options = ResolveOptions::default();
    let mut loader = Loader::new(&io, options.clone(), CircularPolicy::Warn);
    loader.load(&entry_specifier, entry_point)?;
    Ok(validate_graph(&loader, &io, &options))
}
