//! `load(specifier, fromFile) -> Module` (`spec.md` §4.5, "Loader").

use crate::resolver::{self, FileSystem, ResolveError, ResolveOptions};
use rustc_hash::{FxHashMap, FxHashSet};
use somon_common::{ModuleGraph, ModuleId};
use somon_parser::{ExportKind, Program, Stmt, StmtKind};
use std::path::Path;

/// The loader's only I/O surface beyond resolution: reading a resolved
/// file's contents.
pub trait ModuleIo: FileSystem {
    fn read(&self, path: &Path) -> std::io::Result<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircularPolicy {
    Error,
    Warn,
    Ignore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleStatus {
    Loading,
    Loaded,
}

#[derive(Debug, Clone)]
pub struct Module {
    pub id: ModuleId,
    pub path: String,
    pub source: String,
    pub ast: Program,
    pub dependencies: Vec<String>,
    pub status: ModuleStatus,
}

#[derive(Debug)]
pub enum LoadError {
    Resolve(ResolveError),
    Read { path: String, message: String },
    Lex { path: String, message: String },
    Parse { path: String, error_count: usize },
    Circular { cycle: Vec<String> },
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Resolve(e) => write!(f, "{e}"),
            LoadError::Read { path, message } => write!(f, "cannot read '{path}': {message}"),
            LoadError::Lex { path, message } => write!(f, "lex error in '{path}': {message}"),
            LoadError::Parse { path, error_count } => write!(f, "{error_count} parse error(s) in '{path}'"),
            LoadError::Circular { cycle } => write!(f, "circular dependency: {}", cycle.join(" -> ")),
        }
    }
}

impl std::error::Error for LoadError {}

pub struct Loader<'io> {
    io: &'io dyn ModuleIo,
    options: ResolveOptions,
    policy: CircularPolicy,
    cache: FxHashMap<String, Module>,
    loading: FxHashSet<String>,
    loading_order: Vec<String>,
    pub graph: ModuleGraph,
    pub warnings: Vec<String>,
}

impl<'io> Loader<'io> {
    pub fn new(io: &'io dyn ModuleIo, options: ResolveOptions, policy: CircularPolicy) -> Self {
        Self {
            io,
            options,
            policy,
            cache: FxHashMap::default(),
            loading: FxHashSet::default(),
            loading_order: Vec::new(),
            graph: ModuleGraph::new(),
            warnings: Vec::new(),
        }
    }

    /// Idempotent: loading the same resolved path twice returns the same
    /// cached `ModuleId` (`spec.md` §8, universal invariant 8).
    pub fn load(&mut self, specifier: &str, from_file: &Path) -> Result<ModuleId, LoadError> {
        self.load_internal(specifier, from_file, true)
    }

    fn load_internal(&mut self, specifier: &str, from_file: &Path, is_entry: bool) -> Result<ModuleId, LoadError> {
        let resolved = resolver::resolve(specifier, from_file, &self.options, self.io).map_err(LoadError::Resolve)?;
        let key = resolved.absolute_path.to_string_lossy().into_owned();

        if let Some(module) = self.cache.get(&key) {
            return Ok(module.id);
        }

        if self.loading.contains(&key) {
            let start = self.loading_order.iter().position(|p| p == &key).unwrap_or(0);
            let mut cycle = self.loading_order[start..].to_vec();
            cycle.push(key.clone());
            return match self.policy {
                CircularPolicy::Error => Err(LoadError::Circular { cycle }),
                CircularPolicy::Warn => {
                    self.warnings.push(format!("circular dependency: {}", cycle.join(" -> ")));
                    Ok(self.graph.add_module(key, false))
                }
                CircularPolicy::Ignore => Ok(self.graph.add_module(key, false)),
            };
        }

        self.loading.insert(key.clone());
        self.loading_order.push(key.clone());
        let id = self.graph.add_module(key.clone(), is_entry);

        let source = self
            .io
            .read(&resolved.absolute_path)
            .map_err(|e| LoadError::Read { path: key.clone(), message: e.to_string() })?;
        let source = strip_bom(&source);

        let tokens = somon_lexer::tokenize(&source)
            .map_err(|e| LoadError::Lex { path: key.clone(), message: e.to_string() })?;
        let ast = somon_parser::parse(tokens)
            .map_err(|errors| LoadError::Parse { path: key.clone(), error_count: errors.len() })?;

        let dependencies = extract_dependencies(&ast.body);
        for dep in &dependencies {
            if let Ok(dep_id) = self.load_internal(dep, &resolved.absolute_path, false) {
                self.graph.add_dependency(id, dep_id);
            }
        }

        self.loading.remove(&key);
        self.loading_order.pop();
        self.cache.insert(
            key.clone(),
            Module { id, path: key, source, ast, dependencies, status: ModuleStatus::Loaded },
        );
        Ok(id)
    }

    pub fn module(&self, id: ModuleId) -> Option<&Module> {
        self.cache.values().find(|m| m.id == id)
    }

    pub fn module_by_path(&self, path: &str) -> Option<&Module> {
        self.cache.get(path)
    }

    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.cache.values()
    }
}

fn strip_bom(source: &str) -> String {
    source.strip_prefix('\u{feff}').unwrap_or(source).to_string()
}

fn extract_dependencies(body: &[Stmt]) -> Vec<String> {
    let mut deps = Vec::new();
    for stmt in body {
        match &stmt.kind {
            StmtKind::Import { source, .. } => deps.push(source.clone()),
            StmtKind::Export(ExportKind::Named { source: Some(source), .. }) => deps.push(source.clone()),
            StmtKind::Export(ExportKind::Wildcard { source }) => deps.push(source.clone()),
            StmtKind::Export(ExportKind::Declaration(inner)) => deps.extend(extract_dependencies(std::slice::from_ref(inner))),
            StmtKind::NamespaceDeclaration { body, .. } => deps.extend(extract_dependencies(body)),
            _ => {}
        }
    }
    deps
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap as FileMap;
    use std::path::PathBuf;

    struct FakeIo(FileMap<PathBuf, String>);

    impl FileSystem for FakeIo {
        fn exists(&self, path: &Path) -> bool {
            self.0.contains_key(path)
        }
        fn package_main(&self, _dir: &Path) -> Option<String> {
            None
        }
    }

    impl ModuleIo for FakeIo {
        fn read(&self, path: &Path) -> std::io::Result<String> {
            self.0.get(path).cloned().ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "missing"))
        }
    }

    fn fake_io(files: &[(&str, &str)]) -> FakeIo {
        FakeIo(files.iter().map(|(path, src)| (PathBuf::from(path), src.to_string())).collect())
    }

    #[test]
    fn loads_entry_and_its_import() {
        let io = fake_io(&[
            ("/proj/main.som", "содир { х } аз \"./lib.som\";\n"),
            ("/proj/lib.som", "содирот собит х = 1;\n"),
        ]);
        let mut loader = Loader::new(&io, ResolveOptions::default(), CircularPolicy::Error);
        let id = loader.load("/proj/main.som", Path::new("/proj/main.som")).unwrap();
        assert_eq!(loader.module(id).unwrap().dependencies, vec!["./lib.som".to_string()]);
        assert_eq!(loader.graph.module_count(), 2);
    }

    #[test]
    fn loading_the_same_path_twice_is_idempotent() {
        let io = fake_io(&[("/proj/main.som", "собит х = 1;\n")]);
        let mut loader = Loader::new(&io, ResolveOptions::default(), CircularPolicy::Error);
        let first = loader.load("/proj/main.som", Path::new("/proj/main.som")).unwrap();
        let second = loader.load("/proj/main.som", Path::new("/proj/main.som")).unwrap();
        assert_eq!(first, second);
        assert_eq!(loader.graph.module_count(), 1);
    }

    #[test]
    fn circular_import_under_error_policy_fails() {
        let io = fake_io(&[
            ("/proj/a.som", "содир { б } аз \"./b.som\";\n"),
            ("/proj/b.som", "содир { а } аз \"./a.som\";\n"),
        ]);
        let mut loader = Loader::new(&io, ResolveOptions::default(), CircularPolicy::Error);
        let err = loader.load("/proj/a.som", Path::new("/proj/a.som")).unwrap_err();
        assert!(matches!(err, LoadError::Circular { .. }));
    }

    #[test]
    fn circular_import_under_warn_policy_succeeds_with_a_warning() {
        let io = fake_io(&[
            ("/proj/a.som", "содир { б } аз \"./b.som\";\n"),
            ("/proj/b.som", "содир { а } аз \"./a.som\";\n"),
        ]);
        let mut loader = Loader::new(&io, ResolveOptions::default(), CircularPolicy::Warn);
        loader.load("/proj/a.som", Path::new("/proj/a.som")).unwrap();
        assert!(!loader.warnings.is_empty());
    }
}
