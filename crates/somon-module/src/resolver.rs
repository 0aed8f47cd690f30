//! Specifier resolution (`spec.md` §4.5, "Resolver").
//!
//! File existence is injected through [`FileSystem`] rather than touched
//! directly, so resolution can be exercised in tests against an in-memory
//! fixture instead of the real disk.

use std::path::{Path, PathBuf};

pub const DEFAULT_EXTENSIONS: &[&str] = &[".som", ".js", ".json"];

/// The resolver's only I/O surface. A real driver backs this with
/// `std::fs`; tests back it with a fixed set of known paths.
pub trait FileSystem {
    fn exists(&self, path: &Path) -> bool;
    /// Contents of the `main` field in `dir/package.json`, if present.
    fn package_main(&self, dir: &Path) -> Option<String>;
}

#[derive(Debug, Clone)]
pub struct ResolveOptions {
    pub extensions: Vec<String>,
    /// Prefix -> candidate directory, checked before `node_modules` search.
    pub path_mappings: Vec<(String, PathBuf)>,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            path_mappings: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub absolute_path: PathBuf,
    pub extension: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveError {
    pub specifier: String,
    pub tried: Vec<PathBuf>,
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cannot resolve '{}', tried:", self.specifier)?;
        for path in &self.tried {
            write!(f, "\n  {}", path.display())?;
        }
        Ok(())
    }
}

impl std::error::Error for ResolveError {}

/// `resolve(specifier, fromFile) -> {absolutePath, extension}`.
pub fn resolve(
    specifier: &str,
    from_file: &Path,
    options: &ResolveOptions,
    fs: &dyn FileSystem,
) -> Result<Resolved, ResolveError> {
    if specifier.starts_with('.') || specifier.starts_with('/') {
        return resolve_relative(specifier, from_file, options, fs);
    }
    for (prefix, dir) in &options.path_mappings {
        if let Some(rest) = specifier.strip_prefix(prefix) {
            let candidate = dir.join(rest.trim_start_matches('/'));
            if let Some(resolved) = try_candidate(&candidate, options, fs, &mut Vec::new()) {
                return Ok(resolved);
            }
        }
    }
    resolve_node_modules(specifier, from_file, options, fs)
}

fn resolve_relative(
    specifier: &str,
    from_file: &Path,
    options: &ResolveOptions,
    fs: &dyn FileSystem,
) -> Result<Resolved, ResolveError> {
    let base_dir = from_file.parent().unwrap_or_else(|| Path::new("."));
    let candidate = if specifier.starts_with('/') { PathBuf::from(specifier) } else { base_dir.join(specifier) };
    let mut tried = Vec::new();
    try_candidate(&candidate, options, fs, &mut tried)
        .ok_or_else(|| ResolveError { specifier: specifier.to_string(), tried })
}

/// Exact file first, then each extension, then `<candidate>/index.<ext>`.
fn try_candidate(
    candidate: &Path,
    options: &ResolveOptions,
    fs: &dyn FileSystem,
    tried: &mut Vec<PathBuf>,
) -> Option<Resolved> {
    tried.push(candidate.to_path_buf());
    if fs.exists(candidate) {
        let extension = candidate.extension().map(|e| format!(".{}", e.to_string_lossy())).unwrap_or_default();
        return Some(Resolved { absolute_path: candidate.to_path_buf(), extension });
    }
    for ext in &options.extensions {
        let with_ext = append_extension(candidate, ext);
        tried.push(with_ext.clone());
        if fs.exists(&with_ext) {
            return Some(Resolved { absolute_path: with_ext, extension: ext.clone() });
        }
    }
    for ext in &options.extensions {
        let index = candidate.join(format!("index{ext}"));
        tried.push(index.clone());
        if fs.exists(&index) {
            return Some(Resolved { absolute_path: index, extension: ext.clone() });
        }
    }
    None
}

fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(ext);
    PathBuf::from(name)
}

/// Walk `node_modules` directories from `fromFile`'s directory up to the
/// filesystem root, honoring each package's `main` field.
fn resolve_node_modules(
    specifier: &str,
    from_file: &Path,
    options: &ResolveOptions,
    fs: &dyn FileSystem,
) -> Result<Resolved, ResolveError> {
    let mut tried = Vec::new();
    let mut dir = from_file.parent().map(Path::to_path_buf);
    while let Some(current) = dir {
        let package_dir = current.join("node_modules").join(specifier);
        let main = fs.package_main(&package_dir).unwrap_or_else(|| "index.js".to_string());
        let entry = package_dir.join(&main);
        if let Some(resolved) = try_candidate(&entry, options, fs, &mut tried) {
            return Ok(resolved);
        }
        dir = current.parent().map(Path::to_path_buf);
    }
    Err(ResolveError { specifier: specifier.to_string(), tried })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct FakeFs(HashSet<PathBuf>);

    impl FileSystem for FakeFs {
        fn exists(&self, path: &Path) -> bool {
            self.0.contains(path)
        }
        fn package_main(&self, _dir: &Path) -> Option<String> {
            None
        }
    }

    #[test]
    fn exact_file_wins_over_index() {
        let fs = FakeFs(HashSet::from([PathBuf::from("/proj/x.som"), PathBuf::from("/proj/x/index.som")]));
        let resolved = resolve("./x.som", Path::new("/proj/main.som"), &ResolveOptions::default(), &fs).unwrap();
        assert_eq!(resolved.absolute_path, PathBuf::from("/proj/x.som"));
    }

    #[test]
    fn falls_back_to_extension_search() {
        let fs = FakeFs(HashSet::from([PathBuf::from("/proj/x.som")]));
        let resolved = resolve("./x", Path::new("/proj/main.som"), &ResolveOptions::default(), &fs).unwrap();
        assert_eq!(resolved.absolute_path, PathBuf::from("/proj/x.som"));
    }

    #[test]
    fn falls_back_to_index_file() {
        let fs = FakeFs(HashSet::from([PathBuf::from("/proj/x/index.som")]));
        let resolved = resolve("./x", Path::new("/proj/main.som"), &ResolveOptions::default(), &fs).unwrap();
        assert_eq!(resolved.absolute_path, PathBuf::from("/proj/x/index.som"));
    }

    #[test]
    fn missing_specifier_reports_tried_paths() {
        let fs = FakeFs(HashSet::new());
        let err = resolve("./missing", Path::new("/proj/main.som"), &ResolveOptions::default(), &fs).unwrap_err();
        assert!(!err.tried.is_empty());
    }
}
