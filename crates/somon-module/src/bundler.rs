//! `bundle(entry, options) -> string` (`spec.md` §4.5, "Bundler").
//!
//! Emits a self-contained CommonJS bundle: a module-id -> factory map, a
//! small caching `require` runtime, and an invocation of the entry module.

use crate::loader::{Loader, ModuleIo};
use crate::registry::Registry;
use crate::resolver::{self, ResolveOptions};
use somon_common::CycleError;
use std::fmt::Write as _;
use std::path::Path;

const RUNTIME_PRELUDE: &str = r#"const __somon_cache = {};
function __somon_require(path) {
  if (Object.prototype.hasOwnProperty.call(__somon_modules, path)) {
    if (__somon_cache[path]) {
      return __somon_cache[path].exports;
    }
    const module = { exports: {} };
    __somon_cache[path] = module;
    __somon_modules[path](module.exports, __somon_require, module);
    return module.exports;
  }
  return require(path);
}"#;

#[derive(Debug, Clone, Default)]
pub struct BundleOptions {
    pub externals: Vec<String>,
}

#[derive(Debug)]
pub enum BundleError {
    Cycle(CycleError),
    UnknownEntry(String),
}

impl std::fmt::Display for BundleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BundleError::Cycle(e) => write!(f, "{e}"),
            BundleError::UnknownEntry(path) => write!(f, "entry module '{path}' was never loaded"),
        }
    }
}

impl std::error::Error for BundleError {}

pub fn bundle(
    loader: &Loader,
    io: &dyn ModuleIo,
    resolve_options: &ResolveOptions,
    entry_path: &str,
    options: &BundleOptions,
) -> Result<String, BundleError> {
    let entry_id = loader.graph.resolve(entry_path).ok_or_else(|| BundleError::UnknownEntry(entry_path.to_string()))?;
    let registry = Registry::new(&loader.graph);
    let order = registry.topological_order(entry_id).map_err(BundleError::Cycle)?;

    let mut map_entries = String::new();
    for (i, id) in order.iter().enumerate() {
        let module = loader.module(*id).expect("every graph id loaded by this loader has a cached Module");
        let generated = somon_codegen::generate(&module.ast);
        let module_dir = Path::new(&module.path).parent().unwrap_or_else(|| Path::new("."));
        let body = rewrite_requires(&generated, module_dir, resolve_options, io, &options.externals);
        if i > 0 {
            map_entries.push_str(",\n");
        }
        let _ = write!(
            map_entries,
            "  {:?}: function (exports, require, module) {{\n{}  }}",
            module.path,
            indent_block(&body, 2)
        );
    }

    Ok(format!(
        "{RUNTIME_PRELUDE}\nconst __somon_modules = {{\n{map_entries}\n}};\n__somon_require({entry_path:?});\n"
    ))
}

fn indent_block(text: &str, levels: usize) -> String {
    let pad = "  ".repeat(levels);
    let mut out = String::new();
    for line in text.lines() {
        if line.is_empty() {
            out.push('\n');
        } else {
            out.push_str(&pad);
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

/// Rewrite `require("./x.som")`/`require("./x.js")` calls emitted by the
/// code generator into the module-map key (the dependency's resolved
/// absolute path), by re-running resolution relative to `module_dir`.
/// Specifiers in `externals` are left untouched.
fn rewrite_requires(
    code: &str,
    module_dir: &Path,
    options: &ResolveOptions,
    io: &dyn ModuleIo,
    externals: &[String],
) -> String {
    let mut out = String::with_capacity(code.len());
    let mut idx = 0;
    while idx < code.len() {
        let rest = &code[idx..];
        if rest.starts_with("require(") {
            if let Some((specifier, consumed)) = parse_require_call(rest) {
                if externals.iter().any(|e| e == &specifier) {
                    out.push_str(&rest[..consumed]);
                } else {
                    let placeholder = module_dir.join("__enclosing_module__");
                    match resolver::resolve(&specifier, &placeholder, options, io) {
                        Ok(resolved) => {
                            let key = resolved.absolute_path.to_string_lossy();
                            let _ = write!(out, "require({key:?})");
                        }
                        Err(_) => out.push_str(&rest[..consumed]),
                    }
                }
                idx += consumed;
                continue;
            }
        }
        let ch = rest.chars().next().expect("idx < code.len()");
        out.push(ch);
        idx += ch.len_utf8();
    }
    out
}

/// Parses a `require("...")`/`require('...')` call starting at `text[0]`,
/// returning the quoted specifier and the byte length consumed.
fn parse_require_call(text: &str) -> Option<(String, usize)> {
    let after_paren = &text["require(".len()..];
    let quote = after_paren.chars().next()?;
    if quote != '"' && quote != '\'' {
        return None;
    }
    let after_quote = &after_paren[quote.len_utf8()..];
    let end = after_quote.find(quote)?;
    let specifier = after_quote[..end].to_string();
    let after_specifier = &after_quote[end + quote.len_utf8()..];
    let close = after_specifier.find(')')?;
    let consumed = "require(".len() + quote.len_utf8() + end + quote.len_utf8() + close + 1;
    Some((specifier, consumed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_double_quoted_require() {
        let (specifier, consumed) = parse_require_call(r#"require("./x.js") more"#).unwrap();
        assert_eq!(specifier, "./x.js");
        assert_eq!(&r#"require("./x.js") more"#[..consumed], r#"require("./x.js")"#);
    }

    #[test]
    fn non_require_text_is_not_parsed() {
        assert!(parse_require_call("requireSomethingElse").is_none());
    }
}
