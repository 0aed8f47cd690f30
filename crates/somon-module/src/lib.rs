//! Module resolution, loading, dependency tracking, and bundling
//! (`spec.md` §4.5).

mod bundler;
mod loader;
mod registry;
mod resolver;
mod validate;

pub use bundler::{bundle, BundleError, BundleOptions};
pub use loader::{CircularPolicy, LoadError, Loader, Module, ModuleIo, ModuleStatus};
pub use registry::Registry;
pub use resolver::{resolve, FileSystem, ResolveError, ResolveOptions, Resolved, DEFAULT_EXTENSIONS};
pub use validate::{validate, ValidationResult};
