//! Source code analysis: reference extraction and module resolution.
//!
//! # Features
//!
//! - Extract ES6 `import ... from`, side-effect `import '...'`, dynamic
//!   `import()`, CommonJS `require()` and `require.resolve()` specifiers
//! - Discard external packages and platform built-ins up front
//! - Resolve relative, absolute and aliased specifiers to project files,
//!   probing extensions and implicit index files
//! - One equivalence rule for "same module" shared with the graph builder
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use prunescope::analysis::{ImportExtractor, ModuleResolver};
//! use prunescope::config::AnalysisConfig;
//!
//! let config = AnalysisConfig::default();
//! let resolver = ModuleResolver::new("/project", &config);
//! let extractor = ImportExtractor::new();
//!
//! let from = Path::new("/project/src/App.tsx");
//! for import in extractor.extract(from, "import Nav from './Nav';") {
//!     println!("{} -> {}", import.source, resolver.resolve(&import.source, from).display());
//! }
//! ```

pub mod imports;
pub mod resolver;

pub use imports::{is_external_specifier, Import, ImportExtractor, ImportKind};
pub use resolver::{
    equivalence_key, normalize_path, path_key, paths_equivalent, ModuleResolver,
};

use std::path::PathBuf;

/// A reference resolved to a concrete target path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedEdge {
    /// The referencing file
    pub from: PathBuf,
    /// The resolved target (may not exist on disk)
    pub to: PathBuf,
    /// True if the reference was a dynamic `import()`
    pub dynamic: bool,
}

impl ResolvedEdge {
    /// Resolves `import` through `resolver`.
    pub fn resolve(import: &Import, resolver: &ModuleResolver) -> Self {
        Self {
            from: import.from.clone(),
            to: resolver.resolve(&import.source, &import.from),
            dynamic: import.is_dynamic(),
        }
    }
}
