//! Import extraction for JavaScript/TypeScript.
//!
//! Extraction is pattern based: five independent scans run over every file
//! and each contributes the quoted specifiers it finds. The scans are not
//! mutually exclusive, and order and duplicates are preserved here;
//! deduplication happens when the graph is assembled.
//!
//! Specifiers naming an external package are dropped immediately. Only
//! intra-project references reach the module resolver.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::workspace::ContentCache;

/// Node.js built-in modules. Always external, with or without `node:`.
const NODE_BUILTINS: &[&str] = &[
    "assert", "buffer", "child_process", "cluster", "crypto", "dgram", "dns", "events", "fs",
    "fs/promises", "http", "http2", "https", "module", "net", "os", "path", "perf_hooks",
    "process", "querystring", "readline", "stream", "string_decoder", "timers", "tls", "tty",
    "url", "util", "v8", "vm", "worker_threads", "zlib",
];

static STATIC_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bimport\s+[\w$*{}\s,]+?\s*from\s*['"]([^'"\n]+)['"]"#).unwrap()
});

static DYNAMIC_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:\bawait\s+)?\bimport\s*\(\s*['"`]([^'"`$\n]+)['"`]\s*\)"#).unwrap()
});

static REQUIRE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\brequire\s*\(\s*['"]([^'"\n]+)['"]\s*\)"#).unwrap()
});

static REQUIRE_RESOLVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\brequire\.resolve\s*\(\s*['"]([^'"\n]+)['"]\s*[,)]"#).unwrap()
});

static SIDE_EFFECT_IMPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bimport\s*['"]([^'"\n]+)['"]"#).unwrap());

/// The kind of import statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportKind {
    /// ES6 import statement: `import ... from 'module'`
    ES6,
    /// Dynamic import: `import('module')`
    DynamicImport,
    /// CommonJS require: `const x = require('module')`
    CommonJS,
    /// `require.resolve('module')`
    RequireResolve,
    /// Side-effect import: `import 'module'`
    SideEffect,
}

/// A single raw reference from one file to a module specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// The specifier as written, e.g. `./Button`
    pub source: String,
    /// The file containing the reference
    pub from: PathBuf,
    pub kind: ImportKind,
    /// Line number in the source file (1-indexed)
    pub line: usize,
}

impl Import {
    /// Returns true for `import('...')` references.
    pub fn is_dynamic(&self) -> bool {
        self.kind == ImportKind::DynamicImport
    }

    /// Returns true if this import is from an npm package (not a relative/absolute path).
    pub fn is_package_import(&self) -> bool {
        is_external_specifier(&self.source)
    }
}

/// Returns true if `specifier` names something outside the project:
/// a bare package, a scoped package or a platform built-in.
///
/// ```
/// use prunescope::analysis::is_external_specifier;
///
/// assert!(is_external_specifier("react"));
/// assert!(is_external_specifier("@scope/pkg"));
/// assert!(is_external_specifier("node:fs"));
/// assert!(!is_external_specifier("./Button"));
/// assert!(!is_external_specifier("/src/Button"));
/// ```
pub fn is_external_specifier(specifier: &str) -> bool {
    is_builtin_module(specifier)
        || is_scoped_package(specifier)
        || !(specifier.starts_with('.') || specifier.starts_with('/'))
}

fn is_builtin_module(specifier: &str) -> bool {
    specifier.starts_with("node:") || NODE_BUILTINS.contains(&specifier)
}

fn is_scoped_package(specifier: &str) -> bool {
    let Some(rest) = specifier.strip_prefix('@') else {
        return false;
    };
    matches!(rest.split_once('/'), Some((scope, name)) if !scope.is_empty() && !name.is_empty())
}

/// Maps byte offsets to 1-based line numbers.
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(text: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { starts }
    }

    fn line_of(&self, offset: usize) -> usize {
        self.starts.partition_point(|&start| start <= offset)
    }
}

/// Extracts intra-project references from source text.
#[derive(Debug, Clone, Default)]
pub struct ImportExtractor {
    /// Alias prefixes (e.g. `@/`) that are project-internal despite looking bare.
    alias_prefixes: Vec<String>,
}

impl ImportExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an extractor that keeps specifiers starting with any of `prefixes`.
    pub fn with_aliases<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            alias_prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    /// Reads `path` through the cache and extracts its references.
    ///
    /// Unreadable files yield no references.
    pub fn extract_file(&self, path: &Path, cache: &ContentCache) -> Vec<Import> {
        match cache.read(path) {
            Some(content) => self.extract(path, &content),
            None => Vec::new(),
        }
    }

    /// Extracts references from `content`, the text of `path`.
    pub fn extract(&self, path: &Path, content: &str) -> Vec<Import> {
        let lines = LineIndex::new(content);
        let mut imports = Vec::new();

        let scans: [(&Regex, ImportKind); 5] = [
            (&STATIC_IMPORT, ImportKind::ES6),
            (&DYNAMIC_IMPORT, ImportKind::DynamicImport),
            (&REQUIRE, ImportKind::CommonJS),
            (&REQUIRE_RESOLVE, ImportKind::RequireResolve),
            (&SIDE_EFFECT_IMPORT, ImportKind::SideEffect),
        ];

        for (pattern, kind) in scans {
            for caps in pattern.captures_iter(content) {
                let Some(spec) = caps.get(1) else {
                    continue;
                };
                let source = spec.as_str().trim();
                if !self.is_internal(source) {
                    continue;
                }
                imports.push(Import {
                    source: source.to_string(),
                    from: path.to_path_buf(),
                    kind,
                    line: lines.line_of(spec.start()),
                });
            }
        }

        imports
    }

    fn is_internal(&self, specifier: &str) -> bool {
        if specifier.is_empty() {
            return false;
        }
        if self
            .alias_prefixes
            .iter()
            .any(|prefix| specifier.starts_with(prefix.as_str()))
        {
            return true;
        }
        !is_external_specifier(specifier)
    }
}
