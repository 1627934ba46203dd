//! Component ("unit") classification.
//!
//! Decides whether a source file defines a reusable UI component using
//! line-oriented regular expressions over the raw text. There is no parse
//! tree, so matches inside string literals or comments count too; that is an
//! accepted limitation of the heuristic.
//!
//! The [`UnitClassifier`] trait is the seam for swapping in a grammar-aware
//! classifier without touching the graph or safety stages.
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use prunescope::classify::{PatternClassifier, UnitClassifier};
//!
//! let classifier = PatternClassifier::new();
//! let source = "import React from 'react';\nexport function Card() { return <div />; }";
//! assert!(classifier.is_unit(Path::new("src/Card.tsx"), source));
//! assert_eq!(classifier.display_name(Path::new("src/card-list.tsx")), "CardList");
//! ```

pub mod naming;

pub use naming::{derive_name, file_stem, split_words, to_camel_case, to_kebab_case, INDEX_DISPLAY_NAME};

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::workspace::FileStat;

/// Directory segment that marks vendored third-party code.
pub const VENDOR_DIR: &str = "node_modules";

/// File-name fragments that never denote a component.
const NON_UNIT_FRAGMENTS: &[&str] = &[".test.", ".spec.", ".stories.", ".story."];

/// Entry points and tooling files that look like components but are not reusable.
const BOOTSTRAP_PREFIXES: &[&str] = &[
    "main.",
    "setupTests.",
    "setupProxy.",
    "reportWebVitals.",
    "serviceWorker.",
    "_app.",
    "_document.",
];

static UI_PACKAGE_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?m)^\s*import\s+(?:[\w$*{}\s,]+\s+from\s+)?['"]react['"]|\brequire\s*\(\s*['"]react['"]\s*\)"#,
    )
    .unwrap()
});

/// An opening tag. `<` directly after an identifier is a type argument
/// (`Promise<User>`, `useState<Props>(`), not markup.
static JSX_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^\w$.])<[A-Z][\w.]*[\s/>]").unwrap());

static COMPONENT_DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(?:export\s+(?:default\s+)?)?(?:function|const|class)\s+[A-Z][\w$]*")
        .unwrap()
});

/// A source file classified as defining a reusable component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Unit {
    /// Normalized absolute path
    pub path: PathBuf,
    /// File name including extension
    pub file_name: String,
    /// PascalCase name derived from the file name
    pub display_name: String,
    pub size: u64,
    /// Milliseconds since the Unix epoch
    pub modified_ms: u64,
}

impl Unit {
    pub fn new(path: impl Into<PathBuf>, display_name: impl Into<String>, stat: FileStat) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            path,
            file_name,
            display_name: display_name.into(),
            size: stat.size,
            modified_ms: stat.modified_ms,
        }
    }

    /// File name without its final extension, e.g. `user-profile`.
    pub fn stem(&self) -> &str {
        file_stem(&self.file_name)
    }

    /// Directory containing the unit.
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new(""))
    }
}

/// Decides whether a file defines a unit.
pub trait UnitClassifier: Send + Sync {
    /// Returns true if `content` (the text of `path`) defines a unit.
    fn is_unit(&self, path: &Path, content: &str) -> bool;

    /// Returns true if `path` must be skipped without reading it.
    fn skips(&self, path: &Path) -> bool {
        is_excluded_path(path)
    }

    fn display_name(&self, path: &Path) -> String {
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        derive_name(file_name)
    }
}

/// Regex-based classifier for React components.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternClassifier;

impl PatternClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl UnitClassifier for PatternClassifier {
    fn is_unit(&self, path: &Path, content: &str) -> bool {
        if self.skips(path) {
            return false;
        }

        let has_tag = JSX_TAG.is_match(content);
        let ecosystem_evidence = has_tag || UI_PACKAGE_IMPORT.is_match(content);
        ecosystem_evidence && (has_tag || COMPONENT_DECLARATION.is_match(content))
    }
}

/// True for paths inside a vendored directory or with a non-component file name.
pub fn is_excluded_path(path: &Path) -> bool {
    if path.components().any(|c| c.as_os_str() == VENDOR_DIR) {
        return true;
    }

    let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
        return true;
    };
    NON_UNIT_FRAGMENTS.iter().any(|f| file_name.contains(f))
        || file_name.ends_with(".d.ts")
        || BOOTSTRAP_PREFIXES.iter().any(|p| file_name.starts_with(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(path: &str, source: &str) -> bool {
        PatternClassifier::new().is_unit(Path::new(path), source)
    }

    #[test]
    fn test_function_component_with_react_import() {
        let source = r#"
import React from 'react';

export default function Header() {
  return null;
}
"#;
        assert!(classify("src/Header.jsx", source));
    }

    #[test]
    fn test_jsx_without_react_import() {
        let source = "const Page = () => (\n  <Layout title=\"x\">hi</Layout>\n);";
        assert!(classify("src/Page.tsx", source));
    }

    #[test]
    fn test_named_react_import_and_class() {
        let source = "import { Component } from \"react\";\nclass Modal extends Component {}";
        assert!(classify("src/Modal.js", source));
    }

    #[test]
    fn test_require_react() {
        let source = "const React = require('react');\nconst Legacy = () => null;";
        assert!(classify("src/Legacy.js", source));
    }

    #[test]
    fn test_plain_utility_is_not_unit() {
        let source = "export function formatDate(d) { return d.toISOString(); }";
        assert!(!classify("src/format.ts", source));
    }

    #[test]
    fn test_react_import_without_structure() {
        // Hook module: imports react but declares nothing capitalized.
        let source = "import { useState } from 'react';\nexport function useToggle() {}";
        assert!(!classify("src/useToggle.ts", source));
    }

    #[test]
    fn test_similar_package_is_not_evidence() {
        let source = "import x from 'react-dom';\nexport const Thing = 1;";
        assert!(!classify("src/thing.ts", source));
    }

    #[test]
    fn test_excluded_paths() {
        let jsx = "export const A = () => <Box />;";
        assert!(!classify("node_modules/lib/A.jsx", jsx));
        assert!(!classify("src/A.test.tsx", jsx));
        assert!(!classify("src/A.spec.jsx", jsx));
        assert!(!classify("src/A.stories.tsx", jsx));
        assert!(!classify("src/types.d.ts", jsx));
        assert!(!classify("src/main.tsx", jsx));
        assert!(!classify("src/reportWebVitals.js", jsx));
    }

    #[test]
    fn test_type_arguments_are_not_tags() {
        let source = "export async function load(): Promise<User> {\n  return fetchUser();\n}";
        assert!(!classify("src/api.ts", source));

        let hook = "export function useForm() {\n  const [v, set] = useState<Props>(init);\n}";
        assert!(!classify("src/useForm.ts", hook));

        let nested = "const m: Map<string, Array<Item>> = new Map();";
        assert!(!classify("src/store.ts", nested));
    }

    #[test]
    fn test_tag_at_line_start_still_matches() {
        let source = "export const Page = () => (\n<Layout>\n  hi\n</Layout>\n);";
        assert!(classify("src/Page.tsx", source));
    }

    #[test]
    fn test_string_literal_overmatch_is_accepted() {
        // Heuristic: a tag inside a string still counts.
        let source = "const html = '<Widget>';";
        assert!(classify("src/template.js", source));
    }

    #[test]
    fn test_unit_fields() {
        let stat = FileStat {
            size: 42,
            modified_ms: 7,
        };
        let unit = Unit::new("/p/src/user-card.tsx", "UserCard", stat);
        assert_eq!(unit.file_name, "user-card.tsx");
        assert_eq!(unit.stem(), "user-card");
        assert_eq!(unit.dir(), Path::new("/p/src"));
        assert_eq!(unit.size, 42);
    }
}
