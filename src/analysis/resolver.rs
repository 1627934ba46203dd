//! Module resolution: specifier + referencing file -> project path.
//!
//! Resolution never fails. When no probe hits an existing file, the
//! normalized best-effort path is returned; it simply will not match any unit
//! when the graph is built.
//!
//! Path identity for graph purposes goes through [`equivalence_key`], the
//! single place that decides when two paths name the same module.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use dashmap::DashMap;

use crate::config::AnalysisConfig;

/// Lexically normalizes `path`: resolves `.` and `..` without touching the
/// file system. `..` never climbs above the root.
///
/// ```
/// use std::path::{Path, PathBuf};
/// use prunescope::analysis::normalize_path;
///
/// assert_eq!(normalize_path(Path::new("/a/b/../c/./d.ts")), PathBuf::from("/a/c/d.ts"));
/// ```
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let at_root = matches!(
                    out.components().next_back(),
                    None | Some(Component::RootDir) | Some(Component::Prefix(_))
                );
                if !at_root {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Forward-slash string form of a path, used as a map key.
pub fn path_key(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Canonical identity of a module path.
///
/// A path and its extensionless form share a key, and a directory shares a
/// key with its implicit index file:
///
/// ```
/// use std::path::Path;
/// use prunescope::analysis::equivalence_key;
///
/// let exts = ["tsx", "ts"];
/// let key = equivalence_key(Path::new("/p/Foo.tsx"), &exts);
/// assert_eq!(key, equivalence_key(Path::new("/p/Foo"), &exts));
/// assert_eq!(key, equivalence_key(Path::new("/p/Foo/index.ts"), &exts));
/// ```
pub fn equivalence_key<S: AsRef<str>>(path: &Path, extensions: &[S]) -> String {
    let mut key = path_key(&normalize_path(path));

    if let Some((base, ext)) = key.rsplit_once('.') {
        let in_last_segment = !ext.contains('/');
        if in_last_segment && extensions.iter().any(|e| e.as_ref().eq_ignore_ascii_case(ext)) {
            key.truncate(base.len());
        }
    }

    if let Some(dir) = key.strip_suffix("/index") {
        if !dir.is_empty() {
            key.truncate(dir.len());
        }
    }

    key
}

/// Returns true if `a` and `b` name the same module under [`equivalence_key`].
pub fn paths_equivalent<S: AsRef<str>>(a: &Path, b: &Path, extensions: &[S]) -> bool {
    equivalence_key(a, extensions) == equivalence_key(b, extensions)
}

/// Resolves specifiers against the project layout.
///
/// File-system probes are memoized for the lifetime of the resolver, which
/// is owned by a single analysis run.
#[derive(Debug)]
pub struct ModuleResolver {
    root: PathBuf,
    extensions: Vec<String>,
    index_files: Vec<String>,
    aliases: BTreeMap<String, String>,
    probes: DashMap<PathBuf, Probe>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Probe {
    File,
    Dir,
    Missing,
}

impl ModuleResolver {
    pub fn new(root: impl Into<PathBuf>, config: &AnalysisConfig) -> Self {
        Self {
            root: normalize_path(&root.into()),
            extensions: config.resolve_extensions.clone(),
            index_files: config.index_files.clone(),
            aliases: config.aliases.clone(),
            probes: DashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Extensions used for probing and equivalence.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Equivalence key under this resolver's extension list.
    pub fn key(&self, path: &Path) -> String {
        equivalence_key(path, &self.extensions)
    }

    /// Resolves `specifier` as written in `from` to a normalized path.
    pub fn resolve(&self, specifier: &str, from: &Path) -> PathBuf {
        if let Some(aliased) = self.expand_alias(specifier) {
            return self.probe_candidates(&aliased);
        }

        let spec_path = Path::new(specifier);
        if spec_path.is_absolute() {
            return normalize_path(spec_path);
        }

        let from = if from.is_absolute() {
            from.to_path_buf()
        } else {
            self.root.join(from)
        };
        let base_dir = from.parent().unwrap_or(&self.root);
        self.probe_candidates(&normalize_path(&base_dir.join(spec_path)))
    }

    fn expand_alias(&self, specifier: &str) -> Option<PathBuf> {
        // Longest prefix wins so `@/ui/` beats `@/`.
        self.aliases
            .iter()
            .filter(|(prefix, _)| specifier.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(prefix, target)| {
                let rest = &specifier[prefix.len()..];
                normalize_path(&self.root.join(target).join(rest))
            })
    }

    fn probe_candidates(&self, base: &Path) -> PathBuf {
        let as_is = self.probe(base);
        if as_is == Probe::File {
            return base.to_path_buf();
        }

        let base_str = base.as_os_str().to_string_lossy();
        for ext in &self.extensions {
            let candidate = PathBuf::from(format!("{}.{}", base_str, ext));
            if self.probe(&candidate) == Probe::File {
                return candidate;
            }
        }

        if as_is == Probe::Dir {
            for index in &self.index_files {
                let candidate = base.join(index);
                if self.probe(&candidate) == Probe::File {
                    return candidate;
                }
            }
        }

        base.to_path_buf()
    }

    fn probe(&self, path: &Path) -> Probe {
        if let Some(hit) = self.probes.get(path) {
            return *hit;
        }
        let probe = match std::fs::metadata(path) {
            Ok(meta) if meta.is_file() => Probe::File,
            Ok(meta) if meta.is_dir() => Probe::Dir,
            _ => Probe::Missing,
        };
        self.probes.insert(path.to_path_buf(), probe);
        probe
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn project(files: &[&str]) -> (tempfile::TempDir, ModuleResolver) {
        let dir = tempfile::tempdir().unwrap();
        for rel in files {
            let path = dir.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "").unwrap();
        }
        let resolver = ModuleResolver::new(dir.path(), &AnalysisConfig::default());
        (dir, resolver)
    }

    #[test]
    fn test_normalize_parent_segments() {
        assert_eq!(
            normalize_path(Path::new("/a/b/../../c")),
            PathBuf::from("/c")
        );
        assert_eq!(normalize_path(Path::new("/../x")), PathBuf::from("/x"));
        assert_eq!(normalize_path(Path::new("a/./b")), PathBuf::from("a/b"));
    }

    #[test]
    fn test_resolves_extensionless_specifier() {
        let (dir, resolver) = project(&["src/App.tsx", "src/Button.tsx"]);
        let from = dir.path().join("src/App.tsx");

        let resolved = resolver.resolve("./Button", &from);

        assert_eq!(resolved, normalize_path(&dir.path().join("src/Button.tsx")));
    }

    #[test]
    fn test_extension_probe_order() {
        let (dir, resolver) = project(&["src/App.tsx", "src/util.ts", "src/util.js"]);
        let from = dir.path().join("src/App.tsx");

        let resolved = resolver.resolve("./util", &from);

        assert_eq!(resolved, normalize_path(&dir.path().join("src/util.ts")));
    }

    #[test]
    fn test_resolves_directory_index() {
        let (dir, resolver) = project(&["src/App.tsx", "src/Modal/index.jsx"]);
        let from = dir.path().join("src/App.tsx");

        let resolved = resolver.resolve("./Modal", &from);

        assert_eq!(
            resolved,
            normalize_path(&dir.path().join("src/Modal/index.jsx"))
        );
    }

    #[test]
    fn test_literal_path_wins() {
        let (dir, resolver) = project(&["src/App.tsx", "src/data.json"]);
        let from = dir.path().join("src/App.tsx");

        let resolved = resolver.resolve("./data.json", &from);

        assert_eq!(resolved, normalize_path(&dir.path().join("src/data.json")));
    }

    #[test]
    fn test_parent_relative_specifier() {
        let (dir, resolver) = project(&["src/pages/Home.tsx", "src/Header.tsx"]);
        let from = dir.path().join("src/pages/Home.tsx");

        let resolved = resolver.resolve("../Header", &from);

        assert_eq!(resolved, normalize_path(&dir.path().join("src/Header.tsx")));
    }

    #[test]
    fn test_unresolved_returns_best_effort() {
        let (dir, resolver) = project(&["src/App.tsx"]);
        let from = dir.path().join("src/App.tsx");

        let resolved = resolver.resolve("./Ghost", &from);

        assert_eq!(resolved, normalize_path(&dir.path().join("src/Ghost")));
    }

    #[test]
    fn test_absolute_specifier_normalized() {
        let (_dir, resolver) = project(&[]);
        let resolved = resolver.resolve("/abs/./x/../Card", Path::new("/anywhere/a.ts"));
        assert_eq!(resolved, PathBuf::from("/abs/Card"));
    }

    #[test]
    fn test_relative_referrer_anchored_to_root() {
        let (dir, resolver) = project(&["src/Button.tsx"]);

        let resolved = resolver.resolve("./Button", Path::new("src/App.tsx"));

        assert_eq!(resolved, normalize_path(&dir.path().join("src/Button.tsx")));
    }

    #[test]
    fn test_alias_expansion() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src/components")).unwrap();
        fs::write(dir.path().join("src/components/Nav.tsx"), "").unwrap();
        let mut config = AnalysisConfig::default();
        config.aliases.insert("@/".to_string(), "src/".to_string());
        let resolver = ModuleResolver::new(dir.path(), &config);

        let resolved = resolver.resolve("@/components/Nav", &dir.path().join("src/App.tsx"));

        assert_eq!(
            resolved,
            normalize_path(&dir.path().join("src/components/Nav.tsx"))
        );
    }

    #[test]
    fn test_equivalence_rules() {
        let exts = ["tsx", "ts", "jsx", "js"];
        assert!(paths_equivalent(
            Path::new("/p/Foo.tsx"),
            Path::new("/p/Foo"),
            &exts
        ));
        assert!(paths_equivalent(
            Path::new("/p/Foo"),
            Path::new("/p/Foo/index.tsx"),
            &exts
        ));
        assert!(paths_equivalent(
            Path::new("/p/a/../Foo.jsx"),
            Path::new("/p/Foo/index.js"),
            &exts
        ));
        assert!(!paths_equivalent(
            Path::new("/p/Foo.tsx"),
            Path::new("/p/Foobar.tsx"),
            &exts
        ));
        // Unknown extensions are part of the identity.
        assert!(!paths_equivalent(
            Path::new("/p/Foo.css"),
            Path::new("/p/Foo"),
            &exts
        ));
    }

    #[test]
    fn test_probe_cache_reused() {
        let (dir, resolver) = project(&["src/App.tsx", "src/Button.tsx"]);
        let from = dir.path().join("src/App.tsx");

        let first = resolver.resolve("./Button", &from);
        fs::remove_file(dir.path().join("src/Button.tsx")).unwrap();
        let second = resolver.resolve("./Button", &from);

        assert_eq!(first, second);
    }
}
