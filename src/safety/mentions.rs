//! Whole-word mention lookup across project text.
//!
//! Each file is tokenized once into identifier-like words and kebab-case
//! words, skipping `import`/`export` lines. Queries are then hash lookups
//! instead of a rescan of every file per unit.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::workspace::ContentCache;

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Za-z_$][\w$]*").unwrap());

static KEBAB_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z_$][\w$]*(?:-[A-Za-z0-9_$]+)+").unwrap());

static MODULE_STATEMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:import|export)\b").unwrap());

/// One place a unit is named outside the import graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mention {
    pub file: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// The form of the name that matched
    pub token: String,
}

/// Returns true if `line` is an import or export statement.
pub fn is_module_statement(line: &str) -> bool {
    MODULE_STATEMENT.is_match(line)
}

/// Inverted index: token -> first occurrence per file.
#[derive(Debug, Default)]
pub struct MentionIndex {
    files: Vec<PathBuf>,
    tokens: HashMap<String, Vec<(usize, usize)>>,
}

impl MentionIndex {
    /// Tokenizes every file in `files`. Unreadable files are skipped.
    pub fn build<'a, I>(files: I, cache: &ContentCache) -> Self
    where
        I: IntoIterator<Item = &'a Path>,
    {
        let mut index = Self::default();
        for path in files {
            if let Some(content) = cache.read(path) {
                index.add_file(path, &content);
            }
        }
        tracing::debug!(
            "Indexed {} distinct tokens across {} files",
            index.tokens.len(),
            index.files.len()
        );
        index
    }

    /// Adds the tokens of one file.
    pub fn add_file(&mut self, path: &Path, content: &str) {
        let file_idx = self.files.len();
        self.files.push(path.to_path_buf());

        let mut seen: HashSet<&str> = HashSet::new();
        for (i, line) in content.lines().enumerate() {
            if is_module_statement(line) {
                continue;
            }
            // A word inside a kebab run (`Button` in `Button-group`) is
            // not a token of its own.
            let kebabs: Vec<_> = KEBAB_WORD.find_iter(line).collect();
            let words = WORD
                .find_iter(line)
                .filter(|w| !kebabs.iter().any(|k| k.start() <= w.start() && w.end() <= k.end()))
                .chain(kebabs.iter().copied());
            for word in words {
                if seen.insert(word.as_str()) {
                    self.tokens
                        .entry(word.as_str().to_string())
                        .or_default()
                        .push((file_idx, i + 1));
                }
            }
        }
    }

    /// Finds files naming any of `forms`, at most one mention per file.
    ///
    /// Files equal to `exclude` are skipped. Results are sorted by path.
    pub fn find(&self, forms: &[String], exclude: &Path) -> Vec<Mention> {
        let mut by_file: HashMap<usize, Mention> = HashMap::new();

        for form in forms {
            let Some(hits) = self.tokens.get(form) else {
                continue;
            };
            for &(file_idx, line) in hits {
                let file = &self.files[file_idx];
                if file == exclude || by_file.contains_key(&file_idx) {
                    continue;
                }
                by_file.insert(
                    file_idx,
                    Mention {
                        file: file.clone(),
                        line,
                        token: form.clone(),
                    },
                );
            }
        }

        let mut mentions: Vec<Mention> = by_file.into_values().collect();
        mentions.sort_by(|a, b| a.file.cmp(&b.file).then(a.line.cmp(&b.line)));
        mentions
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forms(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_whole_word_only() {
        let mut index = MentionIndex::default();
        index.add_file(Path::new("/p/a.md"), "Use the MyButton here");
        index.add_file(Path::new("/p/b.md"), "The Button component");

        let found = index.find(&forms(&["Button"]), Path::new("/p/Button.tsx"));

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].file, PathBuf::from("/p/b.md"));
        assert_eq!(found[0].line, 1);
    }

    #[test]
    fn test_import_lines_skipped() {
        let mut index = MentionIndex::default();
        index.add_file(
            Path::new("/p/x.ts"),
            "import Button from './Button';\nexport { Button };\n",
        );

        assert!(index
            .find(&forms(&["Button"]), Path::new("/p/Button.tsx"))
            .is_empty());
    }

    #[test]
    fn test_kebab_tokens() {
        let mut index = MentionIndex::default();
        index.add_file(
            Path::new("/p/page.html"),
            "<div>\n<user-profile></user-profile>\n</div>",
        );

        let found = index.find(&forms(&["user-profile"]), Path::new("/p/x"));

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line, 2);
        assert_eq!(found[0].token, "user-profile");
    }

    #[test]
    fn test_excludes_unit_itself_and_dedupes_per_file() {
        let mut index = MentionIndex::default();
        index.add_file(Path::new("/p/Card.tsx"), "const Card = 1;");
        index.add_file(Path::new("/p/doc.md"), "Card\nCard again\ncard");

        let found = index.find(&forms(&["Card", "card"]), Path::new("/p/Card.tsx"));

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].file, PathBuf::from("/p/doc.md"));
        assert_eq!(found[0].line, 1);
    }

    #[test]
    fn test_word_inside_kebab_run_is_not_a_mention() {
        let mut index = MentionIndex::default();
        index.add_file(Path::new("/p/a.md"), "Use a Button-group here");
        index.add_file(Path::new("/p/b.html"), "<my-Button></my-Button>");

        assert!(index
            .find(&forms(&["Button"]), Path::new("/p/Button.tsx"))
            .is_empty());
        assert_eq!(
            index
                .find(&forms(&["Button-group"]), Path::new("/p/Button.tsx"))
                .len(),
            1
        );
    }

    #[test]
    fn test_module_statement_detection() {
        assert!(is_module_statement("  import x from 'y'"));
        assert!(is_module_statement("export default Foo;"));
        assert!(!is_module_statement("const exported = 1;"));
        assert!(!is_module_statement("// import Foo"));
    }
}
