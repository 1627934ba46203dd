//! The four safety checks and verdict composition.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use super::mentions::{Mention, MentionIndex};
use super::{SafetyPolicy, SafetyVerdict};
use crate::classify::{split_words, to_camel_case, to_kebab_case, Unit, INDEX_DISPLAY_NAME};
use crate::config::SafetyConfig;
use crate::graph::DependencyGraph;
use crate::workspace::{ContentCache, Discovery};

/// Directory segments that hold tests, fixtures or mocks.
const TEST_DIRS: &[&str] = &["__tests__", "__mocks__", "test", "tests", "spec", "specs"];

/// Extensions an aggregator (`index.*`) file may carry.
const AGGREGATOR_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mjs", "cjs"];

/// Contents of a single- or double-quoted or template string on one line.
static QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"\n]*)"|'([^'\n]*)'|`([^`\n]*)`"#).unwrap());

static EXPORT_STATEMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*export\b").unwrap());

static EXPORT_LIST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*export\s+(?:type\s+)?\{").unwrap());

/// Errors raised while checking a unit.
#[derive(Debug, thiserror::Error)]
pub enum SafetyError {
    /// A name pattern failed to compile.
    #[error("Failed to build pattern for {name}: {source}")]
    Pattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    /// The unit was never added to the graph.
    #[error("Unit is not part of the dependency graph: {0}")]
    UnknownUnit(PathBuf),
}

/// Result type alias for safety operations.
pub type SafetyResult<T> = Result<T, SafetyError>;

/// Returns true if `path`, taken relative to `root`, looks like a test file.
///
/// ```
/// use std::path::Path;
/// use prunescope::safety::is_test_file;
///
/// let root = Path::new("/p");
/// assert!(is_test_file(Path::new("/p/src/__tests__/Nav.tsx"), root));
/// assert!(is_test_file(Path::new("/p/src/Nav.spec.tsx"), root));
/// assert!(!is_test_file(Path::new("/p/src/Nav.tsx"), root));
/// ```
pub fn is_test_file(path: &Path, root: &Path) -> bool {
    let relative = path.strip_prefix(root).unwrap_or(path);

    let mut components = relative.components().peekable();
    while let Some(component) = components.next() {
        let Component::Normal(segment) = component else {
            continue;
        };
        let Some(segment) = segment.to_str() else {
            continue;
        };
        if components.peek().is_none() {
            return segment.contains(".test.") || segment.contains(".spec.");
        }
        if TEST_DIRS.contains(&segment) {
            return true;
        }
    }
    false
}

fn is_aggregator(path: &Path) -> bool {
    let stem = path.file_stem().and_then(|s| s.to_str());
    let ext = path.extension().and_then(|s| s.to_str());
    matches!((stem, ext), (Some("index"), Some(ext)) if AGGREGATOR_EXTENSIONS.contains(&ext))
}

/// True for the index file of a folder named after the unit, such as
/// `Button/index.ts` next to `Button/Button.tsx`.
fn is_own_barrel(aggregator: &Path, unit: &Unit) -> bool {
    if aggregator.parent() != Some(unit.dir()) {
        return false;
    }
    unit.dir()
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|dir| dir == unit.stem() || dir == unit.display_name)
}

/// The spellings a unit is searched under.
#[derive(Debug)]
struct NameForms {
    /// Names checked in re-exports and config files
    primary: Vec<String>,
    /// `primary` plus derived casings, for the mention index
    all: Vec<String>,
}

impl NameForms {
    fn of(unit: &Unit) -> Self {
        let mut primary = Vec::new();
        if unit.display_name == INDEX_DISPLAY_NAME {
            // An index unit is known by its directory.
            if let Some(dir) = unit.dir().file_name().and_then(|n| n.to_str()) {
                primary.push(dir.to_string());
            }
        } else {
            primary.push(unit.display_name.clone());
            primary.push(unit.stem().to_string());
        }
        dedup(&mut primary);
        if primary.is_empty() {
            primary.push(unit.display_name.clone());
        }

        let mut all = primary.clone();
        // Single lowercase words ("button") match too much ordinary prose.
        if let Some(base) = primary.first() {
            if split_words(base).len() > 1 {
                all.push(to_camel_case(base));
                all.push(to_kebab_case(base));
            }
        }
        dedup(&mut all);

        Self { primary, all }
    }

    /// Whole-word pattern over the primary names. `-` counts as a word
    /// character so `Button` does not match inside `Button-group`.
    fn boundary_pattern(&self) -> SafetyResult<Regex> {
        let alternatives: Vec<String> = self.primary.iter().map(|n| regex::escape(n)).collect();
        let pattern = format!(r"(?:^|[^\w$-])(?:{})(?:[^\w$-]|$)", alternatives.join("|"));
        Regex::new(&pattern).map_err(|source| SafetyError::Pattern {
            name: self.primary.join("|"),
            source,
        })
    }
}

fn dedup(values: &mut Vec<String>) {
    let mut seen = HashSet::new();
    values.retain(|v| !v.is_empty() && seen.insert(v.clone()));
}

/// Findings of the four checks before they are folded into a verdict.
#[derive(Debug, Default)]
struct Findings {
    dependents: Vec<PathBuf>,
    direct: Vec<PathBuf>,
    tests: Vec<PathBuf>,
    reexported_by: Vec<PathBuf>,
    mentions: Vec<Mention>,
    config_mentions: Vec<Mention>,
}

/// Runs the safety checks for unused units of one analysis run.
///
/// Built once per run: the aggregator list and the mention index are
/// computed up front and shared by every unit checked.
pub struct SafetyAnalyzer<'a> {
    graph: &'a DependencyGraph,
    cache: &'a ContentCache,
    discovery: &'a Discovery,
    config: SafetyConfig,
    aggregators: Vec<&'a Path>,
    mentions: Option<MentionIndex>,
}

impl<'a> SafetyAnalyzer<'a> {
    pub fn new(
        graph: &'a DependencyGraph,
        cache: &'a ContentCache,
        discovery: &'a Discovery,
        config: SafetyConfig,
    ) -> Self {
        let aggregators: Vec<&Path> = discovery
            .source_files
            .iter()
            .map(PathBuf::as_path)
            .filter(|p| is_aggregator(p))
            .collect();

        let mentions = config
            .check_indirect
            .then(|| MentionIndex::build(discovery.scannable_files(), cache));

        tracing::debug!(
            "Safety analyzer ready: {} aggregator files, {} config files, indirect check {}",
            aggregators.len(),
            discovery.config_files.len(),
            if config.check_indirect { "on" } else { "off" }
        );

        Self {
            graph,
            cache,
            discovery,
            config,
            aggregators,
            mentions,
        }
    }

    /// Produces the verdict for `unit`.
    ///
    /// Errors never escape: they yield an unsafe verdict whose warning
    /// explains what went wrong.
    pub fn analyze(&self, unit: &Unit) -> SafetyVerdict {
        match self.try_analyze(unit) {
            Ok(verdict) => verdict,
            Err(e) => {
                tracing::warn!("Safety check failed for {}: {}", unit.path.display(), e);
                SafetyVerdict {
                    is_safe: false,
                    warnings: vec![format!("Safety analysis failed: {}", e)],
                    recommendations: vec![format!(
                        "Verify manually that {} is unused before deleting it",
                        unit.display_name
                    )],
                    ..SafetyVerdict::default()
                }
            }
        }
    }

    /// Runs every check and composes the verdict, propagating errors.
    pub fn try_analyze(&self, unit: &Unit) -> SafetyResult<SafetyVerdict> {
        if !self.graph.contains_unit(&unit.path) {
            return Err(SafetyError::UnknownUnit(unit.path.clone()));
        }

        let forms = NameForms::of(unit);
        let boundary = forms.boundary_pattern()?;

        let mut findings = Findings::default();
        self.check_dependents(unit, &mut findings);
        self.check_reexports(unit, &boundary, &mut findings);
        self.check_mentions(unit, &forms, &mut findings);
        self.check_config_files(&boundary, &mut findings);

        let verdict = self.compose(unit, findings);
        tracing::debug!(
            "{} -> {} ({} warnings)",
            unit.path.display(),
            if verdict.is_safe { "safe" } else { "unsafe" },
            verdict.warnings.len()
        );
        Ok(verdict)
    }

    fn check_dependents(&self, unit: &Unit, findings: &mut Findings) {
        let dependents = self.graph.dependents(&unit.path);
        for dependent in &dependents {
            if is_test_file(dependent, &self.discovery.root) {
                findings.tests.push(dependent.clone());
            } else {
                findings.direct.push(dependent.clone());
            }
        }
        findings.dependents = dependents;
    }

    fn check_reexports(&self, unit: &Unit, boundary: &Regex, findings: &mut Findings) {
        for &aggregator in &self.aggregators {
            if aggregator == unit.path || is_own_barrel(aggregator, unit) {
                continue;
            }
            let Some(content) = self.cache.read(aggregator) else {
                continue;
            };
            if exports_name(&content, boundary) {
                findings.reexported_by.push(aggregator.to_path_buf());
            }
        }
    }

    fn check_mentions(&self, unit: &Unit, forms: &NameForms, findings: &mut Findings) {
        let Some(index) = &self.mentions else {
            return;
        };
        // Files already counted as dependents are reported by the first check.
        let known: HashSet<&Path> = findings.dependents.iter().map(PathBuf::as_path).collect();
        findings.mentions = index
            .find(&forms.all, &unit.path)
            .into_iter()
            .filter(|m| !known.contains(m.file.as_path()))
            .collect();
    }

    fn check_config_files(&self, boundary: &Regex, findings: &mut Findings) {
        for path in &self.discovery.config_files {
            let Some(content) = self.cache.read(path) else {
                continue;
            };
            if let Some(mention) = quoted_mention(path, &content, boundary) {
                findings.config_mentions.push(mention);
            }
        }
    }

    fn compose(&self, unit: &Unit, findings: Findings) -> SafetyVerdict {
        let name = &unit.display_name;
        let root = &self.discovery.root;

        let has_direct = !findings.direct.is_empty();
        let has_mentions = !findings.mentions.is_empty();
        let has_reexports = !findings.reexported_by.is_empty();
        let has_config = !findings.config_mentions.is_empty();

        let advisory_blocks = match self.config.policy {
            SafetyPolicy::Strict => has_reexports || has_config,
            SafetyPolicy::Lenient => false,
        };
        let is_safe = !has_direct && !has_mentions && !advisory_blocks;

        let mut warnings = Vec::new();
        if has_direct {
            warnings.push(format!(
                "Imported directly by {} file(s): {}",
                findings.direct.len(),
                list_paths(&findings.direct, root)
            ));
        }
        if !findings.tests.is_empty() {
            warnings.push(format!(
                "Imported by {} test file(s): {}",
                findings.tests.len(),
                list_paths(&findings.tests, root)
            ));
        }
        if has_reexports {
            warnings.push(format!(
                "Re-exported from {}",
                list_paths(&findings.reexported_by, root)
            ));
        }
        if has_mentions {
            warnings.push(format!(
                "Mentioned by name in {} file(s): {}",
                findings.mentions.len(),
                list_mentions(&findings.mentions, root)
            ));
        }
        if has_config {
            warnings.push(format!(
                "Referenced in configuration: {}",
                list_mentions(&findings.config_mentions, root)
            ));
        }

        let mut recommendations = Vec::new();
        if is_safe {
            recommendations.push(if findings.tests.is_empty() {
                format!("{} has no references and can be deleted", name)
            } else {
                format!(
                    "{} is only used by tests; delete it together with its {} test file(s)",
                    name,
                    findings.tests.len()
                )
            });
        } else {
            if has_direct {
                recommendations.push(format!(
                    "Remove the imports of {} from the files that use it",
                    name
                ));
            }
            if has_reexports {
                recommendations.push(format!(
                    "Remove the re-export of {} from {}",
                    name,
                    list_paths(&findings.reexported_by, root)
                ));
            }
            if has_config {
                recommendations.push(format!(
                    "Update the configuration entries that name {}",
                    name
                ));
            }
            if has_mentions {
                recommendations.push(format!(
                    "Review the places that mention {}; markup or runtime lookups may use it",
                    name
                ));
            }
            if !findings.tests.is_empty() {
                recommendations.push(format!("Delete or update the tests that import {}", name));
            }
        }

        SafetyVerdict {
            is_safe,
            warnings,
            dependents: findings.dependents,
            recommendations,
            test_dependents: findings.tests,
            reexported_by: findings.reexported_by,
            indirect_mentions: findings.mentions,
            config_mentions: findings.config_mentions,
        }
    }
}

/// True if an `export` statement in `content` matches `boundary`.
///
/// Export lists spanning several lines (`export {\n  A,\n} from './A'`)
/// are followed to their closing brace. Other exports are single-line, so
/// the body of `export function X() {` is never read as a re-export.
fn exports_name(content: &str, boundary: &Regex) -> bool {
    let mut in_list = false;

    for line in content.lines() {
        if in_list {
            if boundary.is_match(line) {
                return true;
            }
            if line.contains('}') {
                in_list = false;
            }
            continue;
        }
        if !EXPORT_STATEMENT.is_match(line) {
            continue;
        }
        if boundary.is_match(line) {
            return true;
        }
        in_list = EXPORT_LIST.is_match(line) && !line.contains('}');
    }
    false
}

/// First line of `content` with a quoted string naming the unit.
fn quoted_mention(path: &Path, content: &str, boundary: &Regex) -> Option<Mention> {
    for (i, line) in content.lines().enumerate() {
        for caps in QUOTED.captures_iter(line) {
            let Some(inner) = caps.iter().skip(1).flatten().next() else {
                continue;
            };
            if let Some(m) = boundary.find(inner.as_str()) {
                return Some(Mention {
                    file: path.to_path_buf(),
                    line: i + 1,
                    token: m.as_str().trim_matches(|c: char| !c.is_alphanumeric()).to_string(),
                });
            }
        }
    }
    None
}

fn relative<'p>(path: &'p Path, root: &Path) -> &'p Path {
    path.strip_prefix(root).unwrap_or(path)
}

fn list_paths(paths: &[PathBuf], root: &Path) -> String {
    paths
        .iter()
        .map(|p| relative(p, root).display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn list_mentions(mentions: &[Mention], root: &Path) -> String {
    mentions
        .iter()
        .map(|m| format!("{}:{}", relative(&m.file, root).display(), m.line))
        .collect::<Vec<_>>()
        .join(", ")
}
