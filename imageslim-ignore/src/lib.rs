//! Ignore-list resolution: which files the build context actually contains.
//!
//! Rules apply in file order and the last matching rule decides; a leading
//! `!` re-includes a previously excluded path. A rule matching a directory
//! prunes everything beneath it. Malformed globs are skipped with a warning
//! rather than failing the run, since ignore rules are best-effort.

use camino::Utf8Path;
use glob::Pattern;
use imageslim_types::files::FileEntry;
use tracing::warn;

/// A path-glob pattern with a negation flag.
#[derive(Debug, Clone)]
pub struct IgnoreRule {
    /// The pattern as written, negation marker included.
    pub raw: String,
    pub pattern: Pattern,
    pub negated: bool,
}

/// A skipped, malformed rule. Non-fatal by design.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreWarning {
    pub line: u64,
    pub pattern: String,
    pub reason: String,
}

/// Parse a line-delimited ignore file. Invalid globs are dropped and
/// reported back as warnings.
pub fn parse_rules(text: &str) -> (Vec<IgnoreRule>, Vec<IgnoreWarning>) {
    let mut rules = Vec::new();
    let mut warnings = Vec::new();

    for (zero_based, raw_line) in text.lines().enumerate() {
        let line = zero_based as u64 + 1;
        let trimmed = raw_line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let (negated, body) = match trimmed.strip_prefix('!') {
            Some(rest) => (true, rest.trim()),
            None => (false, trimmed),
        };

        match Pattern::new(body) {
            Ok(pattern) => rules.push(IgnoreRule {
                raw: trimmed.to_string(),
                pattern,
                negated,
            }),
            Err(err) => {
                warn!(line, pattern = %trimmed, error = %err, "skipping invalid ignore pattern");
                warnings.push(IgnoreWarning {
                    line,
                    pattern: trimmed.to_string(),
                    reason: err.to_string(),
                });
            }
        }
    }

    (rules, warnings)
}

/// Compile a list of bare patterns, silently dropping invalid ones.
/// Used for rule-engine bloat patterns that are configuration, not input.
pub fn compile_patterns(patterns: &[String]) -> Vec<IgnoreRule> {
    patterns
        .iter()
        .filter_map(|p| {
            Pattern::new(p).ok().map(|pattern| IgnoreRule {
                raw: p.clone(),
                pattern,
                negated: false,
            })
        })
        .collect()
}

/// Apply rules to a file list and return the included set, sorted by path.
///
/// Deterministic and idempotent: the result depends only on the inputs.
pub fn resolve(files: &[FileEntry], rules: &[IgnoreRule]) -> Vec<FileEntry> {
    let mut included: Vec<FileEntry> = files
        .iter()
        .filter(|f| is_included(&f.path, rules))
        .cloned()
        .collect();
    included.sort_by(|a, b| a.path.cmp(&b.path));
    included.dedup();
    included
}

fn is_included(path: &Utf8Path, rules: &[IgnoreRule]) -> bool {
    let mut included = true;
    for rule in rules {
        if rule_matches(rule, path) {
            included = rule.negated;
        }
    }
    included
}

/// A rule matches a file if its glob matches the path itself or any
/// ancestor directory (so `node_modules` prunes `node_modules/a.js`).
pub fn rule_matches(rule: &IgnoreRule, path: &Utf8Path) -> bool {
    if rule.pattern.matches(path.as_str()) {
        return true;
    }
    path.ancestors()
        .skip(1)
        .filter(|a| !a.as_str().is_empty())
        .any(|ancestor| rule.pattern.matches(ancestor.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn files(paths: &[(&str, u64)]) -> Vec<FileEntry> {
        paths
            .iter()
            .map(|(p, size)| FileEntry::new(*p, *size))
            .collect()
    }

    fn paths(included: &[FileEntry]) -> Vec<&str> {
        included.iter().map(|f| f.path.as_str()).collect()
    }

    #[test]
    fn later_negation_reincludes_subtree() {
        let (rules, warnings) = parse_rules("node_modules\n!node_modules/keep-me\n");
        assert!(warnings.is_empty());

        let tree = files(&[
            ("node_modules/a.js", 10),
            ("node_modules/keep-me/b.js", 20),
        ]);
        let included = resolve(&tree, &rules);
        assert_eq!(paths(&included), vec!["node_modules/keep-me/b.js"]);
    }

    #[test]
    fn directory_rule_prunes_descendants() {
        let (rules, _) = parse_rules(".git\n");
        let tree = files(&[
            (".git/objects/ab/cdef", 100),
            (".gitignore", 5),
            ("src/main.js", 50),
        ]);
        let included = resolve(&tree, &rules);
        assert_eq!(paths(&included), vec![".gitignore", "src/main.js"]);
    }

    #[test]
    fn comments_and_blanks_are_skipped() {
        let (rules, warnings) = parse_rules("# ignore caches\n\nnode_modules\n");
        assert!(warnings.is_empty());
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].raw, "node_modules");
    }

    #[test]
    fn invalid_glob_is_skipped_with_warning() {
        let (rules, warnings) = parse_rules("[invalid\nnode_modules\n");
        assert_eq!(rules.len(), 1);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].line, 1);
        assert_eq!(warnings[0].pattern, "[invalid");
    }

    #[test]
    fn last_matching_rule_wins_in_file_order() {
        let (rules, _) = parse_rules("!dist\ndist\n");
        let tree = files(&[("dist/app.js", 10)]);
        assert!(resolve(&tree, &rules).is_empty());

        let (rules, _) = parse_rules("dist\n!dist\n");
        let included = resolve(&tree, &rules);
        assert_eq!(paths(&included), vec!["dist/app.js"]);
    }

    #[test]
    fn resolve_is_idempotent_and_sorted() {
        let (rules, _) = parse_rules("*.log\n");
        let tree = files(&[
            ("src/b.js", 1),
            ("src/a.js", 1),
            ("npm-debug.log", 9),
        ]);
        let once = resolve(&tree, &rules);
        let twice = resolve(&once, &rules);
        assert_eq!(once, twice);
        assert_eq!(paths(&once), vec!["src/a.js", "src/b.js"]);
    }

    #[test]
    fn empty_rule_set_includes_everything() {
        let tree = files(&[("a", 1), ("b", 2)]);
        assert_eq!(resolve(&tree, &[]).len(), 2);
    }

    #[test]
    fn compile_patterns_drops_invalid_entries() {
        let compiled = compile_patterns(&["node_modules".to_string(), "[bad".to_string()]);
        assert_eq!(compiled.len(), 1);
    }
}
