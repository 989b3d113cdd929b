//! Rule explanation helpers for the `imageslim explain` command.

use imageslim_rules::{RuleMeta, rule_metas};

/// Look up a rule by its kebab-case id. Case-insensitive, and underscores
/// are accepted in place of hyphens.
pub fn lookup_rule(id: &str) -> Option<RuleMeta> {
    let normalized = id.to_ascii_lowercase().replace('_', "-");
    rule_metas().into_iter().find(|meta| meta.id == normalized)
}

/// All rule ids, sorted.
pub fn list_rule_ids() -> Vec<&'static str> {
    rule_metas().iter().map(|meta| meta.id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_finds_every_listed_rule() {
        for id in list_rule_ids() {
            let meta = lookup_rule(id).expect("listed rule resolves");
            assert_eq!(meta.id, id);
            assert!(!meta.summary.is_empty());
            assert!(!meta.detail.is_empty());
        }
    }

    #[test]
    fn lookup_unknown_rule_is_none() {
        assert!(lookup_rule("does-not-exist").is_none());
    }

    #[test]
    fn lookup_normalizes_case_and_underscores() {
        assert!(lookup_rule("SLIM-BASE").is_some());
        assert!(lookup_rule("slim_base").is_some());
    }

    #[test]
    fn rule_ids_are_sorted() {
        let ids = list_rule_ids();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }
}
