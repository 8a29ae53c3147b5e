//! Output Set Reconciler - expected vs. actual path-set comparison.
//!
//! Reconciliation partitions `expected ∪ actual` into three disjoint sets:
//! `missing` (expected but not produced), `unexpected` (produced but not
//! expected), and `matched`. Comparison is exact-string after normalization;
//! case is preserved because most target filesystems are case-sensitive.
//!
//! No ordering is imposed on the output sets. Callers needing stable display
//! sort independently; sorting is a presentation concern.

use std::collections::BTreeSet;

use serde::Serialize;

/// Normalizes a relative artifact path for comparison.
///
/// Backslash separators become forward slashes, duplicate separators
/// collapse, leading `./` segments and any trailing slash are stripped.
/// Idempotent: normalizing an already-normalized path is a no-op.
pub fn normalize_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut prev_sep = false;
    for ch in path.chars() {
        let ch = if ch == '\\' { '/' } else { ch };
        if ch == '/' {
            if prev_sep {
                continue;
            }
            prev_sep = true;
        } else {
            prev_sep = false;
        }
        out.push(ch);
    }
    while out.starts_with("./") {
        out.drain(..2);
    }
    if out.len() > 1 && out.ends_with('/') {
        out.pop();
    }
    out
}

/// Structured diff of an expected path set against an actual one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationResult {
    pub missing: BTreeSet<String>,
    pub unexpected: BTreeSet<String>,
    pub matched: BTreeSet<String>,
    pub passed: bool,
}

impl ReconciliationResult {
    /// A passing result over an exact match.
    pub fn all_matched(matched: BTreeSet<String>) -> Self {
        Self {
            missing: BTreeSet::new(),
            unexpected: BTreeSet::new(),
            matched,
            passed: true,
        }
    }
}

/// Diffs `expected` against `actual`.
///
/// Pure and deterministic, O(|expected| + |actual|). Both inputs are assumed
/// already normalized (see [`normalize_path`]); the harness normalizes paths
/// on ingestion so comparison here is exact-string.
pub fn reconcile(expected: &BTreeSet<String>, actual: &BTreeSet<String>) -> ReconciliationResult {
    let missing: BTreeSet<String> = expected.difference(actual).cloned().collect();
    let unexpected: BTreeSet<String> = actual.difference(expected).cloned().collect();
    let matched: BTreeSet<String> = expected.intersection(actual).cloned().collect();
    let passed = missing.is_empty() && unexpected.is_empty();
    ReconciliationResult {
        missing,
        unexpected,
        matched,
        passed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(paths: &[&str]) -> BTreeSet<String> {
        paths.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn normalization_is_idempotent() {
        for raw in [
            "ops/database/config.yaml",
            ".\\ops\\database\\config.yaml",
            "./ops//database/config.yaml/",
            "././a/b",
        ] {
            let once = normalize_path(raw);
            assert_eq!(normalize_path(&once), once);
        }
    }

    #[test]
    fn separator_variants_normalize_equal() {
        assert_eq!(
            normalize_path("ops\\database\\backup-policy.yaml"),
            normalize_path("./ops/database/backup-policy.yaml"),
        );
    }

    #[test]
    fn case_is_preserved() {
        assert_eq!(normalize_path("Ops/Database/Config.yaml"), "Ops/Database/Config.yaml");
    }

    #[test]
    fn equal_sets_reconcile_to_all_matched() {
        let s = set(&["a/b.yaml", "c/d.yaml"]);
        let result = reconcile(&s, &s);
        assert!(result.passed);
        assert!(result.missing.is_empty());
        assert!(result.unexpected.is_empty());
        assert_eq!(result.matched, s);
    }

    #[test]
    fn reconcile_partitions_the_union_disjointly() {
        let expected = set(&["a", "b", "c"]);
        let actual = set(&["b", "c", "d"]);
        let result = reconcile(&expected, &actual);

        assert_eq!(result.missing, set(&["a"]));
        assert_eq!(result.unexpected, set(&["d"]));
        assert_eq!(result.matched, set(&["b", "c"]));

        let union: BTreeSet<String> = expected.union(&actual).cloned().collect();
        let mut partition = BTreeSet::new();
        for part in [&result.missing, &result.unexpected, &result.matched] {
            for path in part {
                assert!(partition.insert(path.clone()), "overlap on '{}'", path);
            }
        }
        assert_eq!(partition, union);
        assert!(!result.passed);
    }

    #[test]
    fn empty_against_empty_passes() {
        let empty = BTreeSet::new();
        assert!(reconcile(&empty, &empty).passed);
    }
}
