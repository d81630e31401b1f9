use crate::catalog::normalize;
use crate::model::{Candidate, CatalogIndex, MatchBucket};
use crate::similarity::{sequence_ratio, upper_bound};

/// Resolve a SKU via the exact-match dictionary.
///
/// The probe is normalized with the rule the index was built with, so
/// lookup can never disagree with build-time normalization. Read-only;
/// safe to call for many rows against one index.
pub fn match_exact<'a>(index: &'a CatalogIndex, sku: &str) -> Option<&'a str> {
    index.exact.get(&normalize(sku, index.case)).map(String::as_str)
}

/// A fuzzy hit: the resolved MSKU, its score, and which pool produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyHit<'a> {
    pub msku: &'a str,
    pub score: f64,
    pub bucket: MatchBucket,
}

/// Resolve a SKU against the code pool, then the title pool.
///
/// Returns the highest-scoring candidate with score ≥ threshold; on equal
/// scores the earliest candidate in pool order wins. The title pool is
/// only consulted when the code pool yields nothing.
pub fn match_fuzzy<'a>(
    index: &'a CatalogIndex,
    sku: &str,
    threshold: f64,
) -> Option<FuzzyHit<'a>> {
    let probe = sku.trim();
    // Empty probes never match; they would otherwise score high against
    // short candidates.
    if probe.is_empty() {
        return None;
    }

    best_in_pool(&index.code_pool, probe, threshold, MatchBucket::FuzzyCode)
        .or_else(|| best_in_pool(&index.title_pool, probe, threshold, MatchBucket::FuzzyTitle))
}

fn best_in_pool<'a>(
    pool: &'a [Candidate],
    probe: &str,
    threshold: f64,
    bucket: MatchBucket,
) -> Option<FuzzyHit<'a>> {
    let probe_len = probe.chars().count();
    let mut best: Option<FuzzyHit<'a>> = None;

    for candidate in pool {
        // Length bound: skip candidates that cannot reach the threshold.
        if upper_bound(probe_len, candidate.text.chars().count()) < threshold {
            continue;
        }

        let score = sequence_ratio(probe, &candidate.text);
        if score < threshold {
            continue;
        }

        // Strict > keeps the first candidate on equal scores.
        if best.as_ref().map_or(true, |b| score > b.score) {
            best = Some(FuzzyHit { msku: &candidate.msku, score, bucket });
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::build_index;
    use crate::config::{CaseMode, CatalogColumns};
    use crate::model::Table;

    fn index(csv: &str, case: CaseMode) -> CatalogIndex {
        let table = Table::from_csv(csv).unwrap();
        build_index(&table, &CatalogColumns::default(), case).unwrap()
    }

    #[test]
    fn exact_hit() {
        let idx = index("MSKU\nAB-100\n", CaseMode::Insensitive);
        assert_eq!(match_exact(&idx, "AB-100"), Some("AB-100"));
        assert_eq!(match_exact(&idx, "  ab-100 "), Some("AB-100"));
    }

    #[test]
    fn exact_miss() {
        let idx = index("MSKU\nAB-100\n", CaseMode::Insensitive);
        assert_eq!(match_exact(&idx, "ZZ-999"), None);
    }

    #[test]
    fn exact_respects_case_mode() {
        let idx = index("MSKU\nAB-100\n", CaseMode::Sensitive);
        assert_eq!(match_exact(&idx, "AB-100"), Some("AB-100"));
        assert_eq!(match_exact(&idx, "ab-100"), None);
    }

    #[test]
    fn fuzzy_hit_in_code_pool() {
        let idx = index("MSKU,Title\nAB-100,Blue Widget\n", CaseMode::Insensitive);
        let hit = match_fuzzy(&idx, "AB100", 0.8).unwrap();
        assert_eq!(hit.msku, "AB-100");
        assert_eq!(hit.bucket, MatchBucket::FuzzyCode);
        assert!(hit.score >= 0.8);
    }

    #[test]
    fn fuzzy_falls_back_to_title_pool() {
        let idx = index("MSKU,Title\nAB-100,Blue Widget\n", CaseMode::Insensitive);
        let hit = match_fuzzy(&idx, "Blue Widgets", 0.8).unwrap();
        assert_eq!(hit.msku, "AB-100");
        assert_eq!(hit.bucket, MatchBucket::FuzzyTitle);
    }

    #[test]
    fn fuzzy_no_match() {
        let idx = index("MSKU,Title\nAB-100,Blue Widget\n", CaseMode::Insensitive);
        assert!(match_fuzzy(&idx, "Totally Unrelated", 0.8).is_none());
    }

    #[test]
    fn fuzzy_rejects_empty_probe() {
        let idx = index("MSKU\nA\n", CaseMode::Insensitive);
        assert!(match_fuzzy(&idx, "", 0.1).is_none());
        assert!(match_fuzzy(&idx, "   ", 0.1).is_none());
    }

    #[test]
    fn fuzzy_score_equal_to_threshold_accepted() {
        // ratio("AB1", "AB10") = 2*3/7; use it as the exact threshold
        let idx = index("MSKU\nAB10\n", CaseMode::Insensitive);
        let tau = 6.0 / 7.0;
        let hit = match_fuzzy(&idx, "AB1", tau).unwrap();
        assert_eq!(hit.msku, "AB10");
    }

    #[test]
    fn fuzzy_tie_break_is_pool_order() {
        // Both candidates score identically against the probe
        let idx = index("MSKU\nAB-1\nAB-2\n", CaseMode::Insensitive);
        let hit = match_fuzzy(&idx, "AB-", 0.5).unwrap();
        assert_eq!(hit.msku, "AB-1");
    }

    #[test]
    fn fuzzy_best_score_wins_over_order() {
        let idx = index("MSKU\nAB-1999\nAB-100\n", CaseMode::Insensitive);
        let hit = match_fuzzy(&idx, "AB100", 0.5).unwrap();
        assert_eq!(hit.msku, "AB-100");
    }

    #[test]
    fn title_pool_not_consulted_when_code_pool_hits() {
        // Probe clears the threshold in both pools; code pool must win
        let idx = index("MSKU,Title\nWIDGET-9,WIDGET-X\n", CaseMode::Insensitive);
        let hit = match_fuzzy(&idx, "WIDGET-", 0.7).unwrap();
        assert_eq!(hit.bucket, MatchBucket::FuzzyCode);
        assert_eq!(hit.msku, "WIDGET-9");
    }
}
