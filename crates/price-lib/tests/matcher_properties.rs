use price_lib::matcher::{normalize, similarity, FuzzyMatcher, DEFAULT_CUTOFF};
use proptest::prelude::*;

fn labels(alphabet: &'static str) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(alphabet, 1..8)
}

// ── Exact labels always match themselves ──────────────────────────────────

proptest! {
    #[test]
    fn exact_label_matches_itself(
        candidates in labels("[A-Z][a-z]{2,10}"),
        pick in any::<prop::sample::Index>(),
        pad_left in " {0,3}",
        pad_right in " {0,3}",
        upper in any::<bool>(),
    ) {
        let label = candidates[pick.index(candidates.len())].clone();
        let cased = if upper { label.to_uppercase() } else { label.to_lowercase() };
        let input = format!("{pad_left}{cased}{pad_right}");

        let matcher = FuzzyMatcher::default();
        let found = matcher.find(&input, &candidates);

        prop_assert!(found.is_some(), "no match for {:?} in {:?}", input, candidates);
        let found = found.unwrap();
        prop_assert_eq!(found.label, label.as_str());
        prop_assert_eq!(found.score, 1.0);
    }
}

// ── Inputs sharing no characters never match ──────────────────────────────

proptest! {
    #[test]
    fn disjoint_input_never_matches(
        candidates in labels("[A-Y][a-y]{2,10}"),
        tail in "z{0,12}",
    ) {
        let input = format!("z{tail}");
        let matcher = FuzzyMatcher::default();
        prop_assert!(matcher.find(&input, &candidates).is_none());
    }
}

// ── Result is always a candidate clearing the cutoff ──────────────────────

proptest! {
    #[test]
    fn match_is_best_candidate_above_cutoff(
        candidates in labels("[A-Z][a-z]{1,8}"),
        input in "[a-zA-Z ]{0,12}",
    ) {
        let matcher = FuzzyMatcher::default();
        let normalized = normalize(&input);

        if let Some(found) = matcher.find(&input, &candidates) {
            prop_assert!(candidates.iter().any(|c| c == found.label));
            prop_assert!(found.score >= DEFAULT_CUTOFF);
            for c in &candidates {
                prop_assert!(similarity(c, &normalized) <= found.score);
            }
        } else {
            for c in &candidates {
                prop_assert!(similarity(c, &normalized) < DEFAULT_CUTOFF);
            }
        }
    }

    #[test]
    fn similarity_is_bounded(a in ".{0,16}", b in ".{0,16}") {
        let s = similarity(&a, &b);
        prop_assert!((0.0..=1.0).contains(&s));
    }
}
