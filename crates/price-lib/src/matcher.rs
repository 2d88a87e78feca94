//! Fuzzy matching of free-text fruit names against the known labels
//!
//! Similarity is the longest-matching-blocks ratio: the longest common
//! substring is taken, then the same search recurses on the text to its left
//! and right. With `M` matched characters the score is `2M / (|a| + |b|)`.
//!
//! The ratio is not symmetric: ties between equally long blocks go to the
//! earliest position in `a`. Candidates are always passed as `a` and the
//! user input as `b`.

/// Default minimum similarity for a match
pub const DEFAULT_CUTOFF: f64 = 0.6;

/// A candidate that cleared the cutoff
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzyMatch<'a> {
    pub label: &'a str,
    pub score: f64,
}

/// Picks the single best known label for a user supplied name
#[derive(Debug, Clone, Copy)]
pub struct FuzzyMatcher {
    cutoff: f64,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_CUTOFF)
    }
}

impl FuzzyMatcher {
    /// Create a matcher; the cutoff is clamped into `[0, 1]`
    pub fn new(cutoff: f64) -> Self {
        Self {
            cutoff: cutoff.clamp(0.0, 1.0),
        }
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Normalize `input` and return the best candidate scoring at least the
    /// cutoff. Ties keep the candidate that comes first.
    pub fn find<'a, S: AsRef<str>>(
        &self,
        input: &str,
        candidates: &'a [S],
    ) -> Option<FuzzyMatch<'a>> {
        let normalized = normalize(input);
        let mut best: Option<FuzzyMatch<'a>> = None;

        for candidate in candidates {
            let label = candidate.as_ref();
            let score = similarity(label, &normalized);
            if score < self.cutoff {
                continue;
            }
            if best.map_or(true, |b| score > b.score) {
                best = Some(FuzzyMatch { label, score });
            }
        }

        best
    }
}

/// Trim surrounding whitespace and title-case every run of cased letters.
///
/// A letter following a cased letter is lowercased, any other letter gets its
/// titlecase form, so `"3rd"` becomes `"3Rd"` and `"ß"` becomes `"Ss"`.
pub fn normalize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut previous_cased = false;

    for c in input.trim().chars() {
        if previous_cased {
            out.extend(c.to_lowercase());
        } else {
            push_titlecase(&mut out, c);
        }
        previous_cased = is_cased(c);
    }

    out
}

fn is_cased(c: char) -> bool {
    c.is_uppercase() || c.is_lowercase() || titlecase_digraph(c).is_some()
}

/// Latin digraphs whose titlecase form differs from their uppercase form
fn titlecase_digraph(c: char) -> Option<char> {
    match c {
        'Ǆ' | 'ǅ' | 'ǆ' => Some('ǅ'),
        'Ǉ' | 'ǈ' | 'ǉ' => Some('ǈ'),
        'Ǌ' | 'ǋ' | 'ǌ' => Some('ǋ'),
        'Ǳ' | 'ǲ' | 'ǳ' => Some('ǲ'),
        _ => None,
    }
}

/// Titlecase of `c`: the uppercase expansion up to its first cased letter,
/// with the remainder lowercased (`ß` -> `Ss`, `ﬁ` -> `Fi`).
fn push_titlecase(out: &mut String, c: char) {
    if let Some(title) = titlecase_digraph(c) {
        out.push(title);
        return;
    }

    let mut seen_cased = false;
    for u in c.to_uppercase() {
        if seen_cased {
            out.extend(u.to_lowercase());
        } else {
            out.push(u);
            seen_cased = is_cased(u);
        }
    }
}

/// Similarity ratio in `[0, 1]`; two empty strings are identical
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let (i, j, k) = longest_common_block(a, b);
    if k == 0 {
        return 0;
    }
    k + matching_chars(&a[..i], &b[..j]) + matching_chars(&a[i + k..], &b[j + k..])
}

/// Longest common substring as `(start_a, start_b, len)`, earliest in `a`
/// then earliest in `b` on ties.
fn longest_common_block(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        for (j, cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                let k = prev[j] + 1;
                if k > best.2 {
                    best = (i + 1 - k, j + 1 - k, k);
                }
                k
            } else {
                0
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fruits() -> Vec<String> {
        ["Apple", "Banana", "Blueberries", "Mango", "Orange"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_normalize_title_cases_and_trims() {
        assert_eq!(normalize("  appl "), "Appl");
        assert_eq!(normalize("GREEN apple"), "Green Apple");
        assert_eq!(normalize("o'neil"), "O'Neil");
        assert_eq!(normalize("3rd"), "3Rd");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_normalize_non_ascii_word_boundaries() {
        // uncased letters do not start a word
        assert_eq!(normalize("中b"), "中B");
        assert_eq!(normalize("ß"), "Ss");
        assert_eq!(normalize("ßa"), "Ssa");
        assert_eq!(normalize("ﬁsh"), "Fish");
        assert_eq!(normalize("ǆemal"), "ǅemal");
        assert_eq!(normalize("ÉCLAIR"), "Éclair");
    }

    #[test]
    fn test_similarity_known_values() {
        assert_eq!(similarity("Apple", "Apple"), 1.0);
        assert!((similarity("Appl", "Apple") - 8.0 / 9.0).abs() < 1e-12);
        assert!((similarity("abcd", "bcde") - 0.75).abs() < 1e-12);
        assert_eq!(similarity("abc", "xyz"), 0.0);
        assert_eq!(similarity("", ""), 1.0);
        assert_eq!(similarity("", "a"), 0.0);
    }

    #[test]
    fn test_similarity_counts_blocks_on_both_sides() {
        // "ab" is taken first, then "de" is found to its right
        assert!((similarity("abXde", "abYde") - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_similarity_is_order_sensitive() {
        assert!((similarity("Blueberries", "Lbuleberrsise") - 2.0 / 3.0).abs() < 1e-12);
        assert!((similarity("Lbuleberrsise", "Blueberries") - 7.0 / 12.0).abs() < 1e-12);
        assert!((similarity("Honeydew", "Hnyetw") - 4.0 / 7.0).abs() < 1e-12);
        assert!((similarity("Hnyetw", "Honeydew") - 5.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_find_scores_candidate_against_input() {
        let matcher = FuzzyMatcher::default();

        let found = matcher.find("lbuleberrsise", &["Blueberries"]).unwrap();
        assert_eq!(found.label, "Blueberries");
        assert!((found.score - 2.0 / 3.0).abs() < 1e-12);

        assert!(matcher.find("hnyetw", &["Honeydew"]).is_none());
    }

    #[test]
    fn test_find_partial_name() {
        let fruits = fruits();
        let matcher = FuzzyMatcher::default();
        let found = matcher.find("appl", &fruits).unwrap();
        assert_eq!(found.label, "Apple");
        assert!(found.score >= DEFAULT_CUTOFF);
    }

    #[test]
    fn test_find_exact_after_normalization() {
        let fruits = fruits();
        let matcher = FuzzyMatcher::default();
        let found = matcher.find("  mANGO ", &fruits).unwrap();
        assert_eq!(found.label, "Mango");
        assert_eq!(found.score, 1.0);
    }

    #[test]
    fn test_find_no_match() {
        let matcher = FuzzyMatcher::default();
        assert!(matcher.find("zzzznotafruit", &fruits()).is_none());
    }

    #[test]
    fn test_find_empty_candidates() {
        let matcher = FuzzyMatcher::default();
        let empty: Vec<String> = Vec::new();
        assert!(matcher.find("Apple", &empty).is_none());
    }

    #[test]
    fn test_tie_prefers_first_candidate() {
        let matcher = FuzzyMatcher::new(0.5);
        // "Ab" scores 0.8 against both
        let candidates = ["Abc", "Abd"];
        assert_eq!(matcher.find("ab", &candidates).unwrap().label, "Abc");
        let reversed = ["Abd", "Abc"];
        assert_eq!(matcher.find("ab", &reversed).unwrap().label, "Abd");
    }

    #[test]
    fn test_cutoff_is_inclusive() {
        // "Ab" vs "Abc" scores exactly 0.8
        let matcher = FuzzyMatcher::new(0.8);
        assert!(matcher.find("ab", &["Abc"]).is_some());
        let strict = FuzzyMatcher::new(0.81);
        assert!(strict.find("ab", &["Abc"]).is_none());
    }

    #[test]
    fn test_cutoff_clamped() {
        assert_eq!(FuzzyMatcher::new(1.5).cutoff(), 1.0);
        assert_eq!(FuzzyMatcher::new(-0.1).cutoff(), 0.0);
    }
}
