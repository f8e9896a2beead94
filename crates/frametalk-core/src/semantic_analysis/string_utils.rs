// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! String distance helpers behind "did you mean" suggestions.

/// Levenshtein edit distance between two strings, by characters rather than
/// bytes so multibyte identifiers are not over-counted.
pub(crate) fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = usize::from(ca != cb);
            current[j + 1] = (previous[j] + substitution)
                .min(previous[j + 1] + 1)
                .min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

/// Closest candidate to `attempted`, or `None` when nothing is close enough.
///
/// Comparison is case-insensitive and the acceptance threshold scales with
/// the attempted name, `max(1, len / 3)`, so short names only tolerate a
/// single edit. Ties keep the earliest candidate, which for symbol lookups
/// means registration order decides.
pub(crate) fn closest_match<'a, I>(attempted: &str, candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let attempted_lower = attempted.to_lowercase();
    let threshold = (attempted.chars().count() / 3).max(1);
    let mut best: Option<(&str, usize)> = None;
    for candidate in candidates {
        let distance = edit_distance(&attempted_lower, &candidate.to_lowercase());
        if distance <= threshold && best.map_or(true, |(_, d)| distance < d) {
            best = Some((candidate, distance));
        }
    }
    best.map(|(candidate, _)| candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_distance_basic_cases() {
        assert_eq!(edit_distance("", ""), 0);
        assert_eq!(edit_distance("sales", ""), 5);
        assert_eq!(edit_distance("sales", "sales"), 0);
        assert_eq!(edit_distance("sales", "sails"), 2);
        assert_eq!(edit_distance("sales", "sale"), 1);
        assert_eq!(edit_distance("kitten", "sitting"), 3);
    }

    #[test]
    fn edit_distance_counts_characters_not_bytes() {
        assert_eq!(edit_distance("café", "cafe"), 1);
    }

    #[test]
    fn close_names_are_suggested() {
        let candidates = ["sales", "orders", "customers"];
        assert_eq!(closest_match("sals", candidates), Some("sales"));
        assert_eq!(closest_match("order", candidates), Some("orders"));
    }

    #[test]
    fn matching_ignores_case() {
        assert_eq!(closest_match("SALES", ["sales"]), Some("sales"));
    }

    #[test]
    fn distant_names_are_not_suggested() {
        assert_eq!(closest_match("revenue", ["sales", "orders"]), None);
    }

    #[test]
    fn short_names_tolerate_one_edit_only() {
        assert_eq!(closest_match("df", ["db"]), Some("db"));
        assert_eq!(closest_match("df", ["data"]), None);
    }

    #[test]
    fn ties_keep_the_earliest_candidate() {
        // "salex" is one edit from both; registration order wins.
        assert_eq!(closest_match("salex", ["sales", "salem"]), Some("sales"));
        assert_eq!(closest_match("salex", ["salem", "sales"]), Some("salem"));
    }
}
