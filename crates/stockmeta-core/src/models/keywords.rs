use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Separator used when a keyword list is stored as one text field
const JOIN_SEPARATOR: &str = ", ";

/// Ordered keyword list.
///
/// Invariants: no two entries are equal under case-insensitive comparison, no
/// entry is empty and no entry contains a comma. Order is significant (most specific terms first) and is
/// never changed once the set is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct KeywordSet {
    terms: Vec<String>,
}

impl KeywordSet {
    /// Build a set from raw terms, keeping at most `max` entries.
    /// A term containing commas counts as several terms. Terms are trimmed;
    /// empties and case-insensitive repeats are dropped, first occurrence wins.
    pub fn from_terms<I, S>(terms: I, max: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        'terms: for term in terms {
            for part in term.as_ref().split(',') {
                if out.len() >= max {
                    break 'terms;
                }
                let part = part.trim();
                if part.is_empty() || !seen.insert(part.to_lowercase()) {
                    continue;
                }
                out.push(part.to_string());
            }
        }
        Self { terms: out }
    }

    pub fn unbounded<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::from_terms(terms, usize::MAX)
    }

    /// Parse the comma-joined text form used by the record table
    pub fn parse_joined(text: &str) -> Self {
        Self::unbounded(text.split(','))
    }

    pub fn join(&self) -> String {
        self.terms.join(JOIN_SEPARATOR)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.terms.iter()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.terms
    }

    pub fn contains_ignore_case(&self, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        self.terms.iter().any(|t| t.to_lowercase() == needle)
    }

    /// Append candidates until the set holds `max` entries; see [`fill_keywords_to_max`]
    pub fn fill_to_max<S: AsRef<str>>(&self, max: usize, candidates: &[S]) -> Self {
        Self::from_terms(fill_keywords_to_max(&self.terms, max, candidates), max)
    }
}

impl From<Vec<String>> for KeywordSet {
    fn from(terms: Vec<String>) -> Self {
        Self::unbounded(terms)
    }
}

impl From<KeywordSet> for Vec<String> {
    fn from(set: KeywordSet) -> Self {
        set.terms
    }
}

impl<'a> IntoIterator for &'a KeywordSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.terms.iter()
    }
}

/// Pad `existing` with `candidates` up to `max` entries.
///
/// The output starts with the unique entries of `existing` in their original
/// order, followed by candidates not already present (case-insensitively) in
/// candidate order. Stops at `max` or when candidates run out. Re-running on an
/// already padded list with the same candidates returns it unchanged.
pub fn fill_keywords_to_max<E, C>(existing: &[E], max: usize, candidates: &[C]) -> Vec<String>
where
    E: AsRef<str>,
    C: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    let terms = existing
        .iter()
        .map(|t| t.as_ref())
        .chain(candidates.iter().map(|t| t.as_ref()));

    for term in terms {
        if out.len() >= max {
            break;
        }
        let term = term.trim();
        if term.is_empty() || !seen.insert(term.to_lowercase()) {
            continue;
        }
        out.push(term.to_string());
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_fill_collapses_duplicates_and_exhausts_candidates() {
        let out = fill_keywords_to_max(
            &["Sunset", "sunset", "Beach"],
            5,
            &["beach", "Mountain", "Mountain"],
        );
        assert_eq!(out, strings(&["Sunset", "Beach", "Mountain"]));
    }

    #[test]
    fn test_fill_stops_at_max() {
        let out = fill_keywords_to_max(&["a", "b"], 3, &["c", "d", "e"]);
        assert_eq!(out, strings(&["a", "b", "c"]));
    }

    #[test]
    fn test_fill_truncates_overlong_existing() {
        let out = fill_keywords_to_max(&["a", "b", "c", "d"], 2, &["e"]);
        assert_eq!(out, strings(&["a", "b"]));
    }

    #[test]
    fn test_fill_is_idempotent() {
        let candidates = strings(&["Tree", "river", "TREE", "sky", "cloud"]);
        let once = fill_keywords_to_max(&["River", "valley"], 4, &candidates);
        let twice = fill_keywords_to_max(&once, 4, &candidates);
        assert_eq!(once, strings(&["River", "valley", "Tree", "sky"]));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_fill_padding_scenario_forty_plus_twenty() {
        let existing: Vec<String> = (0..40).map(|i| format!("term{}", i)).collect();
        let mut candidates: Vec<String> = (0..5).map(|i| format!("TERM{}", i * 3)).collect();
        candidates.extend((0..15).map(|i| format!("extra{}", i)));

        let out = fill_keywords_to_max(&existing, 49, &candidates);

        assert_eq!(out.len(), 49);
        assert_eq!(&out[..40], existing.as_slice());
        let expected_tail: Vec<String> = (0..9).map(|i| format!("extra{}", i)).collect();
        assert_eq!(&out[40..], expected_tail.as_slice());
    }

    #[test]
    fn test_fill_properties_hold_for_mixed_inputs() {
        let inputs: &[(&[&str], usize, &[&str])] = &[
            (&[], 0, &["x"]),
            (&["A", "a", " a "], 10, &[]),
            (&["one"], 3, &["", "  ", "ONE", "two", "Two", "three", "four"]),
        ];
        for (existing, max, candidates) in inputs {
            let out = fill_keywords_to_max(existing, *max, candidates);
            assert!(out.len() <= *max);
            let lowered: HashSet<String> = out.iter().map(|t| t.to_lowercase()).collect();
            assert_eq!(lowered.len(), out.len());
            assert_eq!(fill_keywords_to_max(&out, *max, candidates), out);
        }
    }

    #[test]
    fn test_keyword_set_from_terms() {
        let set = KeywordSet::from_terms([" dog ", "Dog", "", "pet", "animal"], 2);
        assert_eq!(set.terms(), strings(&["dog", "pet"]).as_slice());
    }

    #[test]
    fn test_terms_with_commas_are_split() {
        let set = KeywordSet::from_terms(["Dog, domestic", "dog", "cat"], 10);
        assert_eq!(set.terms(), strings(&["Dog", "domestic", "cat"]).as_slice());
        assert!(set.iter().all(|t| !t.contains(',')));
        assert_eq!(KeywordSet::parse_joined(&set.join()), set);

        let capped = KeywordSet::from_terms(["a, b, c", "d"], 2);
        assert_eq!(capped.terms(), strings(&["a", "b"]).as_slice());
    }

    #[test]
    fn test_joined_text_form() {
        let set = KeywordSet::parse_joined("sunset, beach,, Ocean ,beach");
        assert_eq!(set.terms(), strings(&["sunset", "beach", "Ocean"]).as_slice());
        assert_eq!(set.join(), "sunset, beach, Ocean");
        assert_eq!(KeywordSet::parse_joined(&set.join()), set);
    }

    #[test]
    fn test_serde_normalises_input() {
        let set: KeywordSet = serde_json::from_str(r#"["Cat","cat","kitten"]"#).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["Cat","kitten"]"#);
    }
}
