use once_cell::sync::Lazy;
use std::collections::{BTreeSet, HashSet};
use unicode_normalization::UnicodeNormalization;

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "and", "for", "are", "but", "not", "you", "all", "can", "had", "has", "have",
        "was", "were", "one", "our", "out", "that", "this", "with", "they", "them", "their",
        "from", "what", "which", "who", "when", "where", "why", "how", "will", "would", "could",
        "should", "there", "here", "about", "into", "over", "after", "before", "between",
        "because", "while", "than", "then", "also", "very", "more", "most", "some", "any",
        "each", "every", "such", "only", "other", "same", "too", "does", "did", "its", "his",
        "her", "been", "being", "may", "might", "must", "shall", "upon",
    ]
    .into_iter()
    .collect()
});

/// Keyword set for one proposition: NFC-normalize, lower-case, split on
/// non-alphanumeric, drop short tokens and stop words, de-duplicate.
/// `BTreeSet` keeps downstream iteration order deterministic.
pub fn extract_keywords(text: &str) -> BTreeSet<String> {
    let normalized: String = text.nfc().collect::<String>().to_lowercase();
    let mut out = BTreeSet::new();
    for token in normalized.split(|c: char| !c.is_alphanumeric()) {
        if token.len() >= 3 && !STOP_WORDS.contains(token) {
            out.insert(token.to_string());
        }
    }
    out
}
