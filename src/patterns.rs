use regex::{Regex, RegexBuilder};

use crate::models::{AnalysisResult, EducationalResource, FeedbackType};

/// Output of a single detector: one category hit with its evidence.
#[derive(Debug, Clone)]
pub struct Detection {
    pub kind: FeedbackType,
    pub subtype: Option<String>,
    pub match_count: usize,
    pub confidence_score: f64,
    pub reasoning: String,
    pub suggestion_text: String,
    pub educational_resources: Option<Vec<EducationalResource>>,
}

impl Detection {
    pub fn into_result(self) -> AnalysisResult {
        AnalysisResult {
            kind: self.kind,
            subtype: self.subtype,
            suggestion_text: self.suggestion_text,
            reasoning: self.reasoning,
            confidence_score: self.confidence_score,
            educational_resources: self.educational_resources,
        }
    }
}

/// One row of a detector's pattern table: compiled pattern, subtype tag,
/// base weight. Declaration order is part of the contract (ties in subtype
/// selection go to the first-declared entry).
#[derive(Clone)]
pub struct PatternEntry {
    pub pattern: Regex,
    pub subtype: &'static str,
    pub weight: f64,
}

/// A fixed, ordered table of case-insensitive patterns for one concern.
/// Cloning is cheap: a cloned `Regex` shares its compiled program, so the
/// default tables live in `Lazy` statics and constructors clone from them.
#[derive(Clone)]
pub struct PatternTable {
    entries: Vec<PatternEntry>,
}

/// Aggregated scan output across every pattern in a table.
#[derive(Debug, Clone)]
pub struct TableScan {
    pub match_count: usize,      // raw non-overlapping matches across all patterns
    pub weighted_count: f64,     // matches scaled by per-pattern weight
    pub subtype: &'static str,   // highest match count; first-declared wins ties
    pub subtype_families: usize, // distinct subtypes that matched at all
    pub excerpts: Vec<String>,   // <= 2 quoted matched spans
}

impl PatternTable {
    /// Compile a table from `(pattern, subtype, weight)` rows. Patterns are
    /// compiled case-insensitive; a row that fails to compile is a defect in
    /// the static tables, so this panics at construction.
    pub fn build(rows: &[(&str, &'static str, f64)]) -> Self {
        let entries = rows
            .iter()
            .map(|&(pat, subtype, weight)| PatternEntry {
                pattern: RegexBuilder::new(pat)
                    .case_insensitive(true)
                    .build()
                    .unwrap_or_else(|e| panic!("bad pattern {pat:?}: {e}")),
                subtype,
                weight,
            })
            .collect();
        Self { entries }
    }

    /// Count all non-overlapping matches per pattern across the whole text.
    /// Returns None when nothing in the table matches: absence must stay
    /// distinguishable from a weak positive.
    pub fn scan(&self, text: &str) -> Option<TableScan> {
        let mut match_count = 0usize;
        let mut weighted_count = 0.0f64;
        // (subtype, count) in first-declaration order
        let mut per_subtype: Vec<(&'static str, usize)> = Vec::new();
        let mut excerpts: Vec<String> = Vec::new();

        for entry in &self.entries {
            let hits = entry.pattern.find_iter(text).count();
            if hits == 0 {
                continue;
            }
            match_count += hits;
            weighted_count += hits as f64 * entry.weight;

            match per_subtype.iter_mut().find(|(s, _)| *s == entry.subtype) {
                Some((_, c)) => *c += hits,
                None => per_subtype.push((entry.subtype, hits)),
            }

            if excerpts.len() < 2 {
                for m in entry.pattern.find_iter(text) {
                    if excerpts.len() >= 2 {
                        break;
                    }
                    let quoted = format!("\"{}\"", m.as_str().trim());
                    if !excerpts.contains(&quoted) {
                        excerpts.push(quoted);
                    }
                }
            }
        }

        if match_count == 0 {
            return None;
        }

        // Strictly-greater comparison keeps the first-declared subtype on ties.
        let mut subtype = per_subtype[0].0;
        let mut best = per_subtype[0].1;
        for &(s, c) in &per_subtype[1..] {
            if c > best {
                subtype = s;
                best = c;
            }
        }

        Some(TableScan {
            match_count,
            weighted_count,
            subtype,
            subtype_families: per_subtype.len(),
            excerpts,
        })
    }
}

/// Confidence parameters for one detector category:
/// `min(base + weighted_count * per_match, cap)`, where the cap rises to
/// `corroborated_cap` only when at least two distinct subtype families
/// matched. Both caps sit strictly below 1.0 so a single-pattern hit can
/// never masquerade as certainty.
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceModel {
    pub base: f64,
    pub per_match: f64,
    pub cap: f64,
    pub corroborated_cap: f64,
}

impl ConfidenceModel {
    pub fn score(&self, scan: &TableScan) -> f64 {
        let cap = if scan.subtype_families >= 2 {
            self.corroborated_cap
        } else {
            self.cap
        };
        (self.base + scan.weighted_count * self.per_match)
            .min(cap)
            .clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PatternTable {
        PatternTable::build(&[
            (r"\balpha\b", "first", 1.0),
            (r"\bbeta\b", "second", 1.0),
            (r"\bgamma\b", "second", 2.0),
        ])
    }

    #[test]
    fn no_match_is_none_not_zero() {
        assert!(table().scan("nothing relevant here").is_none());
    }

    #[test]
    fn counts_all_non_overlapping_matches() {
        let scan = table().scan("alpha then ALPHA then beta").unwrap();
        assert_eq!(scan.match_count, 3);
        assert_eq!(scan.subtype, "first"); // 2 alpha vs 1 beta
        assert_eq!(scan.subtype_families, 2);
    }

    #[test]
    fn subtype_tie_goes_to_first_declared() {
        let scan = table().scan("alpha and beta").unwrap();
        assert_eq!(scan.subtype, "first");
    }

    #[test]
    fn weights_feed_weighted_count() {
        let scan = table().scan("gamma gamma").unwrap();
        assert_eq!(scan.match_count, 2);
        assert_eq!(scan.weighted_count, 4.0);
    }

    #[test]
    fn excerpts_bounded_at_two_and_quoted() {
        let scan = table().scan("alpha beta gamma alpha").unwrap();
        assert_eq!(scan.excerpts.len(), 2);
        assert!(scan.excerpts[0].starts_with('"'));
    }

    #[test]
    fn cloned_table_scans_identically() {
        let original = table();
        let clone = original.clone();
        let a = original.scan("alpha beta gamma").unwrap();
        let b = clone.scan("alpha beta gamma").unwrap();
        assert_eq!(a.match_count, b.match_count);
        assert_eq!(a.weighted_count, b.weighted_count);
        assert_eq!(a.subtype, b.subtype);
        assert_eq!(a.excerpts, b.excerpts);
    }

    #[test]
    fn confidence_caps_and_corroboration() {
        let model = ConfidenceModel {
            base: 0.5,
            per_match: 0.1,
            cap: 0.8,
            corroborated_cap: 0.9,
        };
        let single = table().scan("alpha alpha alpha alpha alpha").unwrap();
        assert_eq!(single.subtype_families, 1);
        assert_eq!(model.score(&single), 0.8);

        let multi = table().scan("alpha alpha alpha alpha beta").unwrap();
        assert_eq!(multi.subtype_families, 2);
        assert_eq!(model.score(&multi), 0.9);
    }
}
