use once_cell::sync::Lazy;

use crate::models::{EducationalResource, FeedbackType};
use crate::patterns::{ConfidenceModel, Detection, PatternTable};

/// Detector for unsourced claims and loaded/biased language. Two-tier by
/// construction: when both tables match the same text, the unsourced table
/// always wins. That is a fixed design rule, not a confidence comparison.
pub struct ClarityAnalyzer {
    unsourced: PatternTable,
    bias: PatternTable,
    unsourced_confidence: ConfidenceModel,
    bias_confidence: ConfidenceModel,
}

const UNSOURCED_ROWS: &[(&str, &str, f64)] = &[
    (
        r"\b(?:research|studies|science) (?:demonstrates?|shows?|proves?|confirms?)\b",
        "unattributed_research",
        1.0,
    ),
    (
        r"\bstudies have (?:shown|found|proven)\b",
        "unattributed_research",
        1.0,
    ),
    (
        r"\bit(?:'s| is) (?:a )?proven (?:fact|that)\b",
        "unattributed_research",
        1.0,
    ),
    (r"\b\d+(?:\.\d+)?\s?(?:%|percent)\b", "bare_statistic", 1.0),
    (r"\bstatistics (?:show|prove)\b", "bare_statistic", 1.0),
    (
        r"\b(?:many|most) (?:people|experts|economists) (?:say|believe|agree)\b",
        "vague_authority",
        1.0,
    ),
    (
        r"\bit is widely (?:known|accepted|believed)\b",
        "vague_authority",
        1.0,
    ),
];

const BIAS_ROWS: &[(&str, &str, f64)] = &[
    (
        r"\b(?:radical|extremist|insane|crazy|ridiculous|absurd) (?:idea|plan|policy|proposal|agenda)\b",
        "loaded_language",
        1.0,
    ),
    (r"\b(?:disaster|catastrophe|travesty)\b", "loaded_language", 0.5),
    (r"\bcommon sense (?:says|tells us)\b", "loaded_language", 1.0),
    (r"\bany reasonable person\b", "loaded_language", 1.0),
    (
        r"\b(?:obviously|clearly|undeniably|unquestionably)\b",
        "absolute_framing",
        0.5,
    ),
    (
        r"\bthere(?:'s| is) no (?:question|doubt|debate)\b",
        "absolute_framing",
        1.0,
    ),
];

const UNSOURCED_CONFIDENCE: ConfidenceModel = ConfidenceModel {
    base: 0.55,
    per_match: 0.10,
    cap: 0.85,
    corroborated_cap: 0.90,
};

const BIAS_CONFIDENCE: ConfidenceModel = ConfidenceModel {
    base: 0.50,
    per_match: 0.10,
    cap: 0.80,
    corroborated_cap: 0.85,
};

static UNSOURCED_TABLE: Lazy<PatternTable> = Lazy::new(|| PatternTable::build(UNSOURCED_ROWS));
static BIAS_TABLE: Lazy<PatternTable> = Lazy::new(|| PatternTable::build(BIAS_ROWS));

impl ClarityAnalyzer {
    /// Clones the shared default tables; each regex compiles once per process.
    pub fn new() -> Self {
        Self::with_tables(
            UNSOURCED_TABLE.clone(),
            UNSOURCED_CONFIDENCE,
            BIAS_TABLE.clone(),
            BIAS_CONFIDENCE,
        )
    }

    /// Construct with explicit tables, so tests can substitute fixtures.
    pub fn with_tables(
        unsourced: PatternTable,
        unsourced_confidence: ConfidenceModel,
        bias: PatternTable,
        bias_confidence: ConfidenceModel,
    ) -> Self {
        Self {
            unsourced,
            bias,
            unsourced_confidence,
            bias_confidence,
        }
    }

    pub fn analyze(&self, text: &str) -> Option<Detection> {
        if let Some(scan) = self.unsourced.scan(text) {
            let confidence_score = self.unsourced_confidence.score(&scan);
            return Some(Detection {
                kind: FeedbackType::Unsourced,
                subtype: Some(scan.subtype.to_string()),
                match_count: scan.match_count,
                confidence_score,
                reasoning: format!(
                    "Unsourced claim ({}): {}",
                    scan.subtype.replace('_', " "),
                    scan.excerpts.join(", ")
                ),
                suggestion_text:
                    "Link the study, dataset, or source behind this claim so others can verify it."
                        .to_string(),
                educational_resources: Some(vec![EducationalResource {
                    title: "Evaluating sources".to_string(),
                    url: "https://en.wikipedia.org/wiki/Source_criticism".to_string(),
                }]),
            });
        }

        let scan = self.bias.scan(text)?;
        let confidence_score = self.bias_confidence.score(&scan);
        Some(Detection {
            kind: FeedbackType::Bias,
            subtype: Some(scan.subtype.to_string()),
            match_count: scan.match_count,
            confidence_score,
            reasoning: format!(
                "Loaded or biased framing ({}): {}",
                scan.subtype.replace('_', " "),
                scan.excerpts.join(", ")
            ),
            suggestion_text:
                "Neutral wording keeps the focus on the claim itself; consider softening the framing."
                    .to_string(),
            educational_resources: Some(vec![EducationalResource {
                title: "Loaded language".to_string(),
                url: "https://en.wikipedia.org/wiki/Loaded_language".to_string(),
            }]),
        })
    }
}

impl Default for ClarityAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
