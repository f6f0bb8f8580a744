use once_cell::sync::Lazy;

use crate::models::{EducationalResource, FeedbackType};
use crate::patterns::{ConfidenceModel, Detection, PatternTable};

/// Detector for hostile, dismissive, and condescending language.
pub struct ToneAnalyzer {
    table: PatternTable,
    confidence: ConfidenceModel,
}

const TONE_ROWS: &[(&str, &str, f64)] = &[
    // hostile
    (
        r"\byou(?:'re| are)\s+(?:just\s+)?(?:stupid|an idiot|a moron|clueless|pathetic|delusional)\b",
        "hostile",
        1.5,
    ),
    (r"\b(?:idiot|idiotic|moron|moronic|imbecile)\b", "hostile", 1.0),
    (r"\bshut up\b", "hostile", 1.5),
    (r"\bonly a fool would\b", "hostile", 1.0),
    // dismissive
    (r"\bnobody cares\b", "dismissive", 1.0),
    (r"\bwho cares\b", "dismissive", 1.0),
    (r"\bwaste of (?:time|breath)\b", "dismissive", 1.0),
    (r"\bnot worth (?:discussing|responding to)\b", "dismissive", 1.0),
    (r"\bwhatever you say\b", "dismissive", 1.0),
    // condescending
    (
        r"\blet me (?:explain|spell) (?:this|it) (?:slowly|again|one more time)\b",
        "condescending",
        1.0,
    ),
    (
        r"\b(?:clearly|obviously) you (?:don't|do not|can't|cannot) understand\b",
        "condescending",
        1.0,
    ),
    (r"\bdo you even\b", "condescending", 1.0),
    (r"\bit's not that (?:hard|complicated)\b", "condescending", 1.0),
    (r"\banyone with half a brain\b", "condescending", 1.0),
];

const TONE_CONFIDENCE: ConfidenceModel = ConfidenceModel {
    base: 0.60,
    per_match: 0.10,
    cap: 0.90,
    corroborated_cap: 0.95,
};

static TONE_TABLE: Lazy<PatternTable> = Lazy::new(|| PatternTable::build(TONE_ROWS));

impl ToneAnalyzer {
    /// Clones the shared default table; each regex compiles once per process.
    pub fn new() -> Self {
        Self::with_table(TONE_TABLE.clone(), TONE_CONFIDENCE)
    }

    /// Construct with an explicit table, so tests can substitute fixtures.
    pub fn with_table(table: PatternTable, confidence: ConfidenceModel) -> Self {
        Self { table, confidence }
    }

    pub fn analyze(&self, text: &str) -> Option<Detection> {
        let scan = self.table.scan(text)?;
        let confidence_score = self.confidence.score(&scan);
        let reasoning = format!(
            "Detected {} language: {}",
            scan.subtype,
            scan.excerpts.join(", ")
        );
        Some(Detection {
            kind: FeedbackType::Inflammatory,
            subtype: Some(scan.subtype.to_string()),
            match_count: scan.match_count,
            confidence_score,
            reasoning,
            suggestion_text:
                "Consider rephrasing to address the argument rather than the person; the same point \
                 lands better without the heat."
                    .to_string(),
            educational_resources: Some(resources_for(scan.subtype)),
        })
    }
}

impl Default for ToneAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn resources_for(subtype: &str) -> Vec<EducationalResource> {
    let (title, url) = match subtype {
        "condescending" => (
            "Principle of charity",
            "https://en.wikipedia.org/wiki/Principle_of_charity",
        ),
        _ => (
            "Nonviolent Communication",
            "https://en.wikipedia.org/wiki/Nonviolent_Communication",
        ),
    };
    vec![EducationalResource {
        title: title.to_string(),
        url: url.to_string(),
    }]
}
