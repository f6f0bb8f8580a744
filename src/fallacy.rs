use once_cell::sync::Lazy;

use crate::models::{EducationalResource, FeedbackType};
use crate::patterns::{ConfidenceModel, Detection, PatternTable};

/// Detector for named logical fallacies.
pub struct FallacyDetector {
    table: PatternTable,
    confidence: ConfidenceModel,
}

const FALLACY_ROWS: &[(&str, &str, f64)] = &[
    // strawman: restating the other side as something easier to attack
    (r"\bby that logic\b", "strawman", 1.5),
    (r"\bso (?:you're|you are) saying\b", "strawman", 1.0),
    (
        r"\byou(?:'re| are) (?:basically|really|essentially) arguing\b",
        "strawman",
        1.0,
    ),
    // slippery slope
    (r"\bslippery slope\b", "slippery_slope", 1.0),
    (r"\bnext thing you know\b", "slippery_slope", 1.0),
    (r"\bwhere (?:does|will) it end\b", "slippery_slope", 1.0),
    (
        r"\bif we allow .{1,50}?,? (?:then )?(?:soon|eventually|before long)\b",
        "slippery_slope",
        1.5,
    ),
    // false dichotomy
    (
        r"\byou(?:'re| are) either with (?:us|me) or\b",
        "false_dichotomy",
        1.5,
    ),
    (
        r"\bthere (?:are|is) only two (?:options|choices|ways)\b",
        "false_dichotomy",
        1.5,
    ),
    (
        r"\bthe only (?:alternative|other option) is\b",
        "false_dichotomy",
        1.0,
    ),
    (r"\bit's either .{1,50}? or\b", "false_dichotomy", 1.0),
    // appeal to emotion
    (r"\bthink of the children\b", "appeal_to_emotion", 1.5),
    (r"\bhow would you feel if\b", "appeal_to_emotion", 1.0),
    (r"\bany decent person\b", "appeal_to_emotion", 1.0),
    // hasty generalization
    (
        r"\b(?:everyone|everybody) knows\b",
        "hasty_generalization",
        1.0,
    ),
    (
        r"\bnobody (?:ever )?(?:thinks|believes|wants)\b",
        "hasty_generalization",
        1.0,
    ),
    (
        r"\b(?:always|never) (?:fails|works)\b",
        "hasty_generalization",
        1.0,
    ),
    (
        r"\ball .{1,30}? are (?:like that|the same)\b",
        "hasty_generalization",
        1.0,
    ),
    // appeal to authority
    (r"\bexperts (?:all )?agree\b", "appeal_to_authority", 1.0),
    (r"\bscientists say\b", "appeal_to_authority", 1.0),
    (
        r"\bas an? .{1,30}?, i can tell you\b",
        "appeal_to_authority",
        1.0,
    ),
    // ad hominem
    (r"\bconsider the source\b", "ad_hominem", 1.0),
    (
        r"\bcoming from (?:you|someone like you)\b",
        "ad_hominem",
        1.0,
    ),
];

const FALLACY_CONFIDENCE: ConfidenceModel = ConfidenceModel {
    base: 0.65,
    per_match: 0.08,
    cap: 0.92,
    corroborated_cap: 0.95,
};

static FALLACY_TABLE: Lazy<PatternTable> = Lazy::new(|| PatternTable::build(FALLACY_ROWS));

impl FallacyDetector {
    /// Clones the shared default table; each regex compiles once per process.
    pub fn new() -> Self {
        Self::with_table(FALLACY_TABLE.clone(), FALLACY_CONFIDENCE)
    }

    /// Construct with an explicit table, so tests can substitute fixtures.
    pub fn with_table(table: PatternTable, confidence: ConfidenceModel) -> Self {
        Self { table, confidence }
    }

    pub fn analyze(&self, text: &str) -> Option<Detection> {
        let scan = self.table.scan(text)?;
        let confidence_score = self.confidence.score(&scan);
        let label = scan.subtype.replace('_', " ");
        let reasoning = format!(
            "Possible {} fallacy: {}",
            label,
            scan.excerpts.join(", ")
        );
        Some(Detection {
            kind: FeedbackType::Fallacy,
            subtype: Some(scan.subtype.to_string()),
            match_count: scan.match_count,
            confidence_score,
            reasoning,
            suggestion_text: format!(
                "This phrasing reads like a {label}. Try engaging with the strongest version of \
                 the opposing view instead."
            ),
            educational_resources: Some(resources_for(scan.subtype)),
        })
    }
}

impl Default for FallacyDetector {
    fn default() -> Self {
        Self::new()
    }
}

fn resources_for(subtype: &str) -> Vec<EducationalResource> {
    let slug = match subtype {
        "strawman" => "strawman",
        "slippery_slope" => "slippery-slope",
        "false_dichotomy" => "black-or-white",
        "appeal_to_emotion" => "appeal-to-emotion",
        "hasty_generalization" => "anecdotal",
        "appeal_to_authority" => "appeal-to-authority",
        _ => "ad-hominem",
    };
    vec![EducationalResource {
        title: format!("Fallacy explainer: {}", subtype.replace('_', " ")),
        url: format!("https://yourlogicalfallacyis.com/{slug}"),
    }]
}
