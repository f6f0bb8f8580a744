use tracing::debug;

use crate::clarity::ClarityAnalyzer;
use crate::fallacy::FallacyDetector;
use crate::models::{AnalysisResult, FeedbackType, FullAnalysis};
use crate::patterns::Detection;
use crate::tone::ToneAnalyzer;

/// Confidence gap below which two detections count as effectively tied and
/// the type-priority order decides instead.
pub const CONFIDENCE_EPSILON: f64 = 0.05;

/// Feedback orchestrator: fans a response body out to the three detectors,
/// merges what fired, and always returns exactly one result.
pub struct FeedbackEngine {
    tone: ToneAnalyzer,
    fallacy: FallacyDetector,
    clarity: ClarityAnalyzer,
}

impl FeedbackEngine {
    pub fn new() -> Self {
        Self {
            tone: ToneAnalyzer::new(),
            fallacy: FallacyDetector::new(),
            clarity: ClarityAnalyzer::new(),
        }
    }

    /// Explicit wiring for tests that substitute fixed pattern tables.
    pub fn with_detectors(
        tone: ToneAnalyzer,
        fallacy: FallacyDetector,
        clarity: ClarityAnalyzer,
    ) -> Self {
        Self {
            tone,
            fallacy,
            clarity,
        }
    }

    /// Run all three detectors and return the single winning result, or an
    /// affirmation when nothing fired.
    pub fn analyze_content(&self, text: &str) -> AnalysisResult {
        let fired = self.run_detectors(text);
        debug!("Feedback analysis - text_len={}, fired={}", text.len(), fired.len());
        match select_winner(&fired) {
            Some(idx) => fired[idx].clone().into_result(),
            None => affirmation(),
        }
    }

    /// Every fired detection (confidence desc) plus the ready-to-post flag:
    /// true iff no detection reaches the critical threshold for its category.
    pub fn analyze_content_full(&self, text: &str) -> FullAnalysis {
        let mut fired = self.run_detectors(text);
        fired.sort_by(|a, b| {
            b.confidence_score
                .partial_cmp(&a.confidence_score)
                .expect("confidence scores are finite")
        });
        let ready_to_post = !fired
            .iter()
            .any(|d| d.confidence_score >= critical_threshold(d.kind));
        FullAnalysis {
            detections: fired.into_iter().map(Detection::into_result).collect(),
            ready_to_post,
        }
    }

    /// The detectors are pure and independent, so this is a join, not a
    /// race: all three complete before results are merged.
    fn run_detectors(&self, text: &str) -> Vec<Detection> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        let ((tone, fallacy), clarity) = rayon::join(
            || rayon::join(|| self.tone.analyze(text), || self.fallacy.analyze(text)),
            || self.clarity.analyze(text),
        );
        [tone, fallacy, clarity].into_iter().flatten().collect()
    }
}

impl Default for FeedbackEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed type-priority order for effectively-tied confidences.
/// Lower rank wins.
fn priority_rank(kind: FeedbackType) -> u8 {
    match kind {
        FeedbackType::Fallacy => 0,
        FeedbackType::Inflammatory => 1,
        FeedbackType::Unsourced => 2,
        FeedbackType::Bias => 3,
        FeedbackType::Affirmation => 4,
    }
}

/// Per-category confidence at which a detection blocks the ready-to-post
/// flag.
fn critical_threshold(kind: FeedbackType) -> f64 {
    match kind {
        FeedbackType::Inflammatory => 0.80,
        FeedbackType::Fallacy => 0.85,
        FeedbackType::Unsourced => 0.80,
        FeedbackType::Bias => 0.75,
        FeedbackType::Affirmation => f64::INFINITY,
    }
}

/// Pick the index of the winning detection: highest confidence outright if
/// it clears the runner-up by more than epsilon, otherwise the best-priority
/// type within the epsilon band of the top score.
fn select_winner(fired: &[Detection]) -> Option<usize> {
    if fired.is_empty() {
        return None;
    }
    let top = fired
        .iter()
        .map(|d| d.confidence_score)
        .fold(f64::NEG_INFINITY, f64::max);
    let mut winner: Option<usize> = None;
    for (i, d) in fired.iter().enumerate() {
        if top - d.confidence_score > CONFIDENCE_EPSILON {
            continue;
        }
        match winner {
            None => winner = Some(i),
            Some(w) => {
                if priority_rank(d.kind) < priority_rank(fired[w].kind) {
                    winner = Some(i);
                }
            }
        }
    }
    winner
}

fn affirmation() -> AnalysisResult {
    AnalysisResult {
        kind: FeedbackType::Affirmation,
        subtype: None,
        suggestion_text:
            "Your response engages constructively. Consider inviting other perspectives to deepen \
             the dialogue."
                .to_string(),
        reasoning: "No rhetorical or argumentative issues detected.".to_string(),
        confidence_score: 0.85,
        educational_resources: None,
    }
}
