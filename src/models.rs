use serde::{Deserialize, Serialize};

/// Category of a feedback analysis result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedbackType {
    Affirmation,
    Inflammatory,
    Fallacy,
    Unsourced,
    Bias,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationalResource {
    pub title: String,
    pub url: String,
}

/// One actionable feedback item for a piece of user-authored text.
/// Ephemeral: recomputed per call, never mutated after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub kind: FeedbackType,
    pub subtype: Option<String>,
    pub suggestion_text: String,
    pub reasoning: String,
    pub confidence_score: f64, // always in [0,1]
    pub educational_resources: Option<Vec<EducationalResource>>,
}

/// Every fired detection plus a display-layer readiness flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullAnalysis {
    pub detections: Vec<AnalysisResult>, // sorted by confidence desc
    pub ready_to_post: bool,
}

/// A single votable claim within a topic. The clusterer never alters the
/// source list; it only classifies ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropositionInput {
    pub id: String,
    pub statement: String,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropositionCluster {
    pub id: String,
    pub theme: String,
    pub proposition_ids: Vec<String>, // insertion order = discovery order
    pub size: usize,                  // >= min cluster size
    pub cohesion_score: f64,          // [0,1], avg pairwise member similarity
    pub keywords: Vec<String>,        // <= 5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterPropositionsResult {
    pub clusters: Vec<PropositionCluster>,
    pub unclustered_ids: Vec<String>, // input order
    pub quality_score: f64,
    pub confidence: f64,
    pub reasoning: String,
}

/// A participant's recorded position on a proposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stance {
    Support,
    Oppose,
    Nuanced,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StanceAlignment {
    pub user_id: String,
    pub stance: Stance,
    #[serde(default)]
    pub nuance_explanation: Option<String>,
}

/// Per-proposition stance tallies, the synthesis input unit.
/// support + oppose + nuanced is the proposition's total participation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropositionAlignment {
    pub id: String,
    pub statement: String,
    pub support_count: u32,
    pub oppose_count: u32,
    pub nuanced_count: u32,
    #[serde(default)]
    pub consensus_score: Option<f64>,
    #[serde(default)]
    pub alignments: Vec<StanceAlignment>,
}

impl PropositionAlignment {
    pub fn total_participation(&self) -> u32 {
        self.support_count + self.oppose_count + self.nuanced_count
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicData {
    pub topic_id: String,
    pub propositions: Vec<PropositionAlignment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgreementZone {
    pub proposition: String,
    pub agreement_percentage: u32,        // 0-100
    pub supporting_evidence: Vec<String>, // <= 3 snippets
    pub participant_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interpretation {
    pub interpretation: String,
    pub participant_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Misunderstanding {
    pub topic: String,
    pub interpretations: Vec<Interpretation>, // >= 2 distinct labels
    pub clarification: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Viewpoint {
    pub position: String, // "Support" | "Oppose"
    pub participant_count: u32,
    pub reasoning: Vec<String>, // <= 2 snippets
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenuineDisagreement {
    pub proposition: String,
    pub viewpoints: Vec<Viewpoint>,
    pub underlying_values: Vec<String>, // placeholder, filled by external layers
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisResult {
    pub agreement_zones: Vec<AgreementZone>, // sorted by agreement_percentage desc
    pub misunderstandings: Vec<Misunderstanding>,
    pub genuine_disagreements: Vec<GenuineDisagreement>,
    pub overall_consensus_score: Option<f64>, // rounded to 2 decimals
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DivergenceViewpoint {
    pub position: String, // "Support" | "Oppose"
    pub percentage: u32,
    pub reasoning: Vec<String>, // <= 2 snippets
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DivergencePoint {
    pub proposition_id: String,
    pub proposition: String,
    pub viewpoints: Vec<DivergenceViewpoint>, // exactly 2: Support, Oppose
    pub total_participants: u32,
    pub polarization_score: f64, // [0,1]; 1.0 = perfect 50/50 split
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DivergenceReport {
    pub divergence_points: Vec<DivergencePoint>,
    pub overall_polarization: f64, // participant-weighted mean, 0 if none
    pub participant_count: u32,
}

/// Round to two decimals, the precision every derived score is reported at.
pub(crate) fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
