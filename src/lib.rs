//! Deterministic discussion-analysis engine: pattern-based rhetorical
//! feedback for a single response, plus cross-participant synthesis
//! (proposition clustering, common-ground detection, divergence scoring)
//! over stance tallies.
//!
//! Everything here is a pure function of its input: no randomness, no I/O,
//! no state between calls. Identical input always produces identical
//! output, and degenerate input (empty text, empty batches) produces
//! well-defined neutral results rather than errors. Persistence, caching,
//! delivery, and any LLM-backed upgrade path belong to the host.

mod clarity;
mod cluster;
mod divergence;
mod error;
mod fallacy;
mod feedback;
mod keywords;
mod models;
mod patterns;
mod similarity;
mod synthesis;
mod tone;

pub use clarity::ClarityAnalyzer;
pub use cluster::{
    cluster_propositions, ClusterParams, DEFAULT_SIMILARITY_THRESHOLD, MIN_CLUSTER_SIZE,
};
pub use divergence::identify_divergence_points;
pub use error::EngineError;
pub use fallacy::FallacyDetector;
pub use feedback::{FeedbackEngine, CONFIDENCE_EPSILON};
pub use keywords::extract_keywords;
pub use models::{
    AgreementZone, AnalysisResult, ClusterPropositionsResult, DivergencePoint, DivergenceReport,
    DivergenceViewpoint, EducationalResource, FeedbackType, FullAnalysis, GenuineDisagreement,
    Interpretation, Misunderstanding, PropositionAlignment, PropositionCluster, PropositionInput,
    Stance, StanceAlignment, SynthesisResult, TopicData, Viewpoint,
};
pub use patterns::{ConfidenceModel, Detection, PatternTable, TableScan};
pub use similarity::{jaccard, similarity_matrix};
pub use synthesis::{calculate_agreement_percentage, synthesize, MIN_PARTICIPATION};
pub use tone::ToneAnalyzer;
