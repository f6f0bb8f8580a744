use thiserror::Error;

/// Input-shape rejections. Malformed records fail the whole call; silently
/// skipping a bad record would break the coverage invariant.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("proposition {id:?} is malformed: {reason}")]
    InvalidProposition { id: String, reason: String },

    #[error("duplicate proposition id {0:?}")]
    DuplicateProposition(String),

    #[error("alignment for proposition {proposition_id:?} is malformed: {reason}")]
    InvalidAlignment {
        proposition_id: String,
        reason: String,
    },
}
