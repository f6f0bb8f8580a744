use tracing::debug;

use crate::error::EngineError;
use crate::models::{
    round2, DivergencePoint, DivergenceReport, DivergenceViewpoint, PropositionAlignment, Stance,
};
use crate::synthesis::{distinct_participants, stance_reasons, validate, MIN_PARTICIPATION};

const NUANCE_THRESHOLD: f64 = 0.30;
// A side at 10% or below signals consensus, not divergence: both shares must
// be strictly greater than this for a proposition to qualify.
const MIN_SIDE_SHARE: f64 = 0.10;

/// Identify propositions with a genuine, non-nuance-masked split and score
/// how evenly each split balances.
pub fn identify_divergence_points(
    topic_id: &str,
    propositions: &[PropositionAlignment],
) -> Result<DivergenceReport, EngineError> {
    validate(propositions)?;

    let mut divergence_points = Vec::new();
    for prop in propositions {
        let total = prop.total_participation();
        if total < MIN_PARTICIPATION {
            continue;
        }
        let t = total as f64;
        let nuance_share = prop.nuanced_count as f64 / t;
        // A highly-nuanced split signals misunderstanding, not divergence;
        // the synthesizer owns that case.
        if nuance_share >= NUANCE_THRESHOLD {
            continue;
        }
        let support_share = prop.support_count as f64 / t;
        let oppose_share = prop.oppose_count as f64 / t;
        if support_share <= MIN_SIDE_SHARE || oppose_share <= MIN_SIDE_SHARE {
            continue;
        }

        divergence_points.push(DivergencePoint {
            proposition_id: prop.id.clone(),
            proposition: prop.statement.clone(),
            viewpoints: vec![
                DivergenceViewpoint {
                    position: "Support".to_string(),
                    percentage: (100.0 * support_share).round() as u32,
                    reasoning: stance_reasons(prop, Stance::Support, 2, "Supports this proposition"),
                },
                DivergenceViewpoint {
                    position: "Oppose".to_string(),
                    percentage: (100.0 * oppose_share).round() as u32,
                    reasoning: stance_reasons(prop, Stance::Oppose, 2, "Opposes this proposition"),
                },
            ],
            total_participants: total,
            polarization_score: 1.0 - (support_share - oppose_share).abs(),
        });
    }

    // Participant-weighted mean: a 50/50 split among forty people polarizes
    // the topic more than one among four.
    let overall_polarization = if divergence_points.is_empty() {
        0.0
    } else {
        let weight: f64 = divergence_points
            .iter()
            .map(|p| p.total_participants as f64)
            .sum();
        round2(
            divergence_points
                .iter()
                .map(|p| p.polarization_score * p.total_participants as f64)
                .sum::<f64>()
                / weight,
        )
    };

    let participant_count = match distinct_participants(propositions) {
        0 => propositions
            .iter()
            .map(PropositionAlignment::total_participation)
            .max()
            .unwrap_or(0),
        n => n,
    };

    debug!(
        "Divergence detection - topic={}, points={}, overall_polarization={:.2}",
        topic_id,
        divergence_points.len(),
        overall_polarization
    );

    Ok(DivergenceReport {
        divergence_points,
        overall_polarization,
        participant_count,
    })
}
