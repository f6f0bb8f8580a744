use std::collections::HashSet;
use tracing::debug;

use crate::error::EngineError;
use crate::models::{
    round2, AgreementZone, GenuineDisagreement, Interpretation, Misunderstanding,
    PropositionAlignment, Stance, SynthesisResult, TopicData, Viewpoint,
};

/// Propositions with fewer participants than this are ignored by synthesis
/// and divergence detection alike.
pub const MIN_PARTICIPATION: u32 = 3;

const AGREEMENT_THRESHOLD: f64 = 0.70;
const NUANCE_THRESHOLD: f64 = 0.30;
const DISAGREEMENT_MIN_SHARE: f64 = 0.25;

/// Derive agreement zones, likely misunderstandings, and genuine
/// disagreements from per-proposition stance tallies. Pure function of the
/// snapshot: no persistent state, no I/O.
pub fn synthesize(topic: &TopicData) -> Result<SynthesisResult, EngineError> {
    validate(&topic.propositions)?;

    let mut agreement_zones = Vec::new();
    let mut misunderstandings = Vec::new();
    let mut genuine_disagreements = Vec::new();
    let mut consensus_scores = Vec::new();

    for prop in &topic.propositions {
        let total = prop.total_participation();
        if total < MIN_PARTICIPATION {
            continue;
        }
        let t = total as f64;
        let support_share = prop.support_count as f64 / t;
        let nuance_share = prop.nuanced_count as f64 / t;
        let oppose_share = prop.oppose_count as f64 / t;

        if support_share >= AGREEMENT_THRESHOLD {
            agreement_zones.push(AgreementZone {
                proposition: prop.statement.clone(),
                agreement_percentage: calculate_agreement_percentage(
                    prop.support_count,
                    prop.oppose_count,
                    prop.nuanced_count,
                )
                .unwrap_or(0),
                supporting_evidence: evidence(prop, 3),
                participant_count: total,
            });
        }

        // High support and high nuance are not mutually exclusive: the same
        // proposition can be an agreement zone and a misunderstanding.
        if nuance_share >= NUANCE_THRESHOLD {
            let interpretations = bucket_interpretations(prop);
            if interpretations.len() >= 2 {
                misunderstandings.push(Misunderstanding {
                    topic: prop.statement.clone(),
                    interpretations,
                    clarification: format!(
                        "Participants appear to read \"{}\" differently; clarifying its key terms \
                         may resolve the split.",
                        prop.statement
                    ),
                });
            }
        }

        if support_share >= DISAGREEMENT_MIN_SHARE
            && oppose_share >= DISAGREEMENT_MIN_SHARE
            && nuance_share < NUANCE_THRESHOLD
        {
            genuine_disagreements.push(GenuineDisagreement {
                proposition: prop.statement.clone(),
                viewpoints: vec![
                    Viewpoint {
                        position: "Support".to_string(),
                        participant_count: prop.support_count,
                        reasoning: stance_reasons(
                            prop,
                            Stance::Support,
                            2,
                            "Supports this proposition",
                        ),
                    },
                    Viewpoint {
                        position: "Oppose".to_string(),
                        participant_count: prop.oppose_count,
                        reasoning: stance_reasons(
                            prop,
                            Stance::Oppose,
                            2,
                            "Opposes this proposition",
                        ),
                    },
                ],
                underlying_values: vec![],
            });
        }

        let score = prop
            .consensus_score
            .unwrap_or_else(|| {
                ((prop.support_count as f64 - prop.oppose_count as f64) / t + 1.0) / 2.0
            })
            .clamp(0.0, 1.0);
        consensus_scores.push(score);
    }

    agreement_zones.sort_by(|a, b| b.agreement_percentage.cmp(&a.agreement_percentage));

    let overall_consensus_score = if consensus_scores.is_empty() {
        None
    } else {
        Some(round2(
            consensus_scores.iter().sum::<f64>() / consensus_scores.len() as f64,
        ))
    };

    debug!(
        "Synthesis completed - topic={}, zones={}, misunderstandings={}, disagreements={}",
        topic.topic_id,
        agreement_zones.len(),
        misunderstandings.len(),
        genuine_disagreements.len()
    );

    Ok(SynthesisResult {
        agreement_zones,
        misunderstandings,
        genuine_disagreements,
        overall_consensus_score,
    })
}

/// None when nobody participated, otherwise support share rounded to the
/// nearest whole percentage.
pub fn calculate_agreement_percentage(support: u32, oppose: u32, nuanced: u32) -> Option<u32> {
    let total = support + oppose + nuanced;
    if total == 0 {
        return None;
    }
    Some((100.0 * support as f64 / total as f64).round() as u32)
}

pub(crate) fn validate(propositions: &[PropositionAlignment]) -> Result<(), EngineError> {
    for prop in propositions {
        if prop.id.trim().is_empty() {
            return Err(EngineError::InvalidProposition {
                id: prop.id.clone(),
                reason: "blank id".to_string(),
            });
        }
        if prop.statement.trim().is_empty() {
            return Err(EngineError::InvalidProposition {
                id: prop.id.clone(),
                reason: "blank statement".to_string(),
            });
        }
        for a in &prop.alignments {
            if a.user_id.trim().is_empty() {
                return Err(EngineError::InvalidAlignment {
                    proposition_id: prop.id.clone(),
                    reason: "blank user id".to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Up to `cap` nuance explanations from SUPPORT or NUANCED alignments.
fn evidence(prop: &PropositionAlignment, cap: usize) -> Vec<String> {
    prop.alignments
        .iter()
        .filter(|a| matches!(a.stance, Stance::Support | Stance::Nuanced))
        .filter_map(|a| a.nuance_explanation.as_deref())
        .filter(|e| !e.trim().is_empty())
        .take(cap)
        .map(str::to_string)
        .collect()
}

/// Up to `cap` explanation snippets from one side, with a generic fallback
/// when nobody wrote anything.
pub(crate) fn stance_reasons(
    prop: &PropositionAlignment,
    stance: Stance,
    cap: usize,
    fallback: &str,
) -> Vec<String> {
    let reasons: Vec<String> = prop
        .alignments
        .iter()
        .filter(|a| a.stance == stance)
        .filter_map(|a| a.nuance_explanation.as_deref())
        .filter(|e| !e.trim().is_empty())
        .take(cap)
        .map(str::to_string)
        .collect();
    if reasons.is_empty() {
        vec![fallback.to_string()]
    } else {
        reasons
    }
}

const SUPPORT_LEANING_CUES: &[&str] = &["agree", "support", "favor", "good", "yes", "right"];
const OPPOSE_LEANING_CUES: &[&str] = &[
    "disagree", "oppose", "against", "concern", "worried", "wrong", "however",
];

/// Cues match as word prefixes ("agree" covers "agrees" and "agreement"
/// but not "disagree"), so the explanation is tokenized first.
fn cue_hit(words: &[&str], cues: &[&str]) -> bool {
    words
        .iter()
        .any(|w| cues.iter().any(|c| w.starts_with(c)))
}

/// Group nuance-explanation text into simple keyword buckets. Support cues
/// are checked first; anything that matches neither list is
/// context-dependent.
fn bucket_interpretations(prop: &PropositionAlignment) -> Vec<Interpretation> {
    let mut counts = [0u32; 3]; // support-leaning, oppose-leaning, context
    for a in &prop.alignments {
        let Some(text) = a.nuance_explanation.as_deref() else {
            continue;
        };
        if text.trim().is_empty() {
            continue;
        }
        let lower = text.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        if cue_hit(&words, SUPPORT_LEANING_CUES) {
            counts[0] += 1;
        } else if cue_hit(&words, OPPOSE_LEANING_CUES) {
            counts[1] += 1;
        } else {
            counts[2] += 1;
        }
    }
    let labels = [
        "Conditional support",
        "Qualified opposition",
        "Context-dependent reading",
    ];
    labels
        .iter()
        .zip(counts)
        .filter(|(_, n)| *n > 0)
        .map(|(label, n)| Interpretation {
            interpretation: label.to_string(),
            participant_count: n,
        })
        .collect()
}

/// Distinct user ids across every alignment list; used by divergence
/// reporting as the topic's participant headcount.
pub(crate) fn distinct_participants(propositions: &[PropositionAlignment]) -> u32 {
    let users: HashSet<&str> = propositions
        .iter()
        .flat_map(|p| p.alignments.iter())
        .map(|a| a.user_id.as_str())
        .collect();
    users.len() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StanceAlignment;

    fn alignment(user: &str, stance: Stance, note: Option<&str>) -> StanceAlignment {
        StanceAlignment {
            user_id: user.to_string(),
            stance,
            nuance_explanation: note.map(str::to_string),
        }
    }

    fn prop(
        id: &str,
        support: u32,
        oppose: u32,
        nuanced: u32,
        alignments: Vec<StanceAlignment>,
    ) -> PropositionAlignment {
        PropositionAlignment {
            id: id.to_string(),
            statement: format!("Proposition {id}"),
            support_count: support,
            oppose_count: oppose,
            nuanced_count: nuanced,
            consensus_score: None,
            alignments,
        }
    }

    fn topic(propositions: Vec<PropositionAlignment>) -> TopicData {
        TopicData {
            topic_id: "topic".to_string(),
            propositions,
        }
    }

    #[test]
    fn agreement_percentage_table() {
        assert_eq!(calculate_agreement_percentage(0, 0, 0), None);
        assert_eq!(calculate_agreement_percentage(10, 0, 0), Some(100));
        assert_eq!(calculate_agreement_percentage(0, 10, 0), Some(0));
        assert_eq!(calculate_agreement_percentage(5, 5, 0), Some(50));
        assert_eq!(calculate_agreement_percentage(2, 1, 0), Some(67));
    }

    #[test]
    fn strong_support_yields_agreement_zone_at_eighty_percent() {
        let result = synthesize(&topic(vec![prop("p1", 8, 1, 1, vec![])])).unwrap();
        assert_eq!(result.agreement_zones.len(), 1);
        assert_eq!(result.agreement_zones[0].agreement_percentage, 80);
        assert_eq!(result.agreement_zones[0].participant_count, 10);
    }

    #[test]
    fn even_split_yields_no_agreement_zone() {
        let result = synthesize(&topic(vec![prop("p1", 5, 5, 0, vec![])])).unwrap();
        assert!(result.agreement_zones.is_empty());
        assert_eq!(result.genuine_disagreements.len(), 1);
    }

    #[test]
    fn below_minimum_participation_is_ignored() {
        let result = synthesize(&topic(vec![prop("p1", 2, 0, 0, vec![])])).unwrap();
        assert!(result.agreement_zones.is_empty());
        assert!(result.overall_consensus_score.is_none());
    }

    #[test]
    fn evidence_comes_from_support_and_nuanced_notes_capped_at_three() {
        let alignments = vec![
            alignment("u1", Stance::Support, Some("works in my district")),
            alignment("u2", Stance::Support, None),
            alignment("u3", Stance::Nuanced, Some("good if funded properly")),
            alignment("u4", Stance::Support, Some("costs are covered already")),
            alignment("u5", Stance::Support, Some("a fourth note")),
            alignment("u6", Stance::Oppose, Some("should not appear")),
        ];
        let result = synthesize(&topic(vec![prop("p1", 8, 1, 1, alignments)])).unwrap();
        let evidence = &result.agreement_zones[0].supporting_evidence;
        assert_eq!(evidence.len(), 3);
        assert!(!evidence.contains(&"should not appear".to_string()));
    }

    #[test]
    fn high_nuance_with_two_buckets_is_a_misunderstanding() {
        let alignments = vec![
            alignment("u1", Stance::Nuanced, Some("I agree when it targets new builds")),
            alignment("u2", Stance::Nuanced, Some("Worried it punishes renters")),
            alignment("u3", Stance::Nuanced, Some("Depends entirely on the zone map")),
        ];
        let result = synthesize(&topic(vec![prop("p1", 3, 3, 4, alignments)])).unwrap();
        assert_eq!(result.misunderstandings.len(), 1);
        let m = &result.misunderstandings[0];
        assert_eq!(m.interpretations.len(), 3);
        assert!(m.clarification.contains("Proposition p1"));
    }

    #[test]
    fn disagreeing_note_lands_in_the_opposition_bucket() {
        // "disagree" contains "agree" as a substring; word-prefix matching
        // must still route it to the oppose-leaning bucket.
        let alignments = vec![
            alignment("u1", Stance::Nuanced, Some("I disagree with the premise entirely")),
            alignment("u2", Stance::Nuanced, Some("I agree when it targets new builds")),
        ];
        let result = synthesize(&topic(vec![prop("p1", 3, 3, 4, alignments)])).unwrap();
        assert_eq!(result.misunderstandings.len(), 1);
        let labels: Vec<&str> = result.misunderstandings[0]
            .interpretations
            .iter()
            .map(|i| i.interpretation.as_str())
            .collect();
        assert_eq!(labels, vec!["Conditional support", "Qualified opposition"]);
    }

    #[test]
    fn high_nuance_with_one_bucket_is_not_a_misunderstanding() {
        let alignments = vec![
            alignment("u1", Stance::Nuanced, Some("agree with the intent")),
            alignment("u2", Stance::Nuanced, Some("I support the core idea")),
        ];
        let result = synthesize(&topic(vec![prop("p1", 3, 3, 4, alignments)])).unwrap();
        assert!(result.misunderstandings.is_empty());
    }

    #[test]
    fn nuance_masks_genuine_disagreement() {
        // support and oppose both significant, but nuance >= 30%
        let result = synthesize(&topic(vec![prop("p1", 3, 3, 4, vec![])])).unwrap();
        assert!(result.genuine_disagreements.is_empty());
    }

    #[test]
    fn disagreement_reasoning_falls_back_to_generic_strings() {
        let result = synthesize(&topic(vec![prop("p1", 5, 5, 0, vec![])])).unwrap();
        let d = &result.genuine_disagreements[0];
        assert_eq!(d.viewpoints.len(), 2);
        assert_eq!(d.viewpoints[0].position, "Support");
        assert_eq!(d.viewpoints[0].reasoning, vec!["Supports this proposition"]);
        assert_eq!(d.viewpoints[1].reasoning, vec!["Opposes this proposition"]);
        assert!(d.underlying_values.is_empty());
    }

    #[test]
    fn agreement_and_misunderstanding_can_coexist() {
        let alignments = vec![
            alignment("u1", Stance::Nuanced, Some("agree for new construction")),
            alignment("u2", Stance::Nuanced, Some("concern about enforcement")),
            alignment("u3", Stance::Nuanced, Some("only under certain budgets")),
        ];
        // 7 support, 0 oppose, 3 nuanced: 70% support and 30% nuance
        let result = synthesize(&topic(vec![prop("p1", 7, 0, 3, alignments)])).unwrap();
        assert_eq!(result.agreement_zones.len(), 1);
        assert_eq!(result.misunderstandings.len(), 1);
    }

    #[test]
    fn precomputed_consensus_scores_average_exactly() {
        let mut a = prop("p1", 8, 1, 1, vec![]);
        a.consensus_score = Some(1.0);
        let mut b = prop("p2", 5, 5, 0, vec![]);
        b.consensus_score = Some(0.5);
        let result = synthesize(&topic(vec![a, b])).unwrap();
        assert_eq!(result.overall_consensus_score, Some(0.75));
    }

    #[test]
    fn derived_consensus_normalizes_signed_ratio() {
        // (support - oppose)/total = (6-2)/8 = 0.5 -> (0.5 + 1)/2 = 0.75
        let result = synthesize(&topic(vec![prop("p1", 6, 2, 0, vec![])])).unwrap();
        assert_eq!(result.overall_consensus_score, Some(0.75));
    }

    #[test]
    fn agreement_zones_sorted_by_percentage_desc() {
        let result = synthesize(&topic(vec![
            prop("p1", 7, 2, 1, vec![]),  // 70%
            prop("p2", 9, 1, 0, vec![]),  // 90%
            prop("p3", 8, 1, 1, vec![]),  // 80%
        ]))
        .unwrap();
        let pcts: Vec<u32> = result
            .agreement_zones
            .iter()
            .map(|z| z.agreement_percentage)
            .collect();
        assert_eq!(pcts, vec![90, 80, 70]);
    }

    #[test]
    fn blank_alignment_user_rejects_call() {
        let bad = prop("p1", 3, 0, 0, vec![alignment("", Stance::Support, None)]);
        assert!(matches!(
            synthesize(&topic(vec![bad])),
            Err(EngineError::InvalidAlignment { .. })
        ));
    }

    #[test]
    fn empty_topic_is_neutral_not_an_error() {
        let result = synthesize(&topic(vec![])).unwrap();
        assert!(result.agreement_zones.is_empty());
        assert!(result.overall_consensus_score.is_none());
    }
}
