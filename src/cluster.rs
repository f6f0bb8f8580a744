use itertools::Itertools;
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, info};
use xxhash_rust::xxh3::xxh3_64;

use crate::error::EngineError;
use crate::keywords::extract_keywords;
use crate::models::{round2, ClusterPropositionsResult, PropositionCluster, PropositionInput};
use crate::similarity::similarity_matrix;

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.2;
pub const MIN_CLUSTER_SIZE: usize = 2;

#[derive(Debug, Clone, Copy)]
pub struct ClusterParams {
    pub similarity_threshold: f64,
    pub min_cluster_size: usize,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            min_cluster_size: MIN_CLUSTER_SIZE,
        }
    }
}

/// Arena record for the merge loop: merges absorb B's members into A and
/// mark B dead, so indices never need remapping.
struct ClusterRec {
    members: Vec<usize>, // discovery order
    alive: bool,
}

/// Average pairwise similarity across all member pairs of two clusters.
fn average_linkage(a: &[usize], b: &[usize], sim: &[Vec<f64>]) -> f64 {
    let mut total = 0.0;
    for &i in a {
        for &j in b {
            total += sim[i][j];
        }
    }
    total / (a.len() * b.len()) as f64
}

/// Average pairwise similarity among the members of one cluster.
/// 1.0 for a singleton.
fn cohesion(members: &[usize], sim: &[Vec<f64>]) -> f64 {
    if members.len() < 2 {
        return 1.0;
    }
    let mut total = 0.0;
    let mut pairs = 0usize;
    for (&i, &j) in members.iter().tuple_combinations() {
        total += sim[i][j];
        pairs += 1;
    }
    total / pairs as f64
}

/// Group a batch of propositions into thematic clusters by keyword-set
/// similarity and hierarchical agglomerative merging (average linkage).
/// Deterministic: identical input always produces identical output, and the
/// source list is never altered; only ids are classified.
pub fn cluster_propositions(
    topic_id: &str,
    propositions: &[PropositionInput],
    params: ClusterParams,
) -> Result<ClusterPropositionsResult, EngineError> {
    validate(propositions)?;

    let total = propositions.len();
    debug!(
        "Clustering started - topic={}, propositions={}, threshold={}",
        topic_id, total, params.similarity_threshold
    );

    if total == 0 {
        return Ok(ClusterPropositionsResult {
            clusters: vec![],
            unclustered_ids: vec![],
            quality_score: 0.0,
            confidence: 0.3,
            reasoning: "No propositions to cluster.".to_string(),
        });
    }

    let keyword_sets: Vec<BTreeSet<String>> = propositions
        .iter()
        .map(|p| extract_keywords(&p.statement))
        .collect();
    let sim = similarity_matrix(&keyword_sets);

    // Start with every proposition as its own singleton cluster, then merge
    // the best pair at or above the threshold until none remains. The pair
    // search iterates in fixed index order with a strictly-greater
    // comparison, so merge order cannot vary between runs.
    let mut arena: Vec<ClusterRec> = (0..total)
        .map(|i| ClusterRec {
            members: vec![i],
            alive: true,
        })
        .collect();

    loop {
        let mut best: Option<(usize, usize, f64)> = None;
        for a in 0..arena.len() {
            if !arena[a].alive {
                continue;
            }
            for b in (a + 1)..arena.len() {
                if !arena[b].alive {
                    continue;
                }
                let link = average_linkage(&arena[a].members, &arena[b].members, &sim);
                if best.map_or(true, |(_, _, s)| link > s) {
                    best = Some((a, b, link));
                }
            }
        }
        match best {
            Some((a, b, link)) if link >= params.similarity_threshold => {
                let absorbed = std::mem::take(&mut arena[b].members);
                arena[b].alive = false;
                arena[a].members.extend(absorbed);
            }
            _ => break,
        }
    }

    // Clusters below the minimum size dissolve back into "unclustered."
    let mut clustered_idx: HashSet<usize> = HashSet::new();
    let mut clusters = Vec::new();
    for rec in arena.iter().filter(|r| r.alive) {
        if rec.members.len() < params.min_cluster_size {
            continue;
        }
        clustered_idx.extend(rec.members.iter().copied());
        clusters.push(summarize(topic_id, &rec.members, propositions, &keyword_sets, &sim));
    }

    let unclustered_ids: Vec<String> = (0..total)
        .filter(|i| !clustered_idx.contains(i))
        .map(|i| propositions[i].id.clone())
        .collect();

    let clustered_count: usize = clusters.iter().map(|c| c.size).sum();
    debug_assert_eq!(clustered_count + unclustered_ids.len(), total);

    let coverage = clustered_count as f64 / total as f64;
    let (quality_score, confidence) = if clusters.is_empty() {
        (0.0, 0.3)
    } else {
        let mean_cohesion =
            clusters.iter().map(|c| c.cohesion_score).sum::<f64>() / clusters.len() as f64;
        (
            round2(0.7 * mean_cohesion + 0.3 * coverage),
            round2((0.5 + 0.4 * coverage).min(0.9)),
        )
    };

    info!(
        "Clustering completed - topic={}, clusters={}, clustered={}/{}, quality={:.2}",
        topic_id,
        clusters.len(),
        clustered_count,
        total,
        quality_score
    );

    let reasoning = format!(
        "Formed {} cluster(s) covering {}/{} propositions at similarity threshold {:.2}; {} left unclustered.",
        clusters.len(),
        clustered_count,
        total,
        params.similarity_threshold,
        unclustered_ids.len()
    );

    Ok(ClusterPropositionsResult {
        clusters,
        unclustered_ids,
        quality_score,
        confidence,
        reasoning,
    })
}

fn validate(propositions: &[PropositionInput]) -> Result<(), EngineError> {
    let mut seen: HashSet<&str> = HashSet::new();
    for p in propositions {
        if p.id.trim().is_empty() {
            return Err(EngineError::InvalidProposition {
                id: p.id.clone(),
                reason: "blank id".to_string(),
            });
        }
        if p.statement.trim().is_empty() {
            return Err(EngineError::InvalidProposition {
                id: p.id.clone(),
                reason: "blank statement".to_string(),
            });
        }
        if !seen.insert(p.id.as_str()) {
            return Err(EngineError::DuplicateProposition(p.id.clone()));
        }
    }
    Ok(())
}

fn summarize(
    topic_id: &str,
    members: &[usize],
    propositions: &[PropositionInput],
    keyword_sets: &[BTreeSet<String>],
    sim: &[Vec<f64>],
) -> PropositionCluster {
    let proposition_ids: Vec<String> =
        members.iter().map(|&i| propositions[i].id.clone()).collect();

    // Keywords ranked by how many members contain them, ties lexicographic.
    let union: BTreeSet<&String> = members.iter().flat_map(|&i| &keyword_sets[i]).collect();
    let mut ranked: Vec<(usize, &String)> = union
        .into_iter()
        .map(|kw| {
            let freq = members
                .iter()
                .filter(|&&i| keyword_sets[i].contains(kw))
                .count();
            (freq, kw)
        })
        .collect();
    ranked.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    let keywords: Vec<String> = ranked.iter().take(5).map(|(_, kw)| (*kw).clone()).collect();

    let theme = if keywords.is_empty() {
        "Related propositions".to_string()
    } else {
        let top: Vec<&str> = keywords.iter().take(3).map(String::as_str).collect();
        format!("Propositions about {}", top.join(", "))
    };

    // Stable id from topic + member ids, same hash the platform fingerprints
    // with elsewhere.
    let seed = format!("{}|{}", topic_id, proposition_ids.join(","));
    let id = format!("{:016x}", xxh3_64(seed.as_bytes()));

    PropositionCluster {
        id,
        theme,
        size: members.len(),
        cohesion_score: round2(cohesion(members, sim)),
        proposition_ids,
        keywords,
    }
}
