use rayon::prelude::*;
use std::collections::BTreeSet;

/// Jaccard similarity |A∩B| / |A∪B|. Zero whenever either set is empty:
/// a proposition with no usable keywords is similar to nothing.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let inter = a.intersection(b).count() as f64;
    let union = a.union(b).count() as f64;
    inter / union
}

/// Full pairwise similarity matrix: symmetric, 1.0 on the diagonal.
/// Rows are computed in parallel; values depend only on the input sets, so
/// parallelism cannot change the output.
pub fn similarity_matrix(sets: &[BTreeSet<String>]) -> Vec<Vec<f64>> {
    let n = sets.len();
    (0..n)
        .into_par_iter()
        .map(|i| {
            (0..n)
                .map(|j| if i == j { 1.0 } else { jaccard(&sets[i], &sets[j]) })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(words: &[&str]) -> BTreeSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn identical_sets_score_one() {
        let a = set(&["transit", "bus", "lanes"]);
        assert_eq!(jaccard(&a, &a), 1.0);
    }

    #[test]
    fn disjoint_sets_score_zero() {
        assert_eq!(jaccard(&set(&["transit"]), &set(&["zoning"])), 0.0);
    }

    #[test]
    fn empty_set_scores_zero_against_anything() {
        assert_eq!(jaccard(&set(&[]), &set(&[])), 0.0);
        assert_eq!(jaccard(&set(&[]), &set(&["transit"])), 0.0);
    }

    #[test]
    fn partial_overlap() {
        // {a,b,c} vs {b,c,d}: 2 shared of 4 total
        let s = jaccard(&set(&["aaa", "bbb", "ccc"]), &set(&["bbb", "ccc", "ddd"]));
        assert!((s - 0.5).abs() < 1e-12);
    }

    #[test]
    fn matrix_is_symmetric_with_unit_diagonal() {
        let sets = vec![
            set(&["transit", "bus"]),
            set(&["bus", "lanes"]),
            set(&["zoning"]),
            set(&[]),
        ];
        let m = similarity_matrix(&sets);
        for i in 0..sets.len() {
            assert_eq!(m[i][i], 1.0);
            for j in 0..sets.len() {
                assert_eq!(m[i][j], m[j][i]);
            }
        }
        assert_eq!(m[0][2], 0.0);
        assert_eq!(m[0][3], 0.0);
    }
}
