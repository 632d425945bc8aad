use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use serde::Deserialize;

/// Vector similarity strategy over sparse key -> value vectors
///
/// Implementations are pure and symmetric down to the last bit: sums run in key
/// order, so swapping the arguments cannot change the result. Numerical dead ends
/// (empty input, zero norm, zero variance) resolve to `0.0`.
pub trait SimilarityCalculator {
    fn similarity<K: Ord + Hash>(&self, a: &HashMap<K, f64>, b: &HashMap<K, f64>) -> f64;
}

/// Values of `a` and `b` at their shared keys, in ascending key order
fn shared_pairs<K: Ord + Hash>(a: &HashMap<K, f64>, b: &HashMap<K, f64>) -> Vec<(f64, f64)> {
    let mut shared: Vec<(&K, f64, f64)> = a
        .iter()
        .filter_map(|(key, x)| b.get(key).map(|y| (key, *x, *y)))
        .collect();
    shared.sort_by(|l, r| l.0.cmp(r.0));
    shared.into_iter().map(|(_, x, y)| (x, y)).collect()
}

fn norm<K: Ord + Hash>(v: &HashMap<K, f64>) -> f64 {
    let mut entries: Vec<(&K, f64)> = v.iter().map(|(key, x)| (key, *x)).collect();
    entries.sort_by(|l, r| l.0.cmp(r.0));
    entries.iter().map(|(_, x)| x * x).sum::<f64>().sqrt()
}

/// Cosine similarity over the union of keys, absent keys counting as zero
#[derive(Debug, Clone, Copy, Default)]
pub struct Cosine;

impl SimilarityCalculator for Cosine {
    fn similarity<K: Ord + Hash>(&self, a: &HashMap<K, f64>, b: &HashMap<K, f64>) -> f64 {
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }

        // Keys only in one vector add to that vector's norm but not to the dot product
        let dot: f64 = shared_pairs(a, b).iter().map(|(x, y)| x * y).sum();
        let norm_a = norm(a);
        let norm_b = norm(b);

        if norm_a <= 0.0 || norm_b <= 0.0 {
            return 0.0;
        }

        dot / (norm_a * norm_b)
    }
}

/// Pearson correlation restricted to the keys both vectors share
#[derive(Debug, Clone, Copy, Default)]
pub struct Pearson;

impl SimilarityCalculator for Pearson {
    fn similarity<K: Ord + Hash>(&self, a: &HashMap<K, f64>, b: &HashMap<K, f64>) -> f64 {
        let pairs = shared_pairs(a, b);

        if pairs.is_empty() {
            return 0.0;
        }

        let n = pairs.len() as f64;
        let mean_a = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
        let mean_b = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

        let (mut covariance, mut variance_a, mut variance_b) = (0.0, 0.0, 0.0);
        for (x, y) in &pairs {
            let dx = x - mean_a;
            let dy = y - mean_b;
            covariance += dx * dy;
            variance_a += dx * dx;
            variance_b += dy * dy;
        }

        if variance_a <= 0.0 || variance_b <= 0.0 {
            return 0.0;
        }

        // Rounding can push a perfect correlation a hair outside [-1, 1]
        (covariance / (variance_a.sqrt() * variance_b.sqrt())).clamp(-1.0, 1.0)
    }
}

/// Selectable similarity method, dispatching to [`Cosine`] or [`Pearson`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityMethod {
    Cosine,
    Pearson,
}

impl SimilarityCalculator for SimilarityMethod {
    fn similarity<K: Ord + Hash>(&self, a: &HashMap<K, f64>, b: &HashMap<K, f64>) -> f64 {
        match self {
            SimilarityMethod::Cosine => Cosine.similarity(a, b),
            SimilarityMethod::Pearson => Pearson.similarity(a, b),
        }
    }
}

/// Intersection over union of two sets; `0.0` when both are empty
pub fn jaccard<K: Eq + Hash>(a: &HashSet<K>, b: &HashSet<K>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn vector(entries: &[(u64, f64)]) -> HashMap<u64, f64> {
        entries.iter().copied().collect()
    }

    #[test]
    fn test_pearson_perfectly_correlated_deviations() {
        let a = vector(&[(1, 4.0), (2, 2.0)]);
        let b = vector(&[(1, 5.0), (2, 1.0)]);
        assert!((Pearson.similarity(&a, &b) - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_cosine_known_value() {
        let a = vector(&[(1, 4.0), (2, 3.0)]);
        let b = vector(&[(1, 5.0), (2, 1.0)]);
        // 23 / (5 * sqrt(26))
        let expected = 23.0 / (5.0 * 26f64.sqrt());
        let actual = Cosine.similarity(&a, &b);
        assert!((actual - expected).abs() < EPSILON);
        assert!((actual - 0.902).abs() < 1e-3);
    }

    #[test]
    fn test_cosine_uses_union_of_keys() {
        let a = vector(&[(1, 1.0), (2, 1.0)]);
        let b = vector(&[(1, 1.0), (3, 1.0)]);
        assert!((Cosine.similarity(&a, &b) - 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_empty_vectors_yield_zero() {
        let empty: HashMap<u64, f64> = HashMap::new();
        let a = vector(&[(1, 4.0), (2, 3.0)]);

        for method in [SimilarityMethod::Cosine, SimilarityMethod::Pearson] {
            assert_eq!(method.similarity(&a, &empty), 0.0);
            assert_eq!(method.similarity(&empty, &a), 0.0);
            assert_eq!(method.similarity(&empty, &empty), 0.0);
        }
    }

    #[test]
    fn test_zero_norm_yields_zero() {
        let zeros = vector(&[(1, 0.0), (2, 0.0)]);
        let a = vector(&[(1, 4.0), (2, 3.0)]);
        assert_eq!(Cosine.similarity(&zeros, &a), 0.0);
    }

    #[test]
    fn test_pearson_zero_variance_yields_zero() {
        let flat = vector(&[(1, 5.0), (2, 5.0), (3, 5.0)]);
        let a = vector(&[(1, 1.0), (2, 7.0), (3, 9.0)]);
        assert_eq!(Pearson.similarity(&flat, &a), 0.0);
    }

    #[test]
    fn test_pearson_disjoint_keys_yield_zero() {
        let a = vector(&[(1, 4.0), (2, 3.0)]);
        let b = vector(&[(3, 5.0), (4, 1.0)]);
        assert_eq!(Pearson.similarity(&a, &b), 0.0);
    }

    #[test]
    fn test_similarity_is_symmetric() {
        let a = vector(&[(1, 9.0), (2, 8.5), (3, 6.0), (4, 3.0)]);
        let b = vector(&[(1, 9.5), (2, 8.0), (4, 2.5), (5, 7.0)]);

        for method in [SimilarityMethod::Cosine, SimilarityMethod::Pearson] {
            let ab = method.similarity(&a, &b);
            let ba = method.similarity(&b, &a);
            assert_eq!(ab, ba, "{:?} not symmetric", method);
        }
    }

    #[test]
    fn test_similarity_is_bitwise_symmetric_on_wide_vectors() {
        let a: HashMap<u64, f64> = (0..12).map(|k| (k, 1.0 + (k as f64 * 0.37) % 9.0)).collect();
        let b: HashMap<u64, f64> = (3..15)
            .map(|k| (k, 10.0 - (k as f64 * 1.13) % 8.5))
            .collect();

        for method in [SimilarityMethod::Cosine, SimilarityMethod::Pearson] {
            let ab = method.similarity(&a, &b);
            for _ in 0..8 {
                // Fresh maps get fresh hash seeds and iteration orders
                let a2: HashMap<u64, f64> = a.iter().map(|(k, v)| (*k, *v)).collect();
                let b2: HashMap<u64, f64> = b.iter().map(|(k, v)| (*k, *v)).collect();
                assert_eq!(ab, method.similarity(&b2, &a2), "{:?} not symmetric", method);
                assert_eq!(ab, method.similarity(&a2, &b2), "{:?} not stable", method);
            }
        }
    }

    #[test]
    fn test_self_similarity_is_one() {
        let a = vector(&[(1, 9.0), (2, 4.0), (3, 6.5)]);

        for method in [SimilarityMethod::Cosine, SimilarityMethod::Pearson] {
            assert!((method.similarity(&a, &a) - 1.0).abs() < EPSILON);
        }
    }

    #[test]
    fn test_pearson_ignores_keys_outside_intersection() {
        let a = vector(&[(1, 9.0), (2, 4.0), (3, 6.5)]);
        let b = vector(&[(1, 8.0), (2, 3.0), (3, 7.0), (4, 1.0)]);
        let mut b_changed = b.clone();
        b_changed.insert(4, 10.0);
        b_changed.insert(5, 2.0);

        assert_eq!(Pearson.similarity(&a, &b), Pearson.similarity(&a, &b_changed));
    }

    #[test]
    fn test_pearson_anti_correlation() {
        let a = vector(&[(1, 1.0), (2, 5.0), (3, 9.0)]);
        let b = vector(&[(1, 9.0), (2, 5.0), (3, 1.0)]);
        assert!((Pearson.similarity(&a, &b) + 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_jaccard() {
        let a: HashSet<u64> = [1, 2, 3].into_iter().collect();
        let b: HashSet<u64> = [2, 3, 4].into_iter().collect();
        let empty: HashSet<u64> = HashSet::new();

        assert!((jaccard(&a, &b) - 0.5).abs() < EPSILON);
        assert_eq!(jaccard(&a, &empty), 0.0);
        assert_eq!(jaccard(&empty, &empty), 0.0);
    }

    #[test]
    fn test_similarity_method_deserialization() {
        let method: SimilarityMethod = serde_json::from_str("\"pearson\"").unwrap();
        assert_eq!(method, SimilarityMethod::Pearson);
    }
}
