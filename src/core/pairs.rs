use crate::core::affinity::AffinityModel;
use crate::models::Pair;

/// Generate the ranked candidate pairs for a child
///
/// The mode follows which parent slots are set:
/// - both: the single (parent1, parent2) pair
/// - only parent1: parent1 with every other character
/// - only parent2: every other character with parent2
/// - neither: every unordered pair `i < j` over the universe
///
/// Pair score is `global(c, left) + global(c, right) + global(left, right)`.
/// The result is sorted by score descending; equal scores keep generation order.
pub fn generate_pairs(
    model: &AffinityModel<'_>,
    child: usize,
    parent1: Option<usize>,
    parent2: Option<usize>,
) -> Vec<Pair> {
    let n = model.len();
    let score = |left: usize, right: usize| {
        model.global(child, left) + model.global(child, right) + model.global(left, right)
    };

    let mut pairs: Vec<Pair> = match (parent1, parent2) {
        (Some(p1), Some(p2)) => vec![Pair::new(score(p1, p2), p1, p2)],
        (Some(p1), None) => (0..n)
            .filter(|&k| k != p1)
            .map(|k| Pair::new(score(p1, k), p1, k))
            .collect(),
        (None, Some(p2)) => (0..n)
            .filter(|&k| k != p2)
            .map(|k| Pair::new(score(k, p2), k, p2))
            .collect(),
        (None, None) => {
            let mut all = Vec::with_capacity(n * n.saturating_sub(1) / 2);
            for i in 0..n {
                for j in (i + 1)..n {
                    all.push(Pair::new(score(i, j), i, j));
                }
            }
            all
        }
    };

    // sort_by is stable
    pairs.sort_by(|a, b| b.score.cmp(&a.score));
    pairs
}
