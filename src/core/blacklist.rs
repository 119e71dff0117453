use std::collections::HashSet;

use indexmap::IndexSet;

use crate::core::affinity::AffinityModel;
use crate::models::{Pair, Thresholds};

/// Quantities derived from the thresholds that drive the elimination loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlacklistPlan {
    /// Top-ranked pairs examined per pass
    pub per_pass: usize,
    /// Blacklist size at which elimination stops
    pub target: usize,
    /// Lowest-ranked candidates taken per examined pair and side
    pub candidates_per_pair: usize,
    pub max_passes: usize,
}

impl BlacklistPlan {
    pub fn derive(universe_size: usize, total_pairs: usize, thresholds: Thresholds) -> Self {
        let Thresholds { x_pct, y_pct } = thresholds;
        let n = universe_size as f64;

        let per_pass = percent_of(total_pairs as f64, x_pct).max(1);
        let target = percent_of(n, y_pct);
        let bottom_rate = if x_pct > 0.0 { y_pct / x_pct } else { 0.0 };
        let candidates_per_pair = percent_of(n, bottom_rate).max(1);
        let max_passes = if target > 0 {
            target.div_ceil(candidates_per_pair)
        } else {
            1
        };

        Self {
            per_pass,
            target,
            candidates_per_pair,
            max_passes,
        }
    }
}

/// `floor(total * pct / 100)`, saturating at zero
#[inline]
pub(crate) fn percent_of(total: f64, pct: f64) -> usize {
    (total * pct / 100.0).floor() as usize
}

/// Elimination rule for one parent side
#[derive(Debug, Clone, Default)]
pub struct SideRule {
    /// False when the side's parent is owned; such sides never eliminate.
    pub eliminate: bool,
    /// Manual ancestors that must never be blacklisted from this side
    pub protected: HashSet<usize>,
}

impl SideRule {
    pub fn open() -> Self {
        Self {
            eliminate: true,
            protected: HashSet::new(),
        }
    }

    pub fn owned() -> Self {
        Self {
            eliminate: false,
            protected: HashSet::new(),
        }
    }

    pub fn protecting(protected: impl IntoIterator<Item = usize>) -> Self {
        Self {
            eliminate: true,
            protected: protected.into_iter().collect(),
        }
    }
}

/// Result of the elimination phase, in insertion order
#[derive(Debug, Clone)]
pub struct Blacklist {
    pub members: IndexSet<usize>,
    pub plan: BlacklistPlan,
    pub passes: usize,
}

impl Blacklist {
    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        self.members.contains(&index)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn names(&self, model: &AffinityModel<'_>) -> Vec<String> {
        self.members
            .iter()
            .map(|&idx| model.name(idx).to_string())
            .collect()
    }
}

/// Build the blacklist by repeatedly scanning the top of the ranked pairs
///
/// Every pass restarts from the first pair and examines up to `per_pass`
/// pairs. For each examined pair and each side that may eliminate, the
/// remaining candidates are ranked by the weakest of three relationships:
/// child to the side's pair member, child to the candidate, and the side's
/// pair member to the candidate in the child matrix. The lowest
/// `candidates_per_pair` are blacklisted unless protected on that side.
pub fn build_blacklist(
    model: &AffinityModel<'_>,
    child: usize,
    pairs: &[Pair],
    thresholds: Thresholds,
    sides: &[SideRule; 2],
) -> Blacklist {
    let n = model.len();
    let plan = BlacklistPlan::derive(n, pairs.len(), thresholds);
    let mut members: IndexSet<usize> = IndexSet::new();
    let mut passes = 0;

    if pairs.is_empty() {
        return Blacklist {
            members,
            plan,
            passes,
        };
    }

    while members.len() < plan.target && passes < plan.max_passes {
        passes += 1;
        let size_before = members.len();

        for pair in pairs.iter().take(plan.per_pass) {
            if members.len() >= plan.target {
                break;
            }

            for (rule, anchor) in sides.iter().zip([pair.left, pair.right]) {
                if !rule.eliminate {
                    continue;
                }

                let mut ranked: Vec<(i64, usize)> = (0..n)
                    .filter(|&k| {
                        k != child && k != pair.left && k != pair.right && !members.contains(&k)
                    })
                    .map(|k| {
                        let weakest = model
                            .global(child, anchor)
                            .min(model.global(child, k))
                            .min(model.child(anchor, k));
                        (weakest, k)
                    })
                    .collect();
                // (score, index) is a total order, so ties fall to the lower index
                ranked.sort_unstable();

                for (_, k) in ranked.into_iter().take(plan.candidates_per_pair) {
                    if members.len() >= plan.target {
                        break;
                    }
                    if !rule.protected.contains(&k) {
                        members.insert(k);
                    }
                }
            }
        }

        if members.len() == size_before {
            // Every pass sees the same pairs, so a pass that adds nothing
            // means the remaining passes would add nothing either.
            tracing::trace!("Blacklist pass {} added nothing, stopping", passes);
            break;
        }
    }

    tracing::debug!(
        "Blacklist built: {} of target {} after {} pass(es) (per_pass={}, per_pair={})",
        members.len(),
        plan.target,
        passes,
        plan.per_pass,
        plan.candidates_per_pair
    );

    Blacklist {
        members,
        plan,
        passes,
    }
}
