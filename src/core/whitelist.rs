use crate::core::affinity::AffinityModel;
use crate::core::blacklist::{percent_of, Blacklist};
use crate::models::{Pair, WhitelistStatus};

/// Selected parent for the whitelist phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectedParent {
    pub index: usize,
    pub owned: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Whitelist {
    pub names: Vec<String>,
    pub status: WhitelistStatus,
}

impl Whitelist {
    fn new(names: Vec<String>) -> Self {
        let status = if names.is_empty() {
            WhitelistStatus::NoCandidates
        } else {
            WhitelistStatus::Recommended
        };
        Self { names, status }
    }
}

/// Build the whitelist from the ranked pairs
///
/// With both parents selected the answer is fixed: the parent(s) not yet
/// owned. Otherwise each non-blacklisted character is scored by the sum of
/// every pair score it takes part in, and the top `x_pct` of the universe
/// (at least one) is returned. A lone owned parent is dropped from the result.
pub fn build_whitelist(
    model: &AffinityModel<'_>,
    pairs: &[Pair],
    blacklist: &Blacklist,
    parents: [Option<SelectedParent>; 2],
    x_pct: f64,
) -> Whitelist {
    if let [Some(p1), Some(p2)] = parents {
        let names: Vec<String> = match (p1.owned, p2.owned) {
            (true, true) => {
                return Whitelist {
                    names: Vec::new(),
                    status: WhitelistStatus::NothingNeeded,
                }
            }
            (true, false) => vec![model.name(p2.index).to_string()],
            (false, true) => vec![model.name(p1.index).to_string()],
            (false, false) => vec![
                model.name(p1.index).to_string(),
                model.name(p2.index).to_string(),
            ],
        };
        return Whitelist::new(names);
    }

    if pairs.is_empty() {
        return Whitelist::new(Vec::new());
    }

    let n = model.len();
    let mut aggregate: Vec<Option<i64>> = (0..n)
        .map(|idx| if blacklist.contains(idx) { None } else { Some(0) })
        .collect();
    for pair in pairs {
        for idx in [pair.left, pair.right] {
            if let Some(total) = aggregate[idx].as_mut() {
                *total += pair.score;
            }
        }
    }

    let mut ranked: Vec<(usize, i64)> = aggregate
        .into_iter()
        .enumerate()
        .filter_map(|(idx, total)| total.map(|t| (idx, t)))
        .collect();
    // Stable, so equal totals keep universe order
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let count = percent_of(n as f64, x_pct).max(1);
    let owned_single = match parents {
        [Some(p), None] | [None, Some(p)] if p.owned => Some(p.index),
        _ => None,
    };

    let names = ranked
        .into_iter()
        .take(count)
        .filter(|(idx, _)| Some(*idx) != owned_single)
        .map(|(idx, _)| model.name(idx).to_string())
        .collect();

    Whitelist::new(names)
}
