use std::collections::HashSet;
use thiserror::Error;

use crate::core::{
    affinity::{AffinityModel, MatrixError},
    blacklist::{build_blacklist, SideRule},
    pairs::generate_pairs,
    whitelist::{build_whitelist, SelectedParent},
};
use crate::models::{FilterOutcome, FilterStats, ParentSlot, Selection, Thresholds};

/// Most manual ancestors a parent side can carry
pub const MAX_MANUAL_ANCESTORS: usize = 2;

/// Errors that abort a filter run before any phase produces output
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FilterError {
    #[error("Character not found: {0}")]
    UnknownCharacter(String),

    #[error("Invalid {name}: {value} (expected a percentage between 0 and 100)")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error("Parent {side} has {count} manual ancestors, at most {max} allowed", max = MAX_MANUAL_ANCESTORS)]
    TooManyAncestors { side: u8, count: usize },

    #[error("Parent 1 and parent 2 are both {0}")]
    SameParent(String),

    #[error("Matrix error: {0}")]
    Matrix(#[from] MatrixError),
}

/// Parent side after name resolution
#[derive(Debug, Clone)]
struct ResolvedSide {
    parent: Option<usize>,
    owned: bool,
    manual: HashSet<usize>,
}

/// Filter orchestrator - runs pair generation, elimination and selection
///
/// # Phases
/// 1. Ranked pair generation
/// 2. Blacklist elimination
/// 3. Whitelist aggregation
#[derive(Debug, Clone, Copy)]
pub struct Filter {
    thresholds: Thresholds,
}

impl Filter {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    pub fn with_default_thresholds() -> Self {
        Self {
            thresholds: Thresholds::default(),
        }
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Produce the whitelist and blacklist for a selection
    ///
    /// `overrides` replaces the filter's default thresholds for this run.
    /// All names are resolved before any phase runs, so an unknown name
    /// fails the call without partial output.
    pub fn run(
        &self,
        model: &AffinityModel<'_>,
        selection: &Selection,
        overrides: Option<Thresholds>,
    ) -> Result<FilterOutcome, FilterError> {
        let thresholds = overrides.unwrap_or(self.thresholds);
        validate_threshold("xPct", thresholds.x_pct)?;
        validate_threshold("yPct", thresholds.y_pct)?;

        let child = resolve(model, &selection.child)?;
        let side1 = resolve_side(model, 1, &selection.parent1)?;
        let side2 = resolve_side(model, 2, &selection.parent2)?;
        if let (Some(p1), Some(p2)) = (side1.parent, side2.parent) {
            if p1 == p2 {
                return Err(FilterError::SameParent(model.name(p1).to_string()));
            }
        }

        // Phase 1
        let pairs = generate_pairs(model, child, side1.parent, side2.parent);

        // Phase 2
        let protected: HashSet<usize> = side1.manual.union(&side2.manual).copied().collect();
        let sides = [side_rule(&side1, &protected), side_rule(&side2, &protected)];
        let blacklist = build_blacklist(model, child, &pairs, thresholds, &sides);

        // Phase 3
        let parents = [selected(&side1), selected(&side2)];
        let whitelist = build_whitelist(model, &pairs, &blacklist, parents, thresholds.x_pct);

        tracing::debug!(
            "Filter for {}: {} pairs, whitelist {}, blacklist {}",
            selection.child,
            pairs.len(),
            whitelist.names.len(),
            blacklist.len()
        );

        Ok(FilterOutcome {
            whitelist: whitelist.names,
            blacklist: blacklist.names(model),
            status: whitelist.status,
            stats: FilterStats {
                total_pairs: pairs.len(),
                per_pass: blacklist.plan.per_pass,
                candidates_per_pair: blacklist.plan.candidates_per_pair,
                blacklist_target: blacklist.plan.target,
                max_passes: blacklist.plan.max_passes,
                passes_run: blacklist.passes,
            },
        })
    }
}

impl Default for Filter {
    fn default() -> Self {
        Self::with_default_thresholds()
    }
}

fn validate_threshold(name: &'static str, value: f64) -> Result<(), FilterError> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(FilterError::InvalidThreshold { name, value })
    }
}

fn resolve(model: &AffinityModel<'_>, name: &str) -> Result<usize, FilterError> {
    model
        .index_of(name)
        .ok_or_else(|| FilterError::UnknownCharacter(name.to_string()))
}

fn resolve_side(
    model: &AffinityModel<'_>,
    side: u8,
    slot: &ParentSlot,
) -> Result<ResolvedSide, FilterError> {
    if slot.manual_ancestors.len() > MAX_MANUAL_ANCESTORS {
        return Err(FilterError::TooManyAncestors {
            side,
            count: slot.manual_ancestors.len(),
        });
    }

    let parent = slot.name.as_deref().map(|n| resolve(model, n)).transpose()?;
    let manual = slot
        .manual_ancestors
        .iter()
        .map(|n| resolve(model, n))
        .collect::<Result<HashSet<_>, _>>()?;

    Ok(ResolvedSide {
        parent,
        owned: slot.owned,
        // Manual ancestors only matter for sides that are still open
        manual: if slot.owned { HashSet::new() } else { manual },
    })
}

// A manual ancestor fixed on either open side stays off the blacklist,
// whichever side's scan reaches it.
fn side_rule(side: &ResolvedSide, protected: &HashSet<usize>) -> SideRule {
    if side.owned {
        SideRule::owned()
    } else {
        SideRule::protecting(protected.iter().copied())
    }
}

fn selected(side: &ResolvedSide) -> Option<SelectedParent> {
    side.parent.map(|index| SelectedParent {
        index,
        owned: side.owned,
    })
}
