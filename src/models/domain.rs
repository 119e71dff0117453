use serde::{Deserialize, Serialize};

/// One candidate ancestor combination, scored from the global matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    pub score: i64,
    pub left: usize,
    pub right: usize,
}

impl Pair {
    pub fn new(score: i64, left: usize, right: usize) -> Self {
        Self { score, left, right }
    }
}

/// Percentage thresholds for a filter run
///
/// `x_pct` sizes the examined pair window and the whitelist, `y_pct` sizes
/// the blacklist.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    #[serde(rename = "xPct")]
    pub x_pct: f64,
    #[serde(rename = "yPct")]
    pub y_pct: f64,
}

impl Thresholds {
    pub fn new(x_pct: f64, y_pct: f64) -> Self {
        Self { x_pct, y_pct }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            x_pct: 10.0,
            y_pct: 20.0,
        }
    }
}

/// One parent side as supplied by the caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentSlot {
    /// `None` means the slot is not selected
    pub name: Option<String>,
    pub owned: bool,
    /// Up to two ancestors already fixed on this side; ignored when owned
    pub manual_ancestors: Vec<String>,
}

impl ParentSlot {
    pub fn unselected() -> Self {
        Self::default()
    }

    pub fn selected(name: impl Into<String>, owned: bool) -> Self {
        Self {
            name: Some(name.into()),
            owned,
            manual_ancestors: Vec::new(),
        }
    }

    pub fn with_ancestors<I, S>(mut self, ancestors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.manual_ancestors = ancestors.into_iter().map(Into::into).collect();
        self
    }
}

/// Child and parent selection for one filter run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub child: String,
    pub parent1: ParentSlot,
    pub parent2: ParentSlot,
}

impl Selection {
    pub fn new(child: impl Into<String>) -> Self {
        Self {
            child: child.into(),
            parent1: ParentSlot::unselected(),
            parent2: ParentSlot::unselected(),
        }
    }
}

/// Why a whitelist has the entries it has
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WhitelistStatus {
    /// At least one name is recommended
    Recommended,
    /// Both parents are selected and owned; nothing left to look for
    NothingNeeded,
    /// Ranking ran but produced no names
    NoCandidates,
}

/// Counters describing how a filter run went
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterStats {
    #[serde(rename = "totalPairs")]
    pub total_pairs: usize,
    #[serde(rename = "perPass")]
    pub per_pass: usize,
    #[serde(rename = "candidatesPerPair")]
    pub candidates_per_pair: usize,
    #[serde(rename = "blacklistTarget")]
    pub blacklist_target: usize,
    #[serde(rename = "maxPasses")]
    pub max_passes: usize,
    #[serde(rename = "passesRun")]
    pub passes_run: usize,
}

/// Whitelist and blacklist produced by one filter run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterOutcome {
    pub whitelist: Vec<String>,
    pub blacklist: Vec<String>,
    pub status: WhitelistStatus,
    pub stats: FilterStats,
}

/// Character as listed to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterSummary {
    pub name: String,
    pub deployed: bool,
}
