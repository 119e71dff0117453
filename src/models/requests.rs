use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::{ParentSlot, Selection, Thresholds};
use crate::services::search_url::SearchOptions;

/// Request to run the parent filter
///
/// The ancestor limit mirrors `core::MAX_MANUAL_ANCESTORS`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FilterRequest {
    #[validate(length(min = 1))]
    pub child: String,
    #[serde(default)]
    pub parent1: Option<String>,
    #[serde(default)]
    pub parent2: Option<String>,
    #[serde(default)]
    pub owned1: bool,
    #[serde(default)]
    pub owned2: bool,
    #[validate(length(max = 2))]
    #[serde(default)]
    pub ancestors1: Vec<String>,
    #[validate(length(max = 2))]
    #[serde(default)]
    pub ancestors2: Vec<String>,
    #[validate(range(min = 0.0, max = 100.0))]
    #[serde(rename = "xPct", alias = "x_pct", default)]
    pub x_pct: Option<f64>,
    #[validate(range(min = 0.0, max = 100.0))]
    #[serde(rename = "yPct", alias = "y_pct", default)]
    pub y_pct: Option<f64>,
    #[serde(default)]
    pub search: SearchOptions,
}

impl FilterRequest {
    /// Selection for the orchestrator; blank parent names count as unselected
    pub fn selection(&self) -> Selection {
        Selection {
            child: self.child.trim().to_string(),
            parent1: slot(&self.parent1, self.owned1, &self.ancestors1),
            parent2: slot(&self.parent2, self.owned2, &self.ancestors2),
        }
    }

    /// Thresholds for this run, falling back to `defaults` per field
    pub fn thresholds(&self, defaults: Thresholds) -> Thresholds {
        Thresholds {
            x_pct: self.x_pct.unwrap_or(defaults.x_pct),
            y_pct: self.y_pct.unwrap_or(defaults.y_pct),
        }
    }
}

fn slot(name: &Option<String>, owned: bool, ancestors: &[String]) -> ParentSlot {
    let name = name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);
    ParentSlot {
        name,
        owned,
        manual_ancestors: ancestors
            .iter()
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
            .map(str::to_string)
            .collect(),
    }
}
