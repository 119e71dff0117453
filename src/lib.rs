//! Breed Assist - parent recommendations for breeding runs
//!
//! This library turns a global character-compatibility matrix and a
//! child-specific ancestor matrix into a whitelist of characters worth
//! pairing with and a blacklist of characters to avoid.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{AffinityMatrix, AffinityModel, CharacterUniverse, Filter, FilterError};
pub use crate::models::{FilterOutcome, FilterRequest, FilterResponse, ParentSlot, Selection, Thresholds, WhitelistStatus};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let universe = CharacterUniverse::new(vec!["A".into(), "B".into()]).unwrap();
        let matrix = AffinityMatrix::zeros(2);
        let model = AffinityModel::new(&universe, &matrix, &matrix).unwrap();
        let outcome = Filter::default().run(&model, &Selection::new("A"), None).unwrap();
        assert_eq!(outcome.stats.total_pairs, 1);
    }
}
