// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{CharacterSummary, FilterOutcome, FilterStats, Pair, ParentSlot, Selection, Thresholds, WhitelistStatus};
pub use requests::FilterRequest;
pub use responses::{CharactersResponse, ErrorResponse, FilterResponse, HealthResponse};
