// Core algorithm exports
pub mod affinity;
pub mod blacklist;
pub mod filter;
pub mod pairs;
pub mod whitelist;

pub use affinity::{AffinityMatrix, AffinityModel, CharacterUniverse, MatrixError, MatrixKind};
pub use blacklist::{build_blacklist, Blacklist, BlacklistPlan, SideRule};
pub use filter::{Filter, FilterError, MAX_MANUAL_ANCESTORS};
pub use pairs::generate_pairs;
pub use whitelist::{build_whitelist, SelectedParent, Whitelist};
