// Service exports
pub mod cache;
pub mod matrix_loader;
pub mod registry;
pub mod search_url;

pub use cache::{CacheError, CacheKey, MatrixCache};
pub use matrix_loader::{LoaderError, MatrixLoader, TrimmedMatrix};
pub use registry::{CharacterRegistry, RegistryError};
pub use search_url::{SearchDefaults, SearchInfo, SearchOptions, SearchUrlBuilder, SearchUrlError};
