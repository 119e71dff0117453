use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::core::affinity::AffinityMatrix;
use crate::services::matrix_loader::LoaderError;

/// Errors that can occur while filling the cache
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("{0}")]
    Load(#[from] LoaderError),

    #[error("Matrix loading task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// In-memory cache of child matrices, keyed by child name
///
/// Each entry is the matrix for exactly the child named by its key.
pub struct MatrixCache {
    cache: moka::future::Cache<String, Arc<AffinityMatrix>>,
}

impl MatrixCache {
    pub fn new(capacity: u64, ttl_secs: u64) -> Self {
        let cache = moka::future::CacheBuilder::new(capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();
        Self { cache }
    }

    /// Get a child's matrix, running `load` on the blocking pool on a miss
    ///
    /// Concurrent misses for the same child share one load.
    pub async fn get_or_load<F>(
        &self,
        child: &str,
        load: F,
    ) -> Result<Arc<AffinityMatrix>, Arc<CacheError>>
    where
        F: FnOnce() -> Result<AffinityMatrix, LoaderError> + Send + 'static,
    {
        let key = CacheKey::child(child);
        self.cache
            .try_get_with(key, async move {
                tracing::trace!("Child matrix cache miss");
                let matrix = tokio::task::spawn_blocking(load).await??;
                Ok::<_, CacheError>(Arc::new(matrix))
            })
            .await
    }

    pub async fn invalidate(&self, child: &str) {
        self.cache.invalidate(&CacheKey::child(child)).await;
    }
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    pub fn child(name: &str) -> String {
        format!("child:{}", name)
    }
}
