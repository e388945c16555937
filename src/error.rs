use thiserror::Error;

use crate::models::ProductUrl;
use crate::storage::StoreError;

/// Why a tracker operation did not complete. Each variant has already been
/// reported to the user through the notifier by the time it is returned.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("{0} is already being tracked")]
    Duplicate(ProductUrl),
    #[error("failed to check whether {url} is tracked: {source}")]
    Lookup {
        url: ProductUrl,
        #[source]
        source: StoreError,
    },
    #[error("failed to load products: {0}")]
    Load(#[source] StoreError),
    #[error("failed to add {url}: {source}")]
    Insert {
        url: ProductUrl,
        #[source]
        source: StoreError,
    },
    #[error("failed to remove {url}: {source}")]
    Remove {
        url: ProductUrl,
        #[source]
        source: StoreError,
    },
}

pub type TrackerResult<T> = Result<T, TrackerError>;
