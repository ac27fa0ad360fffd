use rocketshoes_core::DomainError;

use crate::api::ApiError;
use crate::storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum CartError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("catalog request failed: {0}")]
    Api(#[from] ApiError),
    #[error("cart storage failed: {0}")]
    Storage(#[from] StorageError),
    #[error("stored cart could not be read: {0}")]
    Corrupt(#[source] serde_json::Error),
    #[error("cart could not be serialized: {0}")]
    Encode(#[source] serde_json::Error),
}

impl CartError {
    pub fn is_out_of_stock(&self) -> bool {
        matches!(self, CartError::Domain(e) if e.is_out_of_stock())
    }
}
