//! Outer → inner transaction hash registry.
//!
//! The association lives in execution manager state, so the registry is a thin
//! typed layer over [`ExecutionManager`]. Last write for an outer hash wins.

use std::sync::Arc;
use tracing::debug;

use crate::domain::error::GatewayResult;
use crate::domain::types::Hash;
use crate::ports::ExecutionManager;

#[derive(Clone)]
pub struct HashRegistry {
    execution_manager: Arc<dyn ExecutionManager>,
}

impl HashRegistry {
    pub fn new(execution_manager: Arc<dyn ExecutionManager>) -> Self {
        Self { execution_manager }
    }

    /// Persist `outer → inner`. Failures propagate unchanged.
    pub async fn register_mapping(&self, outer: Hash, inner: Hash) -> GatewayResult<()> {
        let write = self
            .execution_manager
            .map_transaction_hash(outer, inner)
            .await?;
        debug!(outer = ?outer, inner = ?inner, write = ?write, "Registered transaction hash mapping");
        Ok(())
    }

    /// Inner hash recorded for `outer`. Unknown hashes resolve to whatever the
    /// execution manager returns for an unset slot (the zero hash).
    pub async fn resolve(&self, outer: Hash) -> GatewayResult<Hash> {
        self.execution_manager.internal_transaction_hash(outer).await
    }
}

impl std::fmt::Debug for HashRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashRegistry")
            .field("execution_manager", &self.execution_manager.address())
            .finish()
    }
}
