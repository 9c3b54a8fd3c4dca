//! `net_*` methods.

use tracing::instrument;

use crate::domain::error::GatewayResult;

/// Net RPC methods handler
#[derive(Debug, Clone, Copy)]
pub struct NetRpc {
    chain_id: u64,
}

impl NetRpc {
    pub fn new(chain_id: u64) -> Self {
        Self { chain_id }
    }

    /// net_version - the rollup chain id as a decimal string
    #[instrument(skip(self))]
    pub async fn version(&self) -> GatewayResult<String> {
        Ok(self.chain_id.to_string())
    }
}
