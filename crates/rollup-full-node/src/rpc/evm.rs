//! Test-node control methods (`evm_snapshot`, `evm_revert`, `evm_mine`).
//!
//! Forwarded to the ledger without translation.

use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;

use crate::domain::error::GatewayResult;
use crate::domain::methods::Web3Method;
use crate::ports::LedgerClient;

pub struct EvmRpc {
    ledger: Arc<dyn LedgerClient>,
}

impl EvmRpc {
    pub fn new(ledger: Arc<dyn LedgerClient>) -> Self {
        Self { ledger }
    }

    #[instrument(skip(self))]
    pub async fn forward(&self, method: Web3Method, params: Vec<Value>) -> GatewayResult<Value> {
        Ok(self.ledger.send(method.as_str(), params).await?)
    }
}
