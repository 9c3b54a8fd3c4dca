//! RPC method handlers.

pub mod eth;
pub mod evm;
pub mod net;

pub use eth::EthRpc;
pub use evm::EvmRpc;
pub use net::NetRpc;

use std::sync::Arc;

use crate::domain::config::ChainConfig;
use crate::gate::OrderingGate;
use crate::ports::{ExecutionManager, LedgerClient, ReceiptTranslator, TransactionSigner};
use crate::translator::TransactionTranslator;

/// Collaborators shared by the handlers.
#[derive(Clone)]
pub struct NodeComponents {
    pub ledger: Arc<dyn LedgerClient>,
    pub execution_manager: Arc<dyn ExecutionManager>,
    pub signer: Arc<dyn TransactionSigner>,
    pub receipts: Arc<dyn ReceiptTranslator>,
    pub gate: Arc<dyn OrderingGate>,
}

/// All RPC handlers
pub struct RpcHandlers {
    pub eth: EthRpc,
    pub net: NetRpc,
    pub evm: EvmRpc,
}

impl RpcHandlers {
    pub fn new(components: NodeComponents, chain: &ChainConfig) -> Self {
        let translator =
            TransactionTranslator::new(components.execution_manager.address(), chain.chain_id);
        Self {
            eth: EthRpc::new(
                translator,
                Arc::clone(&components.ledger),
                components.execution_manager,
                components.signer,
                components.receipts,
                components.gate,
                chain.gas_limit,
            ),
            net: NetRpc::new(chain.chain_id),
            evm: EvmRpc::new(components.ledger),
        }
    }
}
