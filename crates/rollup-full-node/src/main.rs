//! Rollup full node entry point.
//!
//! Startup: load configuration from the environment, install logging, connect
//! to the ledger node, then serve JSON-RPC until Ctrl+C.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use rollup_full_node::adapters::{
    ContractExecutionManager, ExecutionManagerReceiptTranslator, JsonRpcLedger, LocalWallet,
};
use rollup_full_node::gate::GlobalGate;
use rollup_full_node::ports::TransactionSigner;
use rollup_full_node::rpc::NodeComponents;
use rollup_full_node::telemetry::init_logging;
use rollup_full_node::{FullnodeRpcServer, GatewayConfig, RequestDispatcher, VERSION};

#[tokio::main]
async fn main() -> Result<()> {
    let config = GatewayConfig::from_env().context("reading configuration")?;
    init_logging(&config.logging)?;
    config.validate().context("invalid configuration")?;

    let execution_manager = config
        .execution_manager
        .address
        .context("execution manager address")?;
    let private_key = config
        .wallet
        .private_key
        .as_deref()
        .context("wallet private key")?;

    let ledger = Arc::new(JsonRpcLedger::new(&config.ledger.url)?);
    let wallet = Arc::new(LocalWallet::from_hex(private_key)?);

    info!(
        version = VERSION,
        ledger = %config.ledger.url,
        execution_manager = ?execution_manager,
        wallet = ?wallet.address(),
        chain_id = config.chain.chain_id,
        "Starting rollup full node"
    );
    if let Some(mask) = &config.execution_manager.opcode_whitelist_mask {
        info!(opcode_whitelist_mask = %mask, "Execution manager opcode whitelist");
    }

    let components = NodeComponents {
        ledger: ledger.clone(),
        execution_manager: Arc::new(ContractExecutionManager::new(
            ledger,
            wallet.clone(),
            execution_manager,
            config.chain.chain_id,
            config.chain.write_gas_limit,
        )),
        signer: wallet,
        receipts: Arc::new(ExecutionManagerReceiptTranslator::new(execution_manager)),
        gate: Arc::new(GlobalGate::new()),
    };
    let dispatcher = Arc::new(RequestDispatcher::new(components, &config.chain));

    let server = FullnodeRpcServer::new(config.server.clone(), dispatcher);
    server
        .start(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Received shutdown signal");
            }
        })
        .await?;

    Ok(())
}
