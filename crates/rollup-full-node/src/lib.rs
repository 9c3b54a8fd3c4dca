// Allow missing docs for internal items
#![allow(missing_docs)]

//! Rollup full node - JSON-RPC gateway in front of an OVM execution manager.
//!
//! Clients speak ordinary Ethereum JSON-RPC. Every call is translated into a
//! call on the execution manager contract deployed to an underlying ledger
//! node, and every raw transaction is re-wrapped and signed by the node
//! wallet before it is forwarded.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                         ROLLUP FULL NODE                             │
//! ├──────────────────────────────────────────────────────────────────────┤
//! │  ┌──────────────────────┐                                            │
//! │  │  HTTP JSON-RPC       │  POST / (single + batch), GET /health      │
//! │  │  FullnodeRpcServer   │                                            │
//! │  └──────────┬───────────┘                                            │
//! │             │                                                        │
//! │  ┌──────────┴───────────┐   Web3Method table: arity + default        │
//! │  │  RequestDispatcher   │   Web3Request: typed parameters            │
//! │  └──────────┬───────────┘                                            │
//! │             │                                                        │
//! │  ┌──────────┴───────────┬─────────────────┬──────────────┐           │
//! │  │ EthRpc               │ NetRpc          │ EvmRpc       │           │
//! │  │  reads ──────────────┼─────────────────┼── passthrough│           │
//! │  │  send ─ OrderingGate │                 │              │           │
//! │  │          └ Translator, HashRegistry    │              │           │
//! │  └──────────┬───────────┴─────────────────┴──────┬───────┘           │
//! └─────────────┼────────────────────────────────────┼───────────────────┘
//!               │ ExecutionManager (eth_call / wallet txs)
//!               ▼                                    ▼
//!                        LedgerClient (HTTP JSON-RPC)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use rollup_full_node::{FullnodeRpcServer, GatewayConfig, RequestDispatcher};
//!
//! let config = GatewayConfig::from_env()?;
//! let dispatcher = RequestDispatcher::new(components, &config.chain);
//! let response = dispatcher.handle_request("eth_blockNumber", vec![]).await?;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod dispatch;
pub mod domain;
pub mod gate;
pub mod ports;
pub mod registry;
pub mod rpc;
pub mod service;
pub mod telemetry;
pub mod translator;

// Re-exports for public API
pub use adapters::{
    ContractExecutionManager, ExecutionManagerReceiptTranslator, JsonRpcLedger, LocalWallet,
};
pub use dispatch::RequestDispatcher;
pub use domain::config::GatewayConfig;
pub use domain::error::{ApiError, GatewayError, GatewayResult, LedgerError, TranslationError};
pub use domain::methods::{get_method_info, is_method_supported, MethodInfo, Web3Method};
pub use gate::{GlobalGate, NoopGate, OrderingGate, PerSenderGate};
pub use registry::HashRegistry;
pub use rpc::NodeComponents;
pub use service::FullnodeRpcServer;
pub use translator::TransactionTranslator;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
