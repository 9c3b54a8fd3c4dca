//! Concrete collaborators for the outbound ports.
//!
//! Everything that talks to the ledger node or holds key material lives here.

pub mod execution_manager;
pub mod ledger;
pub mod receipts;
pub mod wallet;

pub use execution_manager::ContractExecutionManager;
pub use ledger::JsonRpcLedger;
pub use receipts::ExecutionManagerReceiptTranslator;
pub use wallet::{LocalWallet, WalletError};
