//! Ports to the collaborators the node does not own.

pub mod outbound;

pub use outbound::{ExecutionManager, LedgerClient, ReceiptTranslator, TransactionSigner};
