//! Outbound ports.
//!
//! The ledger node, the deployed execution manager, the node wallet and
//! receipt translation are all reached through these traits so tests can
//! stand in for any of them.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::domain::error::{GatewayResult, LedgerError};
use crate::domain::transaction::{InnerTransaction, SignedTransaction};
use crate::domain::types::{Address, BlockTag, Hash, TransactionReceipt, U256};

/// Raw JSON-RPC access to the underlying ledger node.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Send one call. Single attempt, no timeout of its own.
    async fn send(&self, method: &str, params: Vec<Value>) -> Result<Value, LedgerError>;

    /// `eth_getTransactionCount` narrowed to `u64`.
    async fn transaction_count(&self, address: Address, block: BlockTag) -> Result<u64, LedgerError> {
        const METHOD: &str = "eth_getTransactionCount";
        let value = self.send(METHOD, vec![json!(address), json!(block)]).await?;
        let count: U256 =
            serde_json::from_value(value).map_err(|e| LedgerError::decode(METHOD, e))?;
        count
            .try_as_u64()
            .ok_or_else(|| LedgerError::decode(METHOD, "count exceeds u64"))
    }

    /// `eth_sendRawTransaction`, returning the hash the ledger acknowledged.
    async fn send_raw_transaction(&self, signed: &SignedTransaction) -> Result<Hash, LedgerError> {
        const METHOD: &str = "eth_sendRawTransaction";
        let value = self.send(METHOD, vec![json!(signed.raw_hex())]).await?;
        serde_json::from_value(value).map_err(|e| LedgerError::decode(METHOD, e))
    }
}

/// The deployed execution manager contract.
#[async_trait]
pub trait ExecutionManager: Send + Sync {
    /// Fixed for the lifetime of the node.
    fn address(&self) -> Address;

    /// Inner address holding the code of an OVM contract.
    async fn code_contract_address(&self, ovm_address: Address) -> GatewayResult<Address>;

    async fn ovm_contract_nonce(&self, address: Address) -> GatewayResult<U256>;

    /// Record `outer → inner`; returns the hash of the bookkeeping transaction.
    async fn map_transaction_hash(&self, outer: Hash, inner: Hash) -> GatewayResult<Hash>;

    async fn internal_transaction_hash(&self, outer: Hash) -> GatewayResult<Hash>;

    /// Bump the OVM nonce of `address` by one; returns the bookkeeping transaction hash.
    async fn increment_nonce(&self, address: Address) -> GatewayResult<Hash>;
}

/// Signs inner transactions as the node wallet.
pub trait TransactionSigner: Send + Sync {
    fn address(&self) -> Address;

    fn sign(&self, tx: &InnerTransaction) -> GatewayResult<SignedTransaction>;
}

/// Rewrites an inner receipt into its outer form.
pub trait ReceiptTranslator: Send + Sync {
    fn translate(&self, receipt: TransactionReceipt) -> TransactionReceipt;
}
