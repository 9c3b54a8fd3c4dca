//! `eth_*` and `ovm_*` handlers.
//!
//! Reads are unsynchronized and go straight to the ledger or the execution
//! manager. `eth_sendRawTransaction` is the only write and runs under the
//! ordering gate.

use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, instrument, warn};

use crate::domain::error::{GatewayError, GatewayResult, LedgerError};
use crate::domain::types::{
    Address, BlockId, BlockTag, Bytes, CallRequest, Filter, Hash, TransactionReceipt, U256,
};
use crate::gate::OrderingGate;
use crate::ports::{ExecutionManager, LedgerClient, ReceiptTranslator, TransactionSigner};
use crate::registry::HashRegistry;
use crate::translator::{TransactionTranslator, CLIENT_QUEUE_ORIGIN, CLIENT_TIMESTAMP};

/// Ethereum RPC methods handler
pub struct EthRpc {
    translator: TransactionTranslator,
    ledger: Arc<dyn LedgerClient>,
    execution_manager: Arc<dyn ExecutionManager>,
    registry: HashRegistry,
    signer: Arc<dyn TransactionSigner>,
    receipts: Arc<dyn ReceiptTranslator>,
    gate: Arc<dyn OrderingGate>,
    gas_limit: u64,
}

impl EthRpc {
    pub fn new(
        translator: TransactionTranslator,
        ledger: Arc<dyn LedgerClient>,
        execution_manager: Arc<dyn ExecutionManager>,
        signer: Arc<dyn TransactionSigner>,
        receipts: Arc<dyn ReceiptTranslator>,
        gate: Arc<dyn OrderingGate>,
        gas_limit: u64,
    ) -> Self {
        Self {
            translator,
            registry: HashRegistry::new(Arc::clone(&execution_manager)),
            ledger,
            execution_manager,
            signer,
            receipts,
            gate,
            gas_limit,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // CHAIN INFO
    // ═══════════════════════════════════════════════════════════════════════

    /// eth_blockNumber - the ledger's own block height
    #[instrument(skip(self))]
    pub async fn block_number(&self) -> GatewayResult<Value> {
        let block = self.ledger.send("eth_blockNumber", vec![]).await?;
        debug!(block = %block, "Received block number");
        Ok(block)
    }

    /// eth_gasPrice - always zero
    pub async fn gas_price(&self) -> GatewayResult<U256> {
        Ok(U256::ZERO)
    }

    #[instrument(skip(self))]
    pub async fn get_block_by_number(
        &self,
        block: BlockId,
        full_transactions: bool,
    ) -> GatewayResult<Value> {
        Ok(self
            .ledger
            .send("eth_getBlockByNumber", vec![json!(block), json!(full_transactions)])
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn get_block_by_hash(&self, hash: Hash, full_transactions: bool) -> GatewayResult<Value> {
        Ok(self
            .ledger
            .send("eth_getBlockByHash", vec![json!(hash), json!(full_transactions)])
            .await?)
    }

    /// ovm_getExecutionManagerAddress
    pub async fn execution_manager_address(&self) -> GatewayResult<Address> {
        Ok(self.execution_manager.address())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // ACCOUNT STATE
    // ═══════════════════════════════════════════════════════════════════════

    /// eth_getCode - code of the contract backing an OVM address.
    ///
    /// Historical lookups are not supported; every block answers at latest.
    #[instrument(skip(self))]
    pub async fn get_code(&self, address: Address, block: BlockId) -> GatewayResult<Value> {
        if !block.is_latest() {
            warn!(block = %block, "No support for historical code lookups, answering at latest");
        }
        let code_address = self.execution_manager.code_contract_address(address).await?;
        let code = self
            .ledger
            .send("eth_getCode", vec![json!(code_address), json!(BlockTag::Latest)])
            .await?;
        debug!(address = ?address, code_address = ?code_address, "Resolved contract code");
        Ok(code)
    }

    /// eth_getTransactionCount - the execution manager's OVM nonce.
    #[instrument(skip(self))]
    pub async fn get_transaction_count(&self, address: Address, block: BlockId) -> GatewayResult<U256> {
        let nonce = self.execution_manager.ovm_contract_nonce(address).await?;
        debug!(address = ?address, block = %block, nonce = %nonce, "Received transaction count");
        Ok(nonce)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // EXECUTION
    // ═══════════════════════════════════════════════════════════════════════

    fn unsigned_call(&self, call: &CallRequest) -> Value {
        let data = self.translator.encode_unsigned_call(
            CLIENT_TIMESTAMP,
            CLIENT_QUEUE_ORIGIN,
            call.to,
            call.input_data(),
            call.from.unwrap_or_else(Address::zero),
        );
        json!({
            "from": Address::zero(),
            "to": self.translator.execution_manager(),
            "data": Bytes(data),
        })
    }

    /// eth_call - wrapped in `executeUnsignedEOACall`
    #[instrument(skip(self, call), fields(to = ?call.to))]
    pub async fn call(&self, call: CallRequest, block: BlockId) -> GatewayResult<Value> {
        let result = self
            .ledger
            .send("eth_call", vec![self.unsigned_call(&call), json!(block)])
            .await
            .inspect_err(|e| debug!(error = %e, "eth_call failed"))?;
        Ok(result)
    }

    /// eth_estimateGas - dry-runs the call on the ledger, then reports the configured limit.
    #[instrument(skip(self, call), fields(to = ?call.to))]
    pub async fn estimate_gas(&self, call: CallRequest, block: BlockId) -> GatewayResult<U256> {
        let estimate = self
            .ledger
            .send("eth_estimateGas", vec![self.unsigned_call(&call)])
            .await?;
        debug!(ledger_estimate = %estimate, reported = self.gas_limit, "Estimated gas");
        Ok(U256::from(self.gas_limit))
    }

    // ═══════════════════════════════════════════════════════════════════════
    // LOGS & RECEIPTS
    // ═══════════════════════════════════════════════════════════════════════

    #[instrument(skip(self))]
    pub async fn get_logs(&self, filter: Filter) -> GatewayResult<Value> {
        Ok(self.ledger.send("eth_getLogs", vec![json!(filter)]).await?)
    }

    /// eth_getTransactionReceipt - looked up by the inner hash the outer hash maps to.
    #[instrument(skip(self))]
    pub async fn get_transaction_receipt(&self, hash: Hash) -> GatewayResult<Option<TransactionReceipt>> {
        const METHOD: &str = "eth_getTransactionReceipt";
        let inner = self.registry.resolve(hash).await?;
        let value = self.ledger.send(METHOD, vec![json!(inner)]).await?;
        if value.is_null() {
            debug!(outer = ?hash, inner = ?inner, "No receipt yet");
            return Ok(None);
        }

        let receipt: TransactionReceipt =
            serde_json::from_value(value).map_err(|e| LedgerError::decode(METHOD, e))?;
        Ok(Some(self.receipts.translate(receipt)))
    }

    // ═══════════════════════════════════════════════════════════════════════
    // TRANSACTIONS
    // ═══════════════════════════════════════════════════════════════════════

    /// eth_sendRawTransaction
    ///
    /// Returns the outer hash. A ledger rejection of the inner transaction is
    /// not reported: the sender's OVM nonce is bumped once and the outer hash
    /// is still returned, so callers learn the outcome from the receipt.
    #[instrument(skip(self, raw), fields(size = raw.0.len()))]
    pub async fn send_raw_transaction(&self, raw: Bytes) -> GatewayResult<Hash> {
        let outer = self.translator.decode_outer_transaction(raw.as_slice())?;
        let outer_hash = outer.hash();
        debug!(outer = ?outer_hash, sender = ?outer.sender, nonce = outer.tx.nonce, "Decoded outer transaction");

        let _permit = self.gate.acquire(outer.sender).await;

        let count = self
            .ledger
            .transaction_count(self.signer.address(), BlockTag::Pending)
            .await?;
        let inner = self.translator.build_inner_transaction(&outer, count)?;
        let signed = self.signer.sign(&inner)?;

        self.registry.register_mapping(outer_hash, signed.hash).await?;

        match self.ledger.send_raw_transaction(&signed).await {
            Err(e) => {
                error!(
                    error = %e,
                    sender = ?outer.sender,
                    outer = ?outer_hash,
                    inner = ?signed.hash,
                    "Error executing transaction, incrementing sender nonce"
                );
                self.execution_manager.increment_nonce(outer.sender).await?;
                debug!(sender = ?outer.sender, "Nonce incremented");
                Ok(outer_hash)
            }
            Ok(returned) if returned != signed.hash => {
                error!(
                    outer = ?outer_hash,
                    computed = ?signed.hash,
                    returned = ?returned,
                    "Internal transaction hashes do not match"
                );
                Err(GatewayError::Consistency {
                    outer: outer_hash,
                    computed: signed.hash,
                    returned,
                })
            }
            Ok(_) => {
                debug!(outer = ?outer_hash, inner = ?signed.hash, "Completed raw transaction");
                Ok(outer_hash)
            }
        }
    }
}
