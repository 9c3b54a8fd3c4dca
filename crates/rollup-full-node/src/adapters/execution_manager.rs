//! Execution manager reached through the ledger node.
//!
//! Views are `eth_call`s from the node wallet. Writes are legacy transactions
//! signed by the node wallet and submitted with `eth_sendRawTransaction`; they
//! consume wallet nonces, which is why the send path reserves a slot for the
//! hash-mapping write ahead of each inner transaction.

use alloy_sol_types::SolCall;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use crate::domain::error::{GatewayResult, LedgerError};
use crate::domain::transaction::{InnerTransaction, LegacyTransaction};
use crate::domain::types::{Address, BlockTag, Bytes, Hash, U256};
use crate::ports::{ExecutionManager, LedgerClient, TransactionSigner};
use crate::translator::interface::{
    from_sol_address, from_sol_uint, from_word, to_sol_address, to_word, IExecutionManager,
};

pub struct ContractExecutionManager {
    ledger: Arc<dyn LedgerClient>,
    signer: Arc<dyn TransactionSigner>,
    address: Address,
    chain_id: u64,
    write_gas_limit: u64,
}

impl ContractExecutionManager {
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        signer: Arc<dyn TransactionSigner>,
        address: Address,
        chain_id: u64,
        write_gas_limit: u64,
    ) -> Self {
        Self {
            ledger,
            signer,
            address,
            chain_id,
            write_gas_limit,
        }
    }

    async fn view<C: SolCall>(&self, call: C) -> GatewayResult<C::Return> {
        let data = Bytes(call.abi_encode());
        let result = self
            .ledger
            .send(
                "eth_call",
                vec![
                    json!({"from": self.signer.address(), "to": self.address, "data": data}),
                    json!(BlockTag::Latest),
                ],
            )
            .await?;

        let output: Bytes =
            serde_json::from_value(result).map_err(|e| LedgerError::decode(C::SIGNATURE, e))?;
        let decoded = C::abi_decode_returns(output.as_slice())
            .map_err(|e| LedgerError::decode(C::SIGNATURE, e))?;
        Ok(decoded)
    }

    async fn transact<C: SolCall>(&self, call: C) -> GatewayResult<Hash> {
        let nonce = self
            .ledger
            .transaction_count(self.signer.address(), BlockTag::Pending)
            .await?;

        let signed = self.signer.sign(&InnerTransaction {
            tx: LegacyTransaction {
                nonce,
                gas_price: U256::ZERO,
                gas_limit: U256::from(self.write_gas_limit),
                to: Some(self.address),
                value: U256::ZERO,
                data: call.abi_encode(),
            },
            chain_id: self.chain_id,
        })?;

        let hash = self.ledger.send_raw_transaction(&signed).await?;
        debug!(call = C::SIGNATURE, nonce, hash = ?hash, "Submitted execution manager write");
        Ok(hash)
    }
}

#[async_trait]
impl ExecutionManager for ContractExecutionManager {
    fn address(&self) -> Address {
        self.address
    }

    async fn code_contract_address(&self, ovm_address: Address) -> GatewayResult<Address> {
        let code = self
            .view(IExecutionManager::getCodeContractAddressCall {
                ovmContractAddress: to_sol_address(ovm_address),
            })
            .await?;
        Ok(from_sol_address(code))
    }

    async fn ovm_contract_nonce(&self, address: Address) -> GatewayResult<U256> {
        let nonce = self
            .view(IExecutionManager::getOvmContractNonceCall {
                ovmContractAddress: to_sol_address(address),
            })
            .await?;
        Ok(from_sol_uint(nonce))
    }

    async fn map_transaction_hash(&self, outer: Hash, inner: Hash) -> GatewayResult<Hash> {
        self.transact(
            IExecutionManager::mapOvmTransactionHashToInternalTransactionHashCall {
                ovmTxHash: to_word(outer),
                internalTxHash: to_word(inner),
            },
        )
        .await
    }

    async fn internal_transaction_hash(&self, outer: Hash) -> GatewayResult<Hash> {
        let inner = self
            .view(IExecutionManager::getInternalTransactionHashCall {
                ovmTxHash: to_word(outer),
            })
            .await?;
        Ok(from_word(inner))
    }

    async fn increment_nonce(&self, address: Address) -> GatewayResult<Hash> {
        self.transact(IExecutionManager::incrementNonceCall {
            eoa: to_sol_address(address),
        })
        .await
    }
}
