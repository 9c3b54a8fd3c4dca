//! In-memory ledger node with an execution manager double.
//!
//! Wallet transactions are decoded from their RLP and ABI call data, so the
//! node under test is exercised through the same bytes a real ledger sees.

#![allow(dead_code)]

use alloy_primitives::U256 as SolU256;
use alloy_sol_types::{sol, SolCall, SolEvent, SolInterface, SolValue};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rollup_full_node::adapters::{
    ContractExecutionManager, ExecutionManagerReceiptTranslator, LocalWallet,
};
use rollup_full_node::domain::config::ChainConfig;
use rollup_full_node::domain::transaction::{
    keccak256, InnerTransaction, LegacyTransaction, OuterTransaction,
};
use rollup_full_node::domain::types::{Address, Bytes, Hash, U256};
use rollup_full_node::gate::OrderingGate;
use rollup_full_node::ports::{LedgerClient, TransactionSigner};
use rollup_full_node::rpc::NodeComponents;
use rollup_full_node::translator::interface::{
    from_sol_address, from_word, to_sol_address, to_word, IExecutionManager,
};
use rollup_full_node::{LedgerError, RequestDispatcher};

pub const EM: Address = Address::repeat_byte(0xe1);
pub const CHAIN_ID: u64 = 108;
/// Node wallet.
pub const NODE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
/// Client signing outer transactions.
pub const CLIENT_KEY: &str = "6060606060606060606060606060606060606060606060606060606060606060";

sol! {
    interface SimpleStorage {
        function setStorage(bytes32 key, bytes32 value) external;
        function getStorage(bytes32 key) external view returns (bytes32);
        event StorageSet(bytes32 key, bytes32 value);
    }
}

use IExecutionManager::IExecutionManagerCalls;

const REVERT_MESSAGE: &str = "VM Exception while processing transaction: revert";

#[derive(Debug, Clone, PartialEq)]
pub enum ChainEvent {
    Mapped { outer: Hash, inner: Hash },
    Forwarded { hash: Hash, nonce: u64 },
    NonceIncremented(Address),
}

#[derive(Default)]
struct ChainState {
    wallet_nonce: u64,
    block: u64,
    mappings: HashMap<Hash, Hash>,
    ovm_nonces: HashMap<Address, u64>,
    storage: HashMap<(Address, Hash), Hash>,
    receipts: HashMap<Hash, Value>,
    events: Vec<ChainEvent>,
    accepted_nonces: Vec<u64>,
    requests: Vec<(String, Vec<Value>)>,
}

#[derive(Default)]
pub struct MockChain {
    state: Mutex<ChainState>,
    reject_client_calls: AtomicBool,
    echo_wrong_hash: AtomicBool,
}

/// Inner address holding the code of an OVM contract.
pub fn code_address(ovm: Address) -> Address {
    Address::from_slice(&keccak256(ovm.as_bytes())[12..])
}

fn rpc_error(code: i32, message: impl Into<String>) -> LedgerError {
    LedgerError::Rpc {
        code,
        message: message.into(),
        data: None,
    }
}

fn bad_params(e: impl std::fmt::Display) -> LedgerError {
    rpc_error(-32602, e.to_string())
}

impl MockChain {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reject_client_calls(&self, reject: bool) {
        self.reject_client_calls.store(reject, Ordering::SeqCst);
    }

    pub fn echo_wrong_hash(&self, wrong: bool) {
        self.echo_wrong_hash.store(wrong, Ordering::SeqCst);
    }

    pub fn events(&self) -> Vec<ChainEvent> {
        self.state.lock().events.clone()
    }

    pub fn accepted_nonces(&self) -> Vec<u64> {
        self.state.lock().accepted_nonces.clone()
    }

    pub fn ovm_nonce(&self, address: Address) -> u64 {
        self.state.lock().ovm_nonces.get(&address).copied().unwrap_or(0)
    }

    pub fn mapping(&self, outer: Hash) -> Option<Hash> {
        self.state.lock().mappings.get(&outer).copied()
    }

    /// Every request with the given method, in arrival order.
    pub fn requests(&self, method: &str) -> Vec<Vec<Value>> {
        self.state
            .lock()
            .requests
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, p)| p.clone())
            .collect()
    }

    fn submit(&self, params: &[Value]) -> Result<Value, LedgerError> {
        let raw: Bytes = serde_json::from_value(params[0].clone()).map_err(bad_params)?;
        let tx = OuterTransaction::decode(raw.as_slice()).map_err(bad_params)?;
        let hash = keccak256(raw.as_slice());

        let mut state = self.state.lock();
        if tx.tx.nonce != state.wallet_nonce {
            return Err(rpc_error(
                -32000,
                format!("nonce mismatch: expected {}, got {}", state.wallet_nonce, tx.tx.nonce),
            ));
        }
        if tx.tx.to != Some(EM) || tx.tx.data.len() < 4 {
            return Err(rpc_error(-32000, "not an execution manager call"));
        }

        let call = IExecutionManagerCalls::abi_decode(&tx.tx.data).map_err(bad_params)?;
        match call {
            IExecutionManagerCalls::mapOvmTransactionHashToInternalTransactionHash(map) => {
                let (outer, inner) = (from_word(map.ovmTxHash), from_word(map.internalTxHash));
                state.mappings.insert(outer, inner);
                state.events.push(ChainEvent::Mapped { outer, inner });
            }
            IExecutionManagerCalls::incrementNonce(increment) => {
                let address = from_sol_address(increment.eoa);
                *state.ovm_nonces.entry(address).or_default() += 1;
                state.events.push(ChainEvent::NonceIncremented(address));
            }
            IExecutionManagerCalls::executeEOACall(eoa_call) => {
                if self.reject_client_calls.load(Ordering::SeqCst) {
                    return Err(rpc_error(-32000, REVERT_MESSAGE));
                }
                let entrypoint = from_sol_address(eoa_call.ovmEntrypoint);
                let active = IExecutionManager::ActiveContract {
                    activeContract: eoa_call.ovmEntrypoint,
                };
                let mut logs = vec![json!({
                    "address": EM,
                    "topics": [from_word(IExecutionManager::ActiveContract::SIGNATURE_HASH)],
                    "data": Bytes(active.encode_data()),
                    "logIndex": "0x0",
                })];
                if let Ok(set) = SimpleStorage::setStorageCall::abi_decode(&eoa_call.callBytes) {
                    let (key, value) = (from_word(set.key), from_word(set.value));
                    state.storage.insert((entrypoint, key), value);
                    logs.push(json!({
                        "address": code_address(entrypoint),
                        "topics": [storage_set_topic()],
                        "data": Bytes([key.as_bytes(), value.as_bytes()].concat()),
                        "logIndex": "0x1",
                    }));
                }

                let block = state.block + 1;
                state.receipts.insert(
                    hash,
                    json!({
                        "transactionHash": hash,
                        "blockNumber": format!("0x{:x}", block),
                        "status": "0x1",
                        "contractAddress": null,
                        "logs": logs,
                    }),
                );
                state.events.push(ChainEvent::Forwarded {
                    hash,
                    nonce: tx.tx.nonce,
                });
            }
            _ => return Err(rpc_error(-32000, "not a wallet write")),
        }

        state.wallet_nonce += 1;
        state.block += 1;
        state.accepted_nonces.push(tx.tx.nonce);

        let returned = if self.echo_wrong_hash.load(Ordering::SeqCst) {
            Hash::repeat_byte(0xee)
        } else {
            hash
        };
        Ok(json!(returned))
    }

    fn call(&self, params: &[Value]) -> Result<Value, LedgerError> {
        let data: Bytes = serde_json::from_value(params[0]["data"].clone()).map_err(bad_params)?;
        if data.0.len() < 4 {
            return Ok(json!("0x"));
        }
        let state = self.state.lock();

        let call = match IExecutionManagerCalls::abi_decode(data.as_slice()) {
            Ok(call) => call,
            Err(_) => return Ok(json!("0x")),
        };
        let output = match call {
            IExecutionManagerCalls::executeUnsignedEOACall(unsigned) => {
                let entrypoint = from_sol_address(unsigned.ovmEntrypoint);
                return match SimpleStorage::getStorageCall::abi_decode(&unsigned.callBytes) {
                    Ok(get) => {
                        let value = state
                            .storage
                            .get(&(entrypoint, from_word(get.key)))
                            .copied()
                            .unwrap_or_default();
                        Ok(json!(value))
                    }
                    Err(_) => Ok(json!("0x")),
                };
            }
            IExecutionManagerCalls::getCodeContractAddress(view) => {
                let ovm = from_sol_address(view.ovmContractAddress);
                to_sol_address(code_address(ovm)).abi_encode()
            }
            IExecutionManagerCalls::getOvmContractNonce(view) => {
                let address = from_sol_address(view.ovmContractAddress);
                let nonce = state.ovm_nonces.get(&address).copied().unwrap_or(0);
                SolU256::from(nonce).abi_encode()
            }
            IExecutionManagerCalls::getInternalTransactionHash(view) => {
                let inner = state
                    .mappings
                    .get(&from_word(view.ovmTxHash))
                    .copied()
                    .unwrap_or_default();
                to_word(inner).abi_encode()
            }
            _ => return Err(rpc_error(-32000, "unknown view")),
        };
        Ok(json!(Bytes(output)))
    }
}

#[async_trait]
impl LedgerClient for MockChain {
    async fn send(&self, method: &str, params: Vec<Value>) -> Result<Value, LedgerError> {
        // Let concurrent callers interleave at every round trip.
        tokio::task::yield_now().await;
        self.state
            .lock()
            .requests
            .push((method.to_string(), params.clone()));

        match method {
            "eth_blockNumber" => Ok(json!(format!("0x{:x}", self.state.lock().block))),
            "eth_getTransactionCount" => {
                Ok(json!(format!("0x{:x}", self.state.lock().wallet_nonce)))
            }
            "eth_sendRawTransaction" => self.submit(&params),
            "eth_call" => self.call(&params),
            "eth_estimateGas" => Ok(json!("0x5208")),
            "eth_getCode" => {
                let address: Address =
                    serde_json::from_value(params[0].clone()).map_err(bad_params)?;
                let known = self
                    .state
                    .lock()
                    .storage
                    .keys()
                    .any(|(ovm, _)| code_address(*ovm) == address);
                Ok(json!(if known { "0x6080604052" } else { "0x" }))
            }
            "eth_getTransactionReceipt" => {
                let hash: Hash = serde_json::from_value(params[0].clone()).map_err(bad_params)?;
                Ok(self
                    .state
                    .lock()
                    .receipts
                    .get(&hash)
                    .cloned()
                    .unwrap_or(Value::Null))
            }
            "eth_getBlockByNumber" | "eth_getBlockByHash" | "eth_getLogs" | "evm_snapshot"
            | "evm_revert" | "evm_mine" => Ok(json!({"method": method, "params": params})),
            other => Err(rpc_error(-32601, format!("Method {} not found", other))),
        }
    }
}

pub fn client_wallet() -> LocalWallet {
    LocalWallet::from_hex(CLIENT_KEY).unwrap()
}

/// Raw outer transaction signed by the client key.
pub fn signed_outer(nonce: u64, to: Option<Address>, data: Vec<u8>) -> Bytes {
    let signed = client_wallet()
        .sign(&InnerTransaction {
            tx: LegacyTransaction {
                nonce,
                gas_price: U256::ZERO,
                gas_limit: U256::from(5_000_000u64),
                to,
                value: U256::ZERO,
                data,
            },
            chain_id: CHAIN_ID,
        })
        .unwrap();
    Bytes(signed.raw)
}

pub fn set_storage_call(key: Hash, value: Hash) -> Vec<u8> {
    SimpleStorage::setStorageCall {
        key: to_word(key),
        value: to_word(value),
    }
    .abi_encode()
}

pub fn get_storage_call(key: Hash) -> Vec<u8> {
    SimpleStorage::getStorageCall { key: to_word(key) }.abi_encode()
}

pub fn storage_set_topic() -> Hash {
    from_word(SimpleStorage::StorageSet::SIGNATURE_HASH)
}

/// Full node wired to `chain` with the real execution manager adapter.
pub fn node(chain: Arc<MockChain>, gate: Arc<dyn OrderingGate>) -> RequestDispatcher {
    let wallet = Arc::new(LocalWallet::from_hex(NODE_KEY).unwrap());
    let chain_config = ChainConfig::default();
    let execution_manager = Arc::new(ContractExecutionManager::new(
        chain.clone(),
        wallet.clone(),
        EM,
        chain_config.chain_id,
        chain_config.write_gas_limit,
    ));
    RequestDispatcher::new(
        NodeComponents {
            ledger: chain,
            execution_manager,
            signer: wallet,
            receipts: Arc::new(ExecutionManagerReceiptTranslator::new(EM)),
            gate,
        },
        &chain_config,
    )
}
