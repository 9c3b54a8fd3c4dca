//! Inner receipt → outer receipt.
//!
//! The ledger sees every client transaction as a call into the execution
//! manager, so its receipts name the execution manager and the code
//! contracts. The execution manager's own events tell us which OVM contract
//! was active, which one was created, and whether the wrapped call reverted.

use alloy_sol_types::SolEvent;
use serde_json::{json, Value};
use tracing::trace;

use crate::domain::types::{Address, Log, TransactionReceipt, U256};
use crate::ports::ReceiptTranslator;
use crate::translator::interface::{from_sol_address, to_word, IExecutionManager};

const STATUS_FAILED: &str = "0x0";
const LOG_INDEX: &str = "logIndex";

/// Default [`ReceiptTranslator`] keyed on the execution manager address.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionManagerReceiptTranslator {
    execution_manager: Address,
}

impl ExecutionManagerReceiptTranslator {
    pub fn new(execution_manager: Address) -> Self {
        Self { execution_manager }
    }

    fn decode<E: SolEvent>(log: &Log) -> Option<E> {
        E::decode_raw_log(log.topics.iter().copied().map(to_word), log.data.as_slice())
            .inspect_err(|e| trace!(event = E::SIGNATURE, error = %e, "Undecodable execution manager log"))
            .ok()
    }

    /// Shift a surviving log's block-wide index back over the dropped ones.
    fn shift_log_index(log: &mut Log, dropped: u64) {
        let Some(index) = log
            .rest
            .get(LOG_INDEX)
            .and_then(|v| serde_json::from_value::<U256>(v.clone()).ok())
            .and_then(|v| v.try_as_u64())
        else {
            return;
        };
        log.rest.insert(
            LOG_INDEX.to_string(),
            json!(U256::from(index.saturating_sub(dropped))),
        );
    }
}

impl ReceiptTranslator for ExecutionManagerReceiptTranslator {
    fn translate(&self, mut receipt: TransactionReceipt) -> TransactionReceipt {
        let mut active: Option<Address> = None;
        let mut reverted = false;
        let mut dropped = 0u64;
        let mut logs = Vec::with_capacity(receipt.logs.len());

        for mut log in std::mem::take(&mut receipt.logs) {
            if log.address != self.execution_manager {
                if let Some(ovm_address) = active {
                    log.address = ovm_address;
                }
                Self::shift_log_index(&mut log, dropped);
                logs.push(log);
                continue;
            }

            dropped += 1;
            match log.topics.first().copied().map(to_word) {
                Some(topic) if topic == IExecutionManager::ActiveContract::SIGNATURE_HASH => {
                    active = Self::decode::<IExecutionManager::ActiveContract>(&log)
                        .map(|event| from_sol_address(event.activeContract));
                }
                Some(topic) if topic == IExecutionManager::CreatedContract::SIGNATURE_HASH => {
                    if let Some(event) = Self::decode::<IExecutionManager::CreatedContract>(&log) {
                        receipt.contract_address = Some(from_sol_address(event.ovmContractAddress));
                    }
                }
                Some(topic) if topic == IExecutionManager::EOACallRevert::SIGNATURE_HASH => {
                    reverted = true
                }
                _ => trace!(topics = ?log.topics, "Dropping execution manager log"),
            }
        }
        receipt.logs = logs;

        if reverted {
            receipt
                .rest
                .insert("status".to_string(), Value::String(STATUS_FAILED.to_string()));
        }
        receipt
    }
}
