//! Typed request and response variants.
//!
//! Untyped JSON parameters are checked against the method's arity rule and
//! decoded here, so handlers only ever see well-formed inputs.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::error::{GatewayError, GatewayResult};
use super::methods::Web3Method;
use super::types::{
    Address, BlockId, Bytes, CallRequest, Filter, Hash, TransactionReceipt, U256,
};

/// One decoded RPC call.
#[derive(Debug, Clone)]
pub enum Web3Request {
    BlockNumber,
    Call { call: CallRequest, block: BlockId },
    EstimateGas { call: CallRequest, block: BlockId },
    GasPrice,
    GetBlockByNumber { block: BlockId, full_transactions: bool },
    GetBlockByHash { hash: Hash, full_transactions: bool },
    GetCode { address: Address, block: BlockId },
    GetExecutionManagerAddress,
    GetLogs { filter: Filter },
    GetTransactionCount { address: Address, block: BlockId },
    GetTransactionReceipt { hash: Hash },
    SendRawTransaction { raw: Bytes },
    NetworkVersion,
    /// Debug methods forwarded as-is.
    Passthrough { method: Web3Method, params: Vec<Value> },
}

impl Web3Request {
    /// Apply the method's parameter rule, then decode each position.
    pub fn parse(method: Web3Method, params: Vec<Value>) -> GatewayResult<Self> {
        let params = method.info().params.apply(params)?;

        let request = match method {
            Web3Method::BlockNumber => Web3Request::BlockNumber,
            Web3Method::Call => Web3Request::Call {
                call: param(&params, 0)?,
                block: block_param(&params, 1)?,
            },
            Web3Method::EstimateGas => Web3Request::EstimateGas {
                call: param(&params, 0)?,
                block: block_param(&params, 1)?,
            },
            Web3Method::GasPrice => Web3Request::GasPrice,
            Web3Method::GetBlockByNumber => Web3Request::GetBlockByNumber {
                block: param(&params, 0)?,
                full_transactions: param(&params, 1)?,
            },
            Web3Method::GetBlockByHash => Web3Request::GetBlockByHash {
                hash: param(&params, 0)?,
                full_transactions: param(&params, 1)?,
            },
            Web3Method::GetCode => Web3Request::GetCode {
                address: param(&params, 0)?,
                block: block_param(&params, 1)?,
            },
            Web3Method::GetExecutionManagerAddress => Web3Request::GetExecutionManagerAddress,
            Web3Method::GetLogs => Web3Request::GetLogs {
                filter: param(&params, 0)?,
            },
            Web3Method::GetTransactionCount => Web3Request::GetTransactionCount {
                address: param(&params, 0)?,
                block: block_param(&params, 1)?,
            },
            Web3Method::GetTransactionReceipt => Web3Request::GetTransactionReceipt {
                hash: param(&params, 0)?,
            },
            Web3Method::SendRawTransaction => Web3Request::SendRawTransaction {
                raw: param(&params, 0)?,
            },
            Web3Method::NetworkVersion => Web3Request::NetworkVersion,
            Web3Method::Snapshot | Web3Method::Revert | Web3Method::Mine => {
                Web3Request::Passthrough { method, params }
            }
        };
        Ok(request)
    }

    pub fn method(&self) -> Web3Method {
        match self {
            Web3Request::BlockNumber => Web3Method::BlockNumber,
            Web3Request::Call { .. } => Web3Method::Call,
            Web3Request::EstimateGas { .. } => Web3Method::EstimateGas,
            Web3Request::GasPrice => Web3Method::GasPrice,
            Web3Request::GetBlockByNumber { .. } => Web3Method::GetBlockByNumber,
            Web3Request::GetBlockByHash { .. } => Web3Method::GetBlockByHash,
            Web3Request::GetCode { .. } => Web3Method::GetCode,
            Web3Request::GetExecutionManagerAddress => Web3Method::GetExecutionManagerAddress,
            Web3Request::GetLogs { .. } => Web3Method::GetLogs,
            Web3Request::GetTransactionCount { .. } => Web3Method::GetTransactionCount,
            Web3Request::GetTransactionReceipt { .. } => Web3Method::GetTransactionReceipt,
            Web3Request::SendRawTransaction { .. } => Web3Method::SendRawTransaction,
            Web3Request::NetworkVersion => Web3Method::NetworkVersion,
            Web3Request::Passthrough { method, .. } => *method,
        }
    }
}

/// Result of one RPC call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Web3Response {
    Quantity(U256),
    Data(Bytes),
    Hash(Hash),
    Address(Address),
    Text(String),
    Receipt(Option<TransactionReceipt>),
    /// Ledger value returned without translation.
    Raw(Value),
}

impl Web3Response {
    pub fn into_value(self) -> GatewayResult<Value> {
        match self {
            Web3Response::Raw(value) => Ok(value),
            other => serde_json::to_value(other)
                .map_err(|e| GatewayError::Serialization(e.to_string())),
        }
    }
}

fn param<T: DeserializeOwned>(params: &[Value], index: usize) -> GatewayResult<T> {
    let value = params.get(index).cloned().unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|e| GatewayError::InvalidParameter {
        index,
        reason: e.to_string(),
    })
}

/// A trailing block parameter given as JSON `null` means the default tag.
fn block_param(params: &[Value], index: usize) -> GatewayResult<BlockId> {
    param::<Option<BlockId>>(params, index).map(Option::unwrap_or_default)
}
