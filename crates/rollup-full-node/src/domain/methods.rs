//! Supported methods and their parameter rules.
//!
//! The table is data: each [`Web3Method`] carries its arity and optional trailing
//! default, and [`assert_parameters`] is the only place those rules are applied.

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use super::error::{GatewayError, GatewayResult};

/// Block parameter default used by the read methods.
pub const LATEST_BLOCK: &str = "latest";

/// Closed set of RPC methods the node answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Web3Method {
    BlockNumber,
    Call,
    EstimateGas,
    GasPrice,
    GetBlockByNumber,
    GetBlockByHash,
    GetCode,
    GetExecutionManagerAddress,
    GetLogs,
    GetTransactionCount,
    GetTransactionReceipt,
    SendRawTransaction,
    NetworkVersion,
    Snapshot,
    Revert,
    Mine,
}

impl Web3Method {
    pub const ALL: [Web3Method; 16] = [
        Web3Method::BlockNumber,
        Web3Method::Call,
        Web3Method::EstimateGas,
        Web3Method::GasPrice,
        Web3Method::GetBlockByNumber,
        Web3Method::GetBlockByHash,
        Web3Method::GetCode,
        Web3Method::GetExecutionManagerAddress,
        Web3Method::GetLogs,
        Web3Method::GetTransactionCount,
        Web3Method::GetTransactionReceipt,
        Web3Method::SendRawTransaction,
        Web3Method::NetworkVersion,
        Web3Method::Snapshot,
        Web3Method::Revert,
        Web3Method::Mine,
    ];

    /// Wire identifier, bit-exact.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Web3Method::BlockNumber => "eth_blockNumber",
            Web3Method::Call => "eth_call",
            Web3Method::EstimateGas => "eth_estimateGas",
            Web3Method::GasPrice => "eth_gasPrice",
            Web3Method::GetBlockByNumber => "eth_getBlockByNumber",
            Web3Method::GetBlockByHash => "eth_getBlockByHash",
            Web3Method::GetCode => "eth_getCode",
            Web3Method::GetExecutionManagerAddress => "ovm_getExecutionManagerAddress",
            Web3Method::GetLogs => "eth_getLogs",
            Web3Method::GetTransactionCount => "eth_getTransactionCount",
            Web3Method::GetTransactionReceipt => "eth_getTransactionReceipt",
            Web3Method::SendRawTransaction => "eth_sendRawTransaction",
            Web3Method::NetworkVersion => "net_version",
            Web3Method::Snapshot => "evm_snapshot",
            Web3Method::Revert => "evm_revert",
            Web3Method::Mine => "evm_mine",
        }
    }

    pub fn info(&self) -> &'static MethodInfo {
        // every variant is registered below
        &METHOD_TABLE[*self as usize]
    }
}

impl fmt::Display for Web3Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Web3Method {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        get_method_info(s)
            .map(|info| info.method)
            .ok_or_else(|| GatewayError::UnsupportedMethod(s.to_string()))
    }
}

/// Parameter arity and trailing default for one method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamRule {
    /// `None` means the method takes whatever it is given.
    pub arity: Option<usize>,
    pub default: Option<&'static str>,
}

impl ParamRule {
    const fn exact(arity: usize) -> Self {
        Self {
            arity: Some(arity),
            default: None,
        }
    }

    const fn with_default(arity: usize, default: &'static str) -> Self {
        Self {
            arity: Some(arity),
            default: Some(default),
        }
    }

    const fn unchecked() -> Self {
        Self {
            arity: None,
            default: None,
        }
    }

    /// Apply this rule to an incoming parameter list.
    pub fn apply(&self, params: Vec<Value>) -> GatewayResult<Vec<Value>> {
        match self.arity {
            Some(expected) => assert_parameters(
                params,
                expected,
                self.default.map(|d| Value::String(d.to_string())),
            ),
            None => Ok(params),
        }
    }
}

/// Method metadata
#[derive(Debug, Clone)]
pub struct MethodInfo {
    pub method: Web3Method,
    pub params: ParamRule,
}

impl MethodInfo {
    const fn new(method: Web3Method, params: ParamRule) -> Self {
        Self { method, params }
    }

    pub const fn name(&self) -> &'static str {
        self.method.as_str()
    }
}

/// Indexed by `Web3Method as usize`; order must follow the enum.
static METHOD_TABLE: [MethodInfo; 16] = [
    MethodInfo::new(Web3Method::BlockNumber, ParamRule::exact(0)),
    MethodInfo::new(Web3Method::Call, ParamRule::with_default(2, LATEST_BLOCK)),
    MethodInfo::new(Web3Method::EstimateGas, ParamRule::with_default(2, LATEST_BLOCK)),
    MethodInfo::new(Web3Method::GasPrice, ParamRule::exact(0)),
    MethodInfo::new(Web3Method::GetBlockByNumber, ParamRule::exact(2)),
    MethodInfo::new(Web3Method::GetBlockByHash, ParamRule::exact(2)),
    MethodInfo::new(Web3Method::GetCode, ParamRule::with_default(2, LATEST_BLOCK)),
    MethodInfo::new(Web3Method::GetExecutionManagerAddress, ParamRule::exact(0)),
    MethodInfo::new(Web3Method::GetLogs, ParamRule::exact(1)),
    MethodInfo::new(Web3Method::GetTransactionCount, ParamRule::with_default(2, LATEST_BLOCK)),
    MethodInfo::new(Web3Method::GetTransactionReceipt, ParamRule::exact(1)),
    MethodInfo::new(Web3Method::SendRawTransaction, ParamRule::exact(1)),
    MethodInfo::new(Web3Method::NetworkVersion, ParamRule::exact(0)),
    MethodInfo::new(Web3Method::Snapshot, ParamRule::exact(0)),
    MethodInfo::new(Web3Method::Revert, ParamRule::exact(1)),
    MethodInfo::new(Web3Method::Mine, ParamRule::unchecked()),
];

/// Method registry keyed by wire identifier
pub static METHOD_REGISTRY: LazyLock<HashMap<&'static str, &'static MethodInfo>> =
    LazyLock::new(|| {
        METHOD_TABLE
            .iter()
            .map(|info| (info.name(), info))
            .collect()
    });

pub fn get_method_info(method: &str) -> Option<&'static MethodInfo> {
    METHOD_REGISTRY.get(method).copied()
}

pub fn is_method_supported(method: &str) -> bool {
    METHOD_REGISTRY.contains_key(method)
}

/// Check a parameter list against an expected count.
///
/// Exactly `expected` values pass unchanged. One short passes with `default`
/// appended when a default exists. Anything else is `InvalidParameters`.
pub fn assert_parameters(
    mut params: Vec<Value>,
    expected: usize,
    default: Option<Value>,
) -> GatewayResult<Vec<Value>> {
    let received = params.len();
    if received == expected {
        return Ok(params);
    }
    match default {
        Some(default) if received + 1 == expected => {
            params.push(default);
            Ok(params)
        }
        _ => Err(GatewayError::InvalidParameters { expected, received }),
    }
}
