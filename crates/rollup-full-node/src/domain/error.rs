//! Error taxonomy of the full node and its JSON-RPC 2.0 wire mapping.
//!
//! Library code returns [`GatewayError`]; the HTTP layer turns it into an
//! [`ApiError`] object with one of the [`codes`].

use serde::Serialize;
use std::fmt;

use super::types::Hash;

/// Standard JSON-RPC 2.0 error codes
pub mod codes {
    // JSON-RPC 2.0 standard errors (-32700 to -32600)
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;

    // Server errors (-32000 to -32099)
    pub const SERVER_ERROR: i32 = -32000;
    pub const TRANSACTION_REJECTED: i32 = -32003;
    pub const LIMIT_EXCEEDED: i32 = -32005;
}

/// JSON-RPC error object
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Parse error - invalid JSON
    pub fn parse_error(details: impl Into<String>) -> Self {
        Self::new(
            codes::PARSE_ERROR,
            format!("Parse error: {}", details.into()),
        )
    }

    /// Invalid request - not a valid JSON-RPC request
    pub fn invalid_request(details: impl Into<String>) -> Self {
        Self::new(
            codes::INVALID_REQUEST,
            format!("Invalid request: {}", details.into()),
        )
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(
            codes::METHOD_NOT_FOUND,
            format!("Method not found: {}", method),
        )
    }

    pub fn invalid_params(details: impl Into<String>) -> Self {
        Self::new(codes::INVALID_PARAMS, details.into())
    }

    pub fn internal(details: impl Into<String>) -> Self {
        Self::new(
            codes::INTERNAL_ERROR,
            format!("Internal error: {}", details.into()),
        )
    }

    pub fn transaction_rejected(reason: impl Into<String>) -> Self {
        Self::new(
            codes::TRANSACTION_REJECTED,
            format!("Transaction rejected: {}", reason.into()),
        )
    }

    /// Limit exceeded (batch size, body size)
    pub fn limit_exceeded(limit: impl Into<String>) -> Self {
        Self::new(
            codes::LIMIT_EXCEEDED,
            format!("Limit exceeded: {}", limit.into()),
        )
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl Serialize for ApiError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("ApiError", 3)?;
        state.serialize_field("code", &self.code)?;
        state.serialize_field("message", &self.message)?;
        if let Some(ref data) = self.data {
            state.serialize_field("data", data)?;
        }
        state.end()
    }
}

/// Failure to turn a raw outer transaction into an inner one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TranslationError {
    #[error("empty transaction")]
    Empty,

    #[error("transaction too large: {size} bytes (max {max})")]
    TooLarge { size: usize, max: usize },

    #[error("invalid RLP encoding: {0}")]
    InvalidRlp(String),

    #[error("unsupported transaction type 0x{0:02x}, only legacy transactions are accepted")]
    UnsupportedType(u8),

    /// The externally-owned-account signature marker is absent.
    #[error("Non-EOA transaction detected")]
    Unsigned,

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Sending to Zero Address disallowed")]
    ZeroAddressDestination,

    #[error("{field} out of range")]
    OutOfRange { field: &'static str },
}

/// Failure reported by, or while talking to, the underlying ledger node.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LedgerError {
    /// The node answered with a JSON-RPC error object.
    #[error("{message}")]
    Rpc {
        code: i32,
        message: String,
        data: Option<serde_json::Value>,
    },

    #[error("ledger transport error: {0}")]
    Transport(String),

    #[error("unexpected result for {method}: {reason}")]
    Decode { method: String, reason: String },
}

impl LedgerError {
    pub fn decode(method: impl Into<String>, reason: impl fmt::Display) -> Self {
        LedgerError::Decode {
            method: method.into(),
            reason: reason.to_string(),
        }
    }
}

/// Errors surfaced by request handling.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GatewayError {
    /// Parameter count did not match the method's arity rule.
    #[error("Expected {expected} parameters but received {received}.")]
    InvalidParameters { expected: usize, received: usize },

    /// A parameter had the right position but the wrong shape.
    #[error("invalid parameter at index {index}: {reason}")]
    InvalidParameter { index: usize, reason: String },

    #[error("Method not found: {0}")]
    UnsupportedMethod(String),

    #[error(transparent)]
    Translation(#[from] TranslationError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// The ledger acknowledged a different inner hash than the one computed locally.
    #[error(
        "inner transaction hash mismatch for outer {outer:?}: computed {computed:?}, ledger returned {returned:?}"
    )]
    Consistency {
        outer: Hash,
        computed: Hash,
        returned: Hash,
    },

    #[error("signing failed: {0}")]
    Signer(String),

    /// A handler result could not be rendered as JSON.
    #[error("failed to serialize result: {0}")]
    Serialization(String),

    #[error("server bind error: {0}")]
    Bind(String),
}

/// Result type for request handling
pub type GatewayResult<T> = Result<T, GatewayError>;

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::InvalidParameters { .. } | GatewayError::InvalidParameter { .. } => {
                ApiError::invalid_params(err.to_string())
            }
            GatewayError::UnsupportedMethod(ref method) => ApiError::method_not_found(method),
            GatewayError::Translation(e) => ApiError::transaction_rejected(e.to_string()),
            GatewayError::Ledger(LedgerError::Rpc {
                code,
                message,
                data,
            }) => ApiError {
                code,
                message,
                data,
            },
            GatewayError::Ledger(e) => ApiError::new(codes::SERVER_ERROR, e.to_string()),
            GatewayError::Consistency { .. }
            | GatewayError::Signer(_)
            | GatewayError::Serialization(_)
            | GatewayError::Bind(_) => ApiError::internal(err.to_string()),
        }
    }
}
