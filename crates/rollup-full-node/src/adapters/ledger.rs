//! HTTP JSON-RPC client for the underlying ledger node.

use async_trait::async_trait;
use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::params::ArrayParams;
use jsonrpsee::core::ClientError;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use serde_json::Value;
use tracing::trace;

use crate::domain::error::LedgerError;
use crate::ports::LedgerClient;

/// [`LedgerClient`] over a single shared HTTP connection pool.
#[derive(Debug, Clone)]
pub struct JsonRpcLedger {
    inner: HttpClient,
    url: String,
}

impl JsonRpcLedger {
    pub fn new(url: &str) -> Result<Self, LedgerError> {
        let inner = HttpClientBuilder::default()
            .build(url)
            .map_err(|e| LedgerError::Transport(e.to_string()))?;

        Ok(Self {
            inner,
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl LedgerClient for JsonRpcLedger {
    async fn send(&self, method: &str, params: Vec<Value>) -> Result<Value, LedgerError> {
        let mut rpc_params = ArrayParams::new();
        for param in params {
            rpc_params
                .insert(param)
                .map_err(|e| LedgerError::Transport(e.to_string()))?;
        }

        trace!(method, "Forwarding to ledger");
        self.inner
            .request::<Value, _>(method, rpc_params)
            .await
            .map_err(into_ledger_error)
    }
}

fn into_ledger_error(err: ClientError) -> LedgerError {
    match err {
        ClientError::Call(object) => LedgerError::Rpc {
            code: object.code(),
            message: object.message().to_string(),
            data: object
                .data()
                .and_then(|raw| serde_json::from_str(raw.get()).ok()),
        },
        other => LedgerError::Transport(other.to_string()),
    }
}
