//! Method dispatch.
//!
//! `handle_request` is the single entry point used by the HTTP layer and by
//! embedders: method name and raw parameters in, JSON result out.

use serde_json::Value;
use tracing::{debug, error};

use crate::domain::config::ChainConfig;
use crate::domain::error::GatewayResult;
use crate::domain::methods::Web3Method;
use crate::domain::request::{Web3Request, Web3Response};
use crate::rpc::{NodeComponents, RpcHandlers};

pub struct RequestDispatcher {
    handlers: RpcHandlers,
}

impl RequestDispatcher {
    pub fn new(components: NodeComponents, chain: &ChainConfig) -> Self {
        Self {
            handlers: RpcHandlers::new(components, chain),
        }
    }

    /// Handle one call. Unknown methods fail with `UnsupportedMethod`, arity
    /// violations with `InvalidParameters`.
    pub async fn handle_request(&self, method: &str, params: Vec<Value>) -> GatewayResult<Value> {
        debug!(method, params = ?params, "Handling request");

        let web3_method: Web3Method = method.parse().inspect_err(|_| {
            error!(method, "Method is not supported by this node");
        })?;
        let request = Web3Request::parse(web3_method, params)?;
        let response = self.route(request).await?.into_value()?;

        debug!(method, result = %response, "Request completed");
        Ok(response)
    }

    async fn route(&self, request: Web3Request) -> GatewayResult<Web3Response> {
        let eth = &self.handlers.eth;
        let response = match request {
            Web3Request::BlockNumber => Web3Response::Raw(eth.block_number().await?),
            Web3Request::Call { call, block } => Web3Response::Raw(eth.call(call, block).await?),
            Web3Request::EstimateGas { call, block } => {
                Web3Response::Quantity(eth.estimate_gas(call, block).await?)
            }
            Web3Request::GasPrice => Web3Response::Quantity(eth.gas_price().await?),
            Web3Request::GetBlockByNumber {
                block,
                full_transactions,
            } => Web3Response::Raw(eth.get_block_by_number(block, full_transactions).await?),
            Web3Request::GetBlockByHash {
                hash,
                full_transactions,
            } => Web3Response::Raw(eth.get_block_by_hash(hash, full_transactions).await?),
            Web3Request::GetCode { address, block } => {
                Web3Response::Raw(eth.get_code(address, block).await?)
            }
            Web3Request::GetExecutionManagerAddress => {
                Web3Response::Address(eth.execution_manager_address().await?)
            }
            Web3Request::GetLogs { filter } => Web3Response::Raw(eth.get_logs(filter).await?),
            Web3Request::GetTransactionCount { address, block } => {
                Web3Response::Quantity(eth.get_transaction_count(address, block).await?)
            }
            Web3Request::GetTransactionReceipt { hash } => {
                Web3Response::Receipt(eth.get_transaction_receipt(hash).await?)
            }
            Web3Request::SendRawTransaction { raw } => {
                Web3Response::Hash(eth.send_raw_transaction(raw).await?)
            }
            Web3Request::NetworkVersion => Web3Response::Text(self.handlers.net.version().await?),
            Web3Request::Passthrough { method, params } => {
                Web3Response::Raw(self.handlers.evm.forward(method, params).await?)
            }
        };
        Ok(response)
    }
}
