//! Node configuration with validation.
//!
//! Every field can be set from the environment (see [`GatewayConfig::from_env`]).
//! Unset variables keep their defaults; malformed ones are errors.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use super::types::Address;

pub const ENV_SERVER_HOST: &str = "L2_RPC_SERVER_HOST";
pub const ENV_SERVER_PORT: &str = "L2_RPC_SERVER_PORT";
pub const ENV_LEDGER_URL: &str = "L2_NODE_WEB3_URL";
pub const ENV_WALLET_PRIVATE_KEY: &str = "L2_WALLET_PRIVATE_KEY";
pub const ENV_EXECUTION_MANAGER_ADDRESS: &str = "L2_EXECUTION_MANAGER_ADDRESS";
pub const ENV_OPCODE_WHITELIST_MASK: &str = "OPCODE_WHITELIST_MASK";
pub const ENV_CHAIN_ID: &str = "L2_CHAIN_ID";
pub const ENV_GAS_LIMIT: &str = "L2_GAS_LIMIT";
pub const ENV_WRITE_GAS_LIMIT: &str = "L2_WRITE_GAS_LIMIT";
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
pub const ENV_JSON_LOGS: &str = "JSON_LOGS";

/// Rollup chain id
pub const DEFAULT_CHAIN_ID: u64 = 108;
/// Gas limit reported by `eth_estimateGas`
pub const DEFAULT_GAS_LIMIT: u64 = 1_000_000_000;
/// Gas for the node's own execution-manager writes
pub const DEFAULT_WRITE_GAS_LIMIT: u64 = 9_000_000;

/// Main node configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub server: ServerConfig,
    pub ledger: LedgerConfig,
    pub wallet: WalletConfig,
    pub execution_manager: ExecutionManagerConfig,
    pub chain: ChainConfig,
    pub logging: LogConfig,
}

impl GatewayConfig {
    /// Build configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = parse_var(&lookup, ENV_SERVER_HOST)? {
            config.server.host = host;
        }
        if let Some(port) = parse_var(&lookup, ENV_SERVER_PORT)? {
            config.server.port = port;
        }
        if let Some(url) = lookup(ENV_LEDGER_URL) {
            config.ledger.url = url;
        }
        if let Some(key) = lookup(ENV_WALLET_PRIVATE_KEY) {
            config.wallet.private_key = Some(key);
        }
        if let Some(address) = lookup(ENV_EXECUTION_MANAGER_ADDRESS) {
            let parsed = parse_address(&address).ok_or_else(|| ConfigError::Invalid {
                key: ENV_EXECUTION_MANAGER_ADDRESS,
                reason: format!("{:?} is not a 20-byte hex address", address),
            })?;
            config.execution_manager.address = Some(parsed);
        }
        if let Some(mask) = lookup(ENV_OPCODE_WHITELIST_MASK) {
            config.execution_manager.opcode_whitelist_mask = Some(mask);
        }
        if let Some(chain_id) = parse_var(&lookup, ENV_CHAIN_ID)? {
            config.chain.chain_id = chain_id;
        }
        if let Some(gas_limit) = parse_var(&lookup, ENV_GAS_LIMIT)? {
            config.chain.gas_limit = gas_limit;
        }
        if let Some(gas_limit) = parse_var(&lookup, ENV_WRITE_GAS_LIMIT)? {
            config.chain.write_gas_limit = gas_limit;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            config.logging.level = level;
        }
        if let Some(json) = parse_var(&lookup, ENV_JSON_LOGS)? {
            config.logging.json = json;
        }

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid {
                key: ENV_SERVER_PORT,
                reason: "port cannot be 0".into(),
            });
        }
        if self.server.max_batch_size == 0 || self.server.max_request_size == 0 {
            return Err(ConfigError::Invalid {
                key: "server",
                reason: "request limits cannot be 0".into(),
            });
        }

        if self.ledger.url.is_empty() {
            return Err(ConfigError::Missing(ENV_LEDGER_URL));
        }

        let key = self
            .wallet
            .private_key
            .as_deref()
            .ok_or(ConfigError::Missing(ENV_WALLET_PRIVATE_KEY))?;
        let key = key.strip_prefix("0x").unwrap_or(key);
        if key.len() != 64 || hex::decode(key).is_err() {
            return Err(ConfigError::Invalid {
                key: ENV_WALLET_PRIVATE_KEY,
                reason: "expected 32 hex-encoded bytes".into(),
            });
        }

        match self.execution_manager.address {
            None => return Err(ConfigError::Missing(ENV_EXECUTION_MANAGER_ADDRESS)),
            Some(address) if address.is_zero() => {
                return Err(ConfigError::Invalid {
                    key: ENV_EXECUTION_MANAGER_ADDRESS,
                    reason: "zero address".into(),
                })
            }
            Some(_) => {}
        }

        if self.chain.chain_id == 0 {
            return Err(ConfigError::Invalid {
                key: ENV_CHAIN_ID,
                reason: "chain id cannot be 0".into(),
            });
        }
        if self.chain.gas_limit == 0 || self.chain.write_gas_limit == 0 {
            return Err(ConfigError::Invalid {
                key: ENV_GAS_LIMIT,
                reason: "gas limits cannot be 0".into(),
            });
        }

        Ok(())
    }
}

fn parse_address(value: &str) -> Option<Address> {
    let value = value.trim();
    let bytes = hex::decode(value.strip_prefix("0x").unwrap_or(value)).ok()?;
    (bytes.len() == 20).then(|| Address::from_slice(&bytes))
}

fn parse_var<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    lookup(key)
        .map(|value| {
            value.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
                key,
                reason: format!("{:?}: {}", value, e),
            })
        })
        .transpose()
}

/// JSON-RPC server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: IpAddr,
    /// Port (default: 8545)
    pub port: u16,
    /// Maximum request body in bytes
    pub max_request_size: usize,
    /// Maximum number of calls in one batch
    pub max_batch_size: usize,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 8545,
            max_request_size: 5 * 1024 * 1024,
            max_batch_size: 100,
        }
    }
}

/// Underlying ledger node connection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub url: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:9545".to_string(),
        }
    }
}

/// Node wallet used to sign inner transactions
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    #[serde(skip_serializing)]
    pub private_key: Option<String>,
}

impl fmt::Debug for WalletConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletConfig")
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Deployed execution manager
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionManagerConfig {
    pub address: Option<Address>,
    /// Fixed at deployment; carried for diagnostics only.
    pub opcode_whitelist_mask: Option<String>,
}

/// Chain parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    pub chain_id: u64,
    pub gas_limit: u64,
    pub write_gas_limit: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            chain_id: DEFAULT_CHAIN_ID,
            gas_limit: DEFAULT_GAS_LIMIT,
            write_gas_limit: DEFAULT_WRITE_GAS_LIMIT,
        }
    }
}

/// Log output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}
