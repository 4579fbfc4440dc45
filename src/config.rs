//! Explicit configuration for the exchange client. Contract addresses and ledger settings are
//! handed to [`crate::exchange::Exchange`] and [`crate::ledger::Web3Ledger`] rather than read
//! from globals.
use crate::error::ExchangeError;
use clarity::Address;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONFIRMATION_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Where the two contracts live
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeConfig {
    /// The AMM exchange, also the LP token
    pub exchange_address: Address,
    /// The Crypto Dev ERC20 token
    pub token_address: Address,
}

impl ExchangeConfig {
    pub fn new(exchange_address: Address, token_address: Address) -> Self {
        ExchangeConfig {
            exchange_address,
            token_address,
        }
    }

    pub fn validate(&self) -> Result<(), ExchangeError> {
        if self.exchange_address == self.token_address {
            return Err(ExchangeError::BadConfig(
                "exchange and token can't share an address".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_confirmation_timeout_secs() -> u64 {
    DEFAULT_CONFIRMATION_TIMEOUT_SECS
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

/// How to reach the chain
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// JSON-RPC endpoint
    pub url: String,
    /// Account transactions are sent from, the node or the wallet behind it holds its key.
    /// Without one the ledger is read only.
    #[serde(default)]
    pub signer: Option<Address>,
    /// Per request timeout
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Upper bound on waiting for a submitted transaction to be mined
    #[serde(default = "default_confirmation_timeout_secs")]
    pub confirmation_timeout_secs: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl LedgerConfig {
    pub fn new(url: &str) -> Self {
        LedgerConfig {
            url: url.to_string(),
            signer: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            confirmation_timeout_secs: DEFAULT_CONFIRMATION_TIMEOUT_SECS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn validate(&self) -> Result<(), ExchangeError> {
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(ExchangeError::BadConfig(format!(
                "ledger url {} is not http(s)",
                self.url
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(ExchangeError::BadConfig(
                "poll_interval_ms must be non zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Everything needed to build a ledger and an exchange handle
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub exchange: ExchangeConfig,
    pub ledger: LedgerConfig,
}

impl Config {
    pub fn from_json_str(input: &str) -> Result<Config, ExchangeError> {
        let config: Config = serde_json::from_str(input)
            .map_err(|e| ExchangeError::BadConfig(format!("{e}")))?;
        config.exchange.validate()?;
        config.ledger.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config, ExchangeError> {
        let contents = fs::read_to_string(path.as_ref())?;
        debug!("loaded exchange config from {}", path.as_ref().display());
        Config::from_json_str(&contents)
    }
}
