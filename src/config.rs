// config.rs
use thiserror::Error;

use crate::service::stellar_keys::{Keypair, KeyError};

pub const DEFAULT_HORIZON_URL: &str = "https://horizon-testnet.stellar.org";
pub const DEFAULT_SOROBAN_RPC_URL: &str = "https://soroban-testnet.stellar.org";
pub const TESTNET_PASSPHRASE: &str = "Test SDF Network ; September 2015";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("STELLAR_PUBLIC_KEY {configured} does not match the key derived from STELLAR_SECRET_KEY ({derived})")]
    IssuerKeyMismatch { configured: String, derived: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    // Stellar network
    pub horizon_url: String,
    pub soroban_rpc_url: String,
    pub network_passphrase: String,
    pub issuer: Keypair,
    pub vaccine_contract_id: String,
    pub tx_poll_attempts: u32,
}

impl Config {
    pub fn init() -> Result<Config, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any key/value source; `init` reads the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| -> Result<String, ConfigError> {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let database_url = required("DATABASE_URL")?;
        let secret_key = required("STELLAR_SECRET_KEY")?;
        let public_key = required("STELLAR_PUBLIC_KEY")?;
        let vaccine_contract_id = required("VACCINE_CONTRACT_ID")?;

        let issuer = Keypair::from_secret(&secret_key).map_err(|e: KeyError| ConfigError::Invalid {
            name: "STELLAR_SECRET_KEY",
            reason: e.to_string(),
        })?;

        if issuer.public_key() != public_key {
            return Err(ConfigError::IssuerKeyMismatch {
                configured: public_key,
                derived: issuer.public_key(),
            });
        }

        if stellar_strkey::Contract::from_string(&vaccine_contract_id).is_err() {
            return Err(ConfigError::Invalid {
                name: "VACCINE_CONTRACT_ID",
                reason: "expected a C... contract address".to_string(),
            });
        }

        let horizon_url = lookup("STELLAR_NETWORK_URL")
            .unwrap_or_else(|| DEFAULT_HORIZON_URL.to_string());
        let soroban_rpc_url = lookup("SOROBAN_RPC_URL")
            .unwrap_or_else(|| DEFAULT_SOROBAN_RPC_URL.to_string());
        let network_passphrase = lookup("STELLAR_NETWORK_PASSPHRASE")
            .unwrap_or_else(|| TESTNET_PASSPHRASE.to_string());

        let tx_poll_attempts = match lookup("TX_POLL_ATTEMPTS") {
            Some(raw) => raw.trim().parse::<u32>().map_err(|e| ConfigError::Invalid {
                name: "TX_POLL_ATTEMPTS",
                reason: e.to_string(),
            })?,
            None => 10,
        };

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: "PORT",
                reason: e.to_string(),
            })?,
            None => 8000,
        };

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173,http://localhost:8000".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Config {
            database_url,
            port,
            cors_allowed_origins,
            horizon_url: horizon_url.trim_end_matches('/').to_string(),
            soroban_rpc_url,
            network_passphrase,
            issuer,
            vaccine_contract_id,
            tx_poll_attempts,
        })
    }
}
