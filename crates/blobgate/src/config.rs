//! Environment-driven gateway configuration.
//!
//! Resolved once at startup. A missing signer key is fatal: the gateway
//! refuses to start rather than serve uploads it cannot anchor.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use blobgate_core::DEFAULT_BLOCK_SIZE;

fn default_rpc_url() -> String {
    "https://evmrpc-testnet.0g.ai/".to_string()
}

fn default_indexer_url() -> String {
    "https://indexer-storage-testnet-turbo.0g.ai".to_string()
}

fn default_port() -> u16 {
    4000
}

fn default_staging_dir() -> PathBuf {
    PathBuf::from("tmp")
}

fn default_max_upload_mb() -> usize {
    100
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("PRIVATE_KEY is required but not set")]
    MissingPrivateKey,
    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Chain RPC endpoint (`RPC_URL`)
    pub rpc_url: String,
    /// Storage network indexer endpoint (`INDEXER_RPC`)
    pub indexer_url: String,
    /// Hex signer secret (`PRIVATE_KEY`, required)
    pub private_key: String,
    /// Listening port (`PORT`)
    pub port: u16,
    /// Staging directory for in-flight uploads (`STAGING_DIR`)
    pub staging_dir: PathBuf,
    /// Multipart body limit in bytes (`MAX_UPLOAD_MB`)
    pub max_upload_bytes: usize,
    /// Chunking block size in bytes (`BLOCK_SIZE`)
    pub block_size: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let private_key = env::var("PRIVATE_KEY")
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingPrivateKey)?;

        let max_upload_mb: usize = parse_var("MAX_UPLOAD_MB", default_max_upload_mb())?;
        let block_size: usize = parse_var("BLOCK_SIZE", DEFAULT_BLOCK_SIZE)?;
        if block_size == 0 {
            return Err(ConfigError::InvalidValue {
                name: "BLOCK_SIZE",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            rpc_url: env::var("RPC_URL").unwrap_or_else(|_| default_rpc_url()),
            indexer_url: env::var("INDEXER_RPC").unwrap_or_else(|_| default_indexer_url()),
            private_key,
            port: parse_var("PORT", default_port())?,
            staging_dir: env::var("STAGING_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_staging_dir()),
            max_upload_bytes: max_upload_mb * 1024 * 1024,
            block_size,
        })
    }
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value: raw }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env vars are process-global, so everything lives in one test
    #[test]
    fn test_from_env() {
        env::remove_var("PRIVATE_KEY");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::MissingPrivateKey)
        ));

        env::set_var("PRIVATE_KEY", "ab".repeat(32));
        env::set_var("PORT", "5005");
        env::set_var("MAX_UPLOAD_MB", "10");

        let config = Config::from_env().unwrap();
        assert_eq!(config.port, 5005);
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.block_size, DEFAULT_BLOCK_SIZE);
        assert_eq!(config.rpc_url, default_rpc_url());

        env::set_var("PORT", "not-a-port");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::InvalidValue { name: "PORT", .. })
        ));

        env::remove_var("PORT");
        env::set_var("BLOCK_SIZE", "0");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::InvalidValue {
                name: "BLOCK_SIZE",
                ..
            })
        ));

        env::remove_var("BLOCK_SIZE");
        env::remove_var("MAX_UPLOAD_MB");
        env::remove_var("PRIVATE_KEY");
    }
}
