//! # harvest-config
//!
//! Harvest configuration, layered from defaults, `harvest.toml`, `HARVEST_`
//! prefixed environment variables, and CLI options (as figment providers, in
//! that order of precedence).

use alloy_chains::Chain;
use alloy_primitives::Address;
use figment::{
    Figment, Metadata, Profile, Provider,
    providers::{Env, Format, Serialized, Toml},
    value::{Dict, Map},
};
use serde::{Deserialize, Serialize};
use std::{env, path::PathBuf};
use tracing::trace;

pub mod chains;
pub use chains::HARVEST_ADDRESS;

mod endpoints;
pub use endpoints::{ResolvedRpcEndpoints, RpcEndpoint, RpcEndpoints};

mod error;
pub use error::{ExtractConfigError, HarvestConfigError, RpcUrlError};

mod resolve;
pub use resolve::UnresolvedEnvVarError;

// Re-export so dependent crates don't have to pin a matching version.
pub use alloy_chains;
pub use figment;

/// Harvest configuration.
///
/// Every field can be set in `harvest.toml`, through a `HARVEST_` prefixed
/// env var, or by the CLI option that maps to it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// The chain to operate on.
    pub chain: Chain,
    /// A direct RPC url override. Takes precedence over `rpc_endpoints`.
    ///
    /// May contain `${ENV_VAR}` placeholders.
    pub eth_rpc_url: Option<String>,
    /// Named RPC urls; an entry named after the active chain (`mainnet`,
    /// `base`) is used when no direct url is set.
    pub rpc_endpoints: RpcEndpoints,
    /// Alchemy API key, used for the indexer and as an RPC url of last
    /// resort.
    pub alchemy_api_key: Option<String>,
    /// Address of the Harvest contract.
    pub harvest_address: Address,
    /// Address purchases are made from when no wallet option is given.
    pub sender: Option<Address>,
    /// Number of confirmations to wait for after each transaction.
    pub confirmations: u64,
    /// Seconds to wait for a transaction receipt before giving up.
    pub tx_timeout: u64,
    /// Port for the browser wallet bridge. 0 picks an ephemeral port.
    pub browser_port: u16,
}

impl Config {
    /// The default config file name.
    pub const FILE_NAME: &'static str = "harvest.toml";

    /// Env var that overrides the config file location.
    pub const CONFIG_FILE_ENV: &'static str = "HARVEST_CONFIG";

    /// Loads the config from the default figment.
    pub fn load() -> Result<Self, ExtractConfigError> {
        Self::from_provider(Self::figment())
    }

    /// Extracts the config from the given provider.
    pub fn from_provider<T: Provider>(provider: T) -> Result<Self, ExtractConfigError> {
        trace!(target: "harvest::config", "load config with provider {:?}", provider.metadata().name);
        Figment::from(provider).extract().map_err(ExtractConfigError::new)
    }

    /// The default figment: defaults < `harvest.toml` < `HARVEST_` env vars.
    ///
    /// CLI options merge themselves on top of this.
    pub fn figment() -> Figment {
        let config_file =
            env::var(Self::CONFIG_FILE_ENV).unwrap_or_else(|_| Self::FILE_NAME.to_string());
        Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed("HARVEST_").global())
    }

    /// Returns the RPC url to use for the active chain.
    ///
    /// Resolution order: `eth_rpc_url`, the `rpc_endpoints` entry named after
    /// the chain, an Alchemy url derived from the API key.
    pub fn rpc_url(&self) -> Result<String, RpcUrlError> {
        if let Some(url) = &self.eth_rpc_url {
            return Ok(resolve::interpolate(url)?);
        }
        if let Some(endpoint) = self.rpc_endpoints.get(&self.chain.to_string()) {
            return Ok(endpoint.clone().resolve()?);
        }
        if let Some(url) = self.alchemy_rpc_url() {
            return Ok(url);
        }
        Err(RpcUrlError::Missing(self.chain))
    }

    /// The Alchemy JSON-RPC url for the active chain, if an API key is set.
    pub fn alchemy_rpc_url(&self) -> Option<String> {
        let key = self.alchemy_api_key.as_deref().filter(|key| !key.is_empty())?;
        Some(format!("https://{}.g.alchemy.com/v2/{key}", chains::alchemy_network(self.chain)))
    }

    /// Whether the Harvest contract is live on the active chain.
    pub fn is_harvest_deployed(&self) -> bool {
        chains::is_harvest_deployed(self.chain)
    }

    /// Returns the path to the default keystore directory, `~/.harvest/keystores`.
    pub fn harvest_keystores_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".harvest").join("keystores"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chain: Chain::mainnet(),
            eth_rpc_url: None,
            rpc_endpoints: RpcEndpoints::default(),
            alchemy_api_key: None,
            harvest_address: HARVEST_ADDRESS,
            sender: None,
            confirmations: 1,
            tx_timeout: 120,
            browser_port: 0,
        }
    }
}

impl Provider for Config {
    fn metadata(&self) -> Metadata {
        Metadata::named("Harvest Config")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        Serialized::defaults(self).data()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_loads_without_sources() {
        figment::Jail::expect_with(|_jail| {
            let config = Config::load().unwrap();
            assert_eq!(config, Config::default());
            assert_eq!(config.chain, Chain::mainnet());
            assert_eq!(config.harvest_address, HARVEST_ADDRESS);
            Ok(())
        });
    }

    #[test]
    fn can_extract_from_toml() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "harvest.toml",
                r#"
                chain = "base"
                alchemy_api_key = "test-key"
                tx_timeout = 60
                confirmations = 3

                [rpc_endpoints]
                mainnet = "https://eth.example.com"
                base = "https://base.example.com/${_HARVEST_TEST_BASE_KEY}"
                "#,
            )?;
            let config = Config::load().unwrap();
            assert_eq!(config.chain, Chain::base_mainnet());
            assert_eq!(config.alchemy_api_key.as_deref(), Some("test-key"));
            assert_eq!(config.tx_timeout, 60);
            assert_eq!(config.confirmations, 3);
            assert_eq!(
                config.rpc_endpoints.get("mainnet"),
                Some(&RpcEndpoint::Url("https://eth.example.com".to_string()))
            );

            jail.set_env("_HARVEST_TEST_BASE_KEY", "abc");
            assert_eq!(config.rpc_url().unwrap(), "https://base.example.com/abc");
            Ok(())
        });
    }

    #[test]
    fn env_overrides_toml() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("harvest.toml", "chain = \"base\"")?;
            jail.set_env("HARVEST_CHAIN", "mainnet");
            jail.set_env("HARVEST_ALCHEMY_API_KEY", "env-key");
            let config = Config::load().unwrap();
            assert_eq!(config.chain, Chain::mainnet());
            assert_eq!(config.alchemy_api_key.as_deref(), Some("env-key"));
            Ok(())
        });
    }

    #[test]
    fn rpc_url_resolution_order() {
        figment::Jail::expect_with(|jail| {
            // nothing configured
            let config = Config::default();
            assert_eq!(config.rpc_url(), Err(RpcUrlError::Missing(Chain::mainnet())));

            // alchemy key as last resort
            let config =
                Config { alchemy_api_key: Some("key".to_string()), ..Default::default() };
            assert_eq!(config.rpc_url().unwrap(), "https://eth-mainnet.g.alchemy.com/v2/key");

            // an endpoint named after the chain beats the alchemy fallback
            let config = Config {
                rpc_endpoints: RpcEndpoints::new([(
                    "mainnet",
                    RpcEndpoint::Url("https://named.example.com".to_string()),
                )]),
                ..config
            };
            assert_eq!(config.rpc_url().unwrap(), "https://named.example.com");

            // a direct url beats everything
            jail.set_env("_HARVEST_TEST_DIRECT", "direct.example.com");
            let config = Config {
                eth_rpc_url: Some("https://${_HARVEST_TEST_DIRECT}".to_string()),
                ..config
            };
            assert_eq!(config.rpc_url().unwrap(), "https://direct.example.com");
            Ok(())
        });
    }

    #[test]
    fn can_override_harvest_address() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "harvest.toml",
                "harvest_address = \"0x00000000000000000000000000000000000000aa\"",
            )?;
            let config = Config::load().unwrap();
            assert_eq!(
                config.harvest_address,
                "0x00000000000000000000000000000000000000aa".parse::<Address>().unwrap()
            );
            Ok(())
        });
    }

    #[test]
    fn config_roundtrips_through_provider() {
        let config = Config { alchemy_api_key: Some("key".to_string()), ..Default::default() };
        let extracted = Config::from_provider(config.clone()).unwrap();
        assert_eq!(config, extracted);
    }
}
