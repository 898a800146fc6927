use crate::opts::ChainValueParser;
use alloy_chains::{Chain, ChainKind};
use clap::Parser;
use harvest_config::figment::{
    self, Metadata, Profile,
    value::{Dict, Map},
};
use harvest_wallets::WalletOpts;
use serde::Serialize;

#[derive(Clone, Debug, Default, Serialize, Parser)]
pub struct RpcOpts {
    /// The RPC endpoint URL.
    #[arg(short = 'r', long = "rpc-url", value_name = "URL", env = "ETH_RPC_URL")]
    #[serde(rename = "eth_rpc_url", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// The chain name or EIP-155 chain ID.
    #[arg(
        short,
        long,
        alias = "chain-id",
        env = "CHAIN",
        value_parser = ChainValueParser,
    )]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain: Option<Chain>,
}

impl figment::Provider for RpcOpts {
    fn metadata(&self) -> Metadata {
        Metadata::named("RpcOpts")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        Ok(Map::from([(Profile::Default, self.dict())]))
    }
}

impl RpcOpts {
    pub fn dict(&self) -> Dict {
        let mut dict = Dict::new();
        if let Some(url) = &self.url {
            dict.insert("eth_rpc_url".into(), url.clone().into());
        }
        if let Some(chain) = self.chain {
            // named chains go in by name so `chain = "base"` round-trips
            match chain.kind() {
                ChainKind::Id(id) => dict.insert("chain".into(), (*id).into()),
                ChainKind::Named(_) => dict.insert("chain".into(), chain.to_string().into()),
            };
        }
        dict
    }
}

#[derive(Clone, Debug, Default, Serialize, Parser)]
pub struct IndexerOpts {
    /// The Alchemy API key, used to query token and NFT holdings.
    #[arg(long = "alchemy-api-key", alias = "api-key", env = "ALCHEMY_API_KEY")]
    #[serde(rename = "alchemy_api_key", skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl figment::Provider for IndexerOpts {
    fn metadata(&self) -> Metadata {
        Metadata::named("IndexerOpts")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        Ok(Map::from([(Profile::Default, self.dict())]))
    }
}

impl IndexerOpts {
    /// Returns the Alchemy API key, treating a blank value as unset.
    pub fn key(&self) -> Option<String> {
        self.key.as_ref().filter(|key| !key.trim().is_empty()).cloned()
    }

    pub fn dict(&self) -> Dict {
        let mut dict = Dict::new();
        if let Some(key) = self.key() {
            dict.insert("alchemy_api_key".into(), key.into());
        }
        dict
    }
}

#[derive(Clone, Debug, Default, Parser)]
#[command(next_help_heading = "Ethereum options")]
pub struct EthereumOpts {
    #[command(flatten)]
    pub rpc: RpcOpts,

    #[command(flatten)]
    pub indexer: IndexerOpts,

    #[command(flatten)]
    pub wallet: WalletOpts,
}

// Make this args a `Figment` provider so that it can be merged into the `Config`
impl figment::Provider for EthereumOpts {
    fn metadata(&self) -> Metadata {
        Metadata::named("Ethereum Opts Provider")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        let mut dict = self.rpc.dict();
        dict.extend(self.indexer.dict());

        if let Some(from) = self.wallet.from {
            dict.insert("sender".to_string(), from.to_string().into());
        }

        Ok(Map::from([(Profile::Default, dict)]))
    }
}
