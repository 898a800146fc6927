//! The chains Harvest knows about.
//!
//! The Harvest contract is deployed at the same address on every supported
//! chain, so adding a chain means adding one entry here.

use alloy_chains::{Chain, NamedChain};
use alloy_primitives::{Address, TxHash, address};

/// Address of the Harvest contract on all supported chains.
pub const HARVEST_ADDRESS: Address = address!("0x88bcea869a1aaa637d2d53be744172ab601c5e03");

/// Per-chain settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChainEntry {
    pub chain: NamedChain,
    /// Subdomain used to assemble Alchemy API urls, like `eth-mainnet`.
    pub alchemy_network: &'static str,
    /// Block explorer base url, without a trailing slash.
    pub block_explorer: &'static str,
    /// Chain slug in OpenSea asset urls.
    pub opensea_slug: &'static str,
    /// Whether the Harvest contract is live on this chain.
    pub harvest_deployed: bool,
}

/// All chains the tool recognizes. Selling requires `harvest_deployed`.
pub const SUPPORTED_CHAINS: &[ChainEntry] = &[
    ChainEntry {
        chain: NamedChain::Mainnet,
        alchemy_network: "eth-mainnet",
        block_explorer: "https://etherscan.io",
        opensea_slug: "ethereum",
        harvest_deployed: true,
    },
    ChainEntry {
        chain: NamedChain::Base,
        alchemy_network: "base-mainnet",
        block_explorer: "https://basescan.org",
        opensea_slug: "base",
        harvest_deployed: true,
    },
];

/// Returns the entry for the given chain, if it is a supported one.
pub fn chain_entry(chain: Chain) -> Option<&'static ChainEntry> {
    SUPPORTED_CHAINS.iter().find(|entry| Chain::from_named(entry.chain) == chain)
}

/// Returns the Alchemy network subdomain for the chain.
///
/// Unknown chains fall back to `eth-mainnet`; display helpers never fail on a
/// chain the table doesn't list, only selling does.
pub fn alchemy_network(chain: Chain) -> &'static str {
    chain_entry(chain).map_or("eth-mainnet", |entry| entry.alchemy_network)
}

/// Returns the block explorer base url for the chain, etherscan as fallback.
pub fn block_explorer(chain: Chain) -> &'static str {
    chain_entry(chain).map_or("https://etherscan.io", |entry| entry.block_explorer)
}

/// Whether the Harvest contract can be sold to on this chain.
pub fn is_harvest_deployed(chain: Chain) -> bool {
    chain_entry(chain).is_some_and(|entry| entry.harvest_deployed)
}

pub fn explorer_address_url(chain: Chain, address: Address) -> String {
    format!("{}/address/{address}", block_explorer(chain))
}

pub fn explorer_tx_url(chain: Chain, tx: TxHash) -> String {
    format!("{}/tx/{tx}", block_explorer(chain))
}

/// OpenSea page for a token contract.
pub fn opensea_token_url(chain: Chain, contract: Address) -> String {
    format!("https://opensea.io/assets/{}/{contract}", opensea_slug(chain))
}

/// OpenSea page for a single asset.
pub fn opensea_asset_url(chain: Chain, contract: Address, token_id: &str) -> String {
    format!("https://opensea.io/assets/{}/{contract}/{token_id}", opensea_slug(chain))
}

fn opensea_slug(chain: Chain) -> &'static str {
    chain_entry(chain).map_or("ethereum", |entry| entry.opensea_slug)
}
