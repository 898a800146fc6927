//! Wire types for the Alchemy token and NFT APIs.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Result of `alchemy_getTokenBalances`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalances {
    #[serde(default)]
    pub token_balances: Vec<TokenBalance>,
}

/// One balance entry. `tokenBalance` arrives as 0x-prefixed 256-bit hex.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalance {
    pub contract_address: Address,
    pub token_balance: U256,
}

/// Result of `alchemy_getTokenMetadata`. Every field is optional.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub decimals: Option<u8>,
    pub logo: Option<String>,
}

/// An ERC20 position: a non-zero balance joined with its metadata.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Erc20Holding {
    pub contract_address: Address,
    pub balance: U256,
    #[serde(flatten)]
    pub metadata: TokenMetadata,
}

impl Erc20Holding {
    pub fn display_name(&self) -> &str {
        self.metadata.name.as_deref().unwrap_or("Unknown Token")
    }

    pub fn display_symbol(&self) -> &str {
        self.metadata.symbol.as_deref().unwrap_or("tokens")
    }

    pub fn decimals(&self) -> u8 {
        self.metadata.decimals.unwrap_or(18)
    }

    /// The balance in human units, fraction trimmed to four digits.
    pub fn formatted_balance(&self) -> String {
        harvest_common::fmt::format_token_balance(self.balance, self.decimals())
    }
}

/// One page of `getNFTsForOwner` results.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftPage {
    #[serde(default)]
    pub owned_nfts: Vec<OwnedNft>,
    #[serde(default)]
    pub total_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_key: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedNft {
    pub contract: NftContract,
    pub token_id: String,
    #[serde(default)]
    pub token_type: TokenStandard,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<NftImage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<RawNftData>,
    /// ERC1155 unit count; `None` for ERC721.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<String>,
}

impl OwnedNft {
    /// Name fallback chain: top-level name, raw metadata name, `#tokenId`.
    pub fn display_name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        if let Some(name) = self.raw.as_ref().and_then(|raw| raw.metadata.as_ref()?.name.as_ref())
        {
            return name.clone();
        }
        format!("#{}", self.token_id)
    }

    /// Collection fallback chain: contract name, OpenSea collection name.
    pub fn collection_name(&self) -> &str {
        if let Some(name) = self.contract.name.as_deref() {
            return name;
        }
        self.contract
            .open_sea_metadata
            .as_ref()
            .and_then(|meta| meta.collection_name.as_deref())
            .unwrap_or("Unknown Collection")
    }

    /// Parses the token id, accepting both decimal and 0x hex strings.
    pub fn token_id(&self) -> Result<U256, alloy_primitives::ruint::ParseError> {
        parse_token_id(&self.token_id)
    }
}

/// Parses a token id string, decimal or 0x-prefixed hex.
pub fn parse_token_id(id: &str) -> Result<U256, alloy_primitives::ruint::ParseError> {
    if let Some(hex) = id.strip_prefix("0x") {
        U256::from_str_radix(hex, 16)
    } else {
        U256::from_str_radix(id, 10)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftContract {
    pub address: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default)]
    pub token_type: TokenStandard,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_sea_metadata: Option<OpenSeaMetadata>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenSeaMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_name: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftImage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub png_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_url: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawNftData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RawNftMetadata>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawNftMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// The two standards the Harvest contract buys. Anything else is `Unknown`
/// and cannot be sold.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenStandard {
    #[serde(rename = "ERC721")]
    Erc721,
    #[serde(rename = "ERC1155")]
    Erc1155,
    #[default]
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for TokenStandard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Erc721 => "ERC721",
            Self::Erc1155 => "ERC1155",
            Self::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}
