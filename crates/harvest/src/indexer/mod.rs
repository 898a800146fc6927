//! Client for the Alchemy token and NFT indexer APIs.
//!
//! Two surfaces: the token API is JSON-RPC on `/v2/{key}`, the NFT API is
//! REST on `/nft/v3/{key}`. Base URLs are explicit so tests can point the
//! client at a local server.

mod types;
pub use types::*;

use alloy_primitives::Address;
use harvest_common::REQUEST_TIMEOUT;
use harvest_config::{Config, chains};
use serde::{Serialize, de::DeserializeOwned};
use url::Url;

/// Positions past the first 100 are not fetched, matching the indexer's
/// metadata batch limits.
const MAX_ERC20_POSITIONS: usize = 100;

/// NFT page size requested from `getNFTsForOwner`.
const NFT_PAGE_SIZE: &str = "100";

#[derive(Debug, thiserror::Error)]
pub enum IndexerError {
    #[error(
        "no Alchemy API key configured; set `alchemy_api_key` in harvest.toml or the ALCHEMY_API_KEY env var"
    )]
    MissingApiKey,
    #[error("invalid indexer URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("indexer RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("indexer returned HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("indexer response contained no result")]
    EmptyResponse,
}

#[derive(Serialize)]
struct RpcRequest {
    jsonrpc: &'static str,
    method: &'static str,
    params: serde_json::Value,
    id: u64,
}

impl RpcRequest {
    fn new(method: &'static str, params: serde_json::Value, id: u64) -> Self {
        Self { jsonrpc: "2.0", method, params, id }
    }
}

#[derive(serde::Deserialize)]
struct RpcResponse<T> {
    #[serde(default)]
    id: u64,
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(serde::Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

impl<T> RpcResponse<T> {
    fn into_result(self) -> Result<T, IndexerError> {
        if let Some(error) = self.error {
            return Err(IndexerError::Rpc { code: error.code, message: error.message });
        }
        self.result.ok_or(IndexerError::EmptyResponse)
    }
}

/// The Alchemy indexer client.
#[derive(Clone, Debug)]
pub struct AlchemyClient {
    client: reqwest::Client,
    /// JSON-RPC endpoint for `alchemy_getTokenBalances` and friends.
    token_url: Url,
    /// `getNFTsForOwner` REST endpoint.
    nft_url: Url,
}

impl AlchemyClient {
    /// Creates a client for the config's chain and API key.
    ///
    /// A missing API key is an error: unlike the original web UI there is no
    /// page to render an empty list into.
    pub fn from_config(config: &Config) -> Result<Self, IndexerError> {
        let key = config
            .alchemy_api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(IndexerError::MissingApiKey)?;
        let network = chains::alchemy_network(config.chain);
        Self::with_urls(
            &format!("https://{network}.g.alchemy.com/v2/{key}"),
            &format!("https://{network}.g.alchemy.com/nft/v3/{key}"),
        )
    }

    /// Creates a client with explicit base URLs.
    pub fn with_urls(token_base: &str, nft_base: &str) -> Result<Self, IndexerError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let token_url = Url::parse(token_base)?;
        let nft_url =
            Url::parse(&format!("{}/getNFTsForOwner", nft_base.trim_end_matches('/')))?;
        Ok(Self { client, token_url, nft_url })
    }

    /// Returns the owner's non-zero ERC20 positions with metadata, capped at
    /// the first 100.
    pub async fn erc20_holdings(&self, owner: Address) -> Result<Vec<Erc20Holding>, IndexerError> {
        let balances: TokenBalances = self
            .rpc_call("alchemy_getTokenBalances", serde_json::json!([owner, "erc20"]))
            .await?;

        let mut positions: Vec<TokenBalance> = balances
            .token_balances
            .into_iter()
            .filter(|balance| !balance.token_balance.is_zero())
            .collect();
        positions.truncate(MAX_ERC20_POSITIONS);
        if positions.is_empty() {
            return Ok(Vec::new());
        }

        let metadata =
            self.batch_token_metadata(positions.iter().map(|p| p.contract_address)).await?;

        Ok(positions
            .into_iter()
            .zip(metadata)
            .map(|(position, metadata)| Erc20Holding {
                contract_address: position.contract_address,
                balance: position.token_balance,
                metadata: metadata.unwrap_or_default(),
            })
            .collect())
    }

    /// Fetches one page of the owner's NFTs.
    pub async fn nfts_for_owner(
        &self,
        owner: Address,
        page_key: Option<&str>,
    ) -> Result<NftPage, IndexerError> {
        let mut url = self.nft_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("owner", &owner.to_string());
            query.append_pair("withMetadata", "true");
            query.append_pair("pageSize", NFT_PAGE_SIZE);
            if let Some(page_key) = page_key {
                query.append_pair("pageKey", page_key);
            }
        }

        trace!(target: "harvest::indexer", %owner, ?page_key, "fetching NFT page");
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(IndexerError::Status(response.status()));
        }
        Ok(response.json().await?)
    }

    /// Fetches all of the owner's NFTs, following `pageKey` to the end.
    pub async fn all_nfts(&self, owner: Address) -> Result<NftPage, IndexerError> {
        let mut page = self.nfts_for_owner(owner, None).await?;
        while let Some(key) = page.page_key.take() {
            let mut next = self.nfts_for_owner(owner, Some(&key)).await?;
            page.owned_nfts.append(&mut next.owned_nfts);
            page.page_key = next.page_key;
        }
        Ok(page)
    }

    async fn rpc_call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        params: serde_json::Value,
    ) -> Result<T, IndexerError> {
        trace!(target: "harvest::indexer", method, "indexer RPC call");
        let response = self
            .client
            .post(self.token_url.clone())
            .json(&RpcRequest::new(method, params, 1))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(IndexerError::Status(response.status()));
        }
        response.json::<RpcResponse<T>>().await?.into_result()
    }

    /// Fetches metadata for many contracts in one JSON-RPC batch.
    ///
    /// The request id is the position index; responses are matched by id
    /// since the batch answer order is not guaranteed. Entries that errored
    /// come back as `None`.
    async fn batch_token_metadata(
        &self,
        contracts: impl Iterator<Item = Address>,
    ) -> Result<Vec<Option<TokenMetadata>>, IndexerError> {
        let batch: Vec<RpcRequest> = contracts
            .enumerate()
            .map(|(id, address)| {
                RpcRequest::new(
                    "alchemy_getTokenMetadata",
                    serde_json::json!([address]),
                    id as u64,
                )
            })
            .collect();
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let response =
            self.client.post(self.token_url.clone()).json(&batch).send().await?;
        if !response.status().is_success() {
            return Err(IndexerError::Status(response.status()));
        }
        let responses: Vec<RpcResponse<TokenMetadata>> = response.json().await?;

        let mut results = vec![None; batch.len()];
        for entry in responses {
            let id = entry.id as usize;
            if id < results.len() {
                results[id] = entry.result;
            }
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{U256, address};
    use axum::{Json, Router, extract::Query, routing::get, routing::post};
    use std::collections::HashMap;

    const OWNER: Address = address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    /// Mock token API: one zero balance to filter, metadata answered out of
    /// order with one errored entry.
    async fn token_api(Json(body): Json<serde_json::Value>) -> Json<serde_json::Value> {
        if let Some(batch) = body.as_array() {
            // metadata batch, reversed to exercise matching by id
            let mut answers = Vec::new();
            for request in batch.iter().rev() {
                let id = request["id"].as_u64().unwrap();
                assert_eq!(request["method"], "alchemy_getTokenMetadata");
                if id == 0 {
                    answers.push(serde_json::json!({
                        "jsonrpc": "2.0",
                        "id": id,
                        "result": { "name": "Dai Stablecoin", "symbol": "DAI", "decimals": 18 }
                    }));
                } else {
                    answers.push(serde_json::json!({
                        "jsonrpc": "2.0",
                        "id": id,
                        "error": { "code": -32602, "message": "unknown token" }
                    }));
                }
            }
            return Json(serde_json::Value::Array(answers));
        }

        assert_eq!(body["method"], "alchemy_getTokenBalances");
        assert_eq!(body["params"][1], "erc20");
        Json(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {
                "address": body["params"][0],
                "tokenBalances": [
                    {
                        "contractAddress": "0x6b175474e89094c44da98b954eedeac495271d0f",
                        "tokenBalance": "0x0000000000000000000000000000000000000000000000056bc75e2d63100000"
                    },
                    {
                        "contractAddress": "0x0000000000000000000000000000000000000bad",
                        "tokenBalance": "0x0000000000000000000000000000000000000000000000000000000000000000"
                    },
                    {
                        "contractAddress": "0x0000000000000000000000000000000000000002",
                        "tokenBalance": "0x0000000000000000000000000000000000000000000000000000000000000007"
                    }
                ]
            }
        }))
    }

    /// Mock NFT API with two pages linked by `pageKey`.
    async fn nft_api(Query(params): Query<HashMap<String, String>>) -> Json<serde_json::Value> {
        assert_eq!(params["withMetadata"], "true");
        assert_eq!(params["pageSize"], "100");
        match params.get("pageKey").map(String::as_str) {
            None => Json(serde_json::json!({
                "ownedNfts": [{
                    "contract": {
                        "address": "0x0000000000000000000000000000000000000010",
                        "name": "Cool Cats",
                        "tokenType": "ERC721"
                    },
                    "tokenId": "1",
                    "tokenType": "ERC721",
                    "name": "Cool Cat #1"
                }],
                "totalCount": 2,
                "pageKey": "page-2"
            })),
            Some("page-2") => Json(serde_json::json!({
                "ownedNfts": [{
                    "contract": {
                        "address": "0x0000000000000000000000000000000000000011",
                        "tokenType": "ERC1155"
                    },
                    "tokenId": "7",
                    "tokenType": "ERC1155",
                    "balance": "3"
                }],
                "totalCount": 2
            })),
            Some(other) => panic!("unexpected page key {other}"),
        }
    }

    #[tokio::test]
    async fn fetches_erc20_holdings() {
        let base = serve(Router::new().route("/", post(token_api))).await;
        let client = AlchemyClient::with_urls(&base, &base).unwrap();

        let holdings = client.erc20_holdings(OWNER).await.unwrap();
        // the zero balance was dropped
        assert_eq!(holdings.len(), 2);

        let dai = &holdings[0];
        assert_eq!(dai.contract_address, address!("0x6b175474e89094c44da98b954eedeac495271d0f"));
        assert_eq!(dai.display_name(), "Dai Stablecoin");
        assert_eq!(dai.display_symbol(), "DAI");
        assert_eq!(dai.formatted_balance(), "100");

        // the errored metadata entry falls back to defaults
        let other = &holdings[1];
        assert_eq!(other.balance, U256::from(7));
        assert_eq!(other.display_name(), "Unknown Token");
    }

    #[tokio::test]
    async fn follows_nft_pagination() {
        let base = serve(Router::new().route("/getNFTsForOwner", get(nft_api))).await;
        let client = AlchemyClient::with_urls(&base, &base).unwrap();

        let page = client.all_nfts(OWNER).await.unwrap();
        assert_eq!(page.owned_nfts.len(), 2);
        assert_eq!(page.total_count, 2);
        assert!(page.page_key.is_none());

        assert_eq!(page.owned_nfts[0].display_name(), "Cool Cat #1");
        assert_eq!(page.owned_nfts[0].collection_name(), "Cool Cats");
        assert_eq!(page.owned_nfts[1].token_type, TokenStandard::Erc1155);
        assert_eq!(page.owned_nfts[1].balance.as_deref(), Some("3"));
    }

    #[tokio::test]
    async fn surfaces_rpc_errors() {
        async fn rpc_error(Json(_): Json<serde_json::Value>) -> Json<serde_json::Value> {
            Json(serde_json::json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": { "code": -32000, "message": "capacity exceeded" }
            }))
        }
        let base = serve(Router::new().route("/", post(rpc_error))).await;
        let client = AlchemyClient::with_urls(&base, &base).unwrap();

        let err = client.erc20_holdings(OWNER).await.unwrap_err();
        match err {
            IndexerError::Rpc { code, message } => {
                assert_eq!(code, -32000);
                assert_eq!(message, "capacity exceeded");
            }
            other => panic!("expected an RPC error, got {other:?}"),
        }
    }

    #[test]
    fn missing_api_key_is_an_error() {
        let config = Config::default();
        assert!(matches!(
            AlchemyClient::from_config(&config),
            Err(IndexerError::MissingApiKey)
        ));

        let config = Config { alchemy_api_key: Some(String::new()), ..Default::default() };
        assert!(matches!(
            AlchemyClient::from_config(&config),
            Err(IndexerError::MissingApiKey)
        ));
    }

    #[test]
    fn builds_urls_from_config() {
        let config = Config {
            alchemy_api_key: Some("test-key".to_string()),
            chain: alloy_chains::Chain::base_mainnet(),
            ..Default::default()
        };
        let client = AlchemyClient::from_config(&config).unwrap();
        assert_eq!(
            client.token_url.as_str(),
            "https://base-mainnet.g.alchemy.com/v2/test-key"
        );
        assert_eq!(
            client.nft_url.as_str(),
            "https://base-mainnet.g.alchemy.com/nft/v3/test-key/getNFTsForOwner"
        );
    }
}
