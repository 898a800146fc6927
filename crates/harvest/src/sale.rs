//! The approve→sell engine.
//!
//! Every sale is at most two transactions: an approval granting the Harvest
//! contract transfer rights, then the sell call. The approval is skipped
//! when an existing allowance or operator approval already covers the sale.
//! Both transactions are awaited to the configured confirmation depth before
//! the next step runs; a failure at any stage resets the engine without
//! submitting anything further.

use crate::{
    SALE_PRICE_WEI,
    contracts::{IERC20, IERC721, IERC1155, IHarvest},
    tx::TxSender,
};
use alloy_chains::Chain;
use alloy_primitives::{Address, TxHash, U256};
use alloy_provider::PendingTransactionBuilder;
use alloy_rpc_types::TransactionReceipt;
use alloy_sol_types::SolCall;
use harvest_common::provider::RetryProvider;
use harvest_config::{Config, chains};
use std::{fmt, time::Duration};

/// Where the engine currently is in the two-transaction flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SellStage {
    Idle,
    Approving,
    Selling,
}

impl fmt::Display for SellStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Approving => "approval",
            Self::Selling => "sell",
        };
        f.write_str(label)
    }
}

/// Progress notifications emitted while a sale runs.
#[derive(Clone, Debug)]
pub enum SaleEvent {
    Approving,
    ApprovalSent(TxHash),
    ApprovalConfirmed(TxHash),
    ApprovalSkipped,
    Selling,
    SellSent(TxHash),
    Sold(SaleReceipt),
    Failed { stage: SellStage, reason: String },
}

/// Receives [`SaleEvent`]s as the engine advances.
pub trait SaleObserver {
    fn on_event(&mut self, event: &SaleEvent);
}

/// Discards all events.
impl SaleObserver for () {
    fn on_event(&mut self, _event: &SaleEvent) {}
}

/// The outcome of a completed sale.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaleReceipt {
    /// Hash of the approval transaction, `None` when approval was skipped.
    pub approval: Option<TxHash>,
    /// Hash of the sell transaction.
    pub sale: TxHash,
    /// Gas used by the sell transaction.
    pub gas_used: u64,
    /// What the contract paid out.
    pub price_wei: U256,
}

#[derive(Debug, thiserror::Error)]
pub enum SaleError {
    #[error("Harvest is not deployed on {0}. Switch to Ethereum or Base to sell.")]
    NotDeployed(Chain),
    /// The wallet (or its user) rejected a transaction.
    #[error("Transaction cancelled")]
    Cancelled,
    #[error("{0}")]
    Failed(String),
}

/// Messages wallets put in rejection errors, matched case-sensitively.
const REJECTION_MARKERS: &[&str] = &["User rejected", "user rejected", "User denied"];

fn classify(reason: String) -> SaleError {
    if REJECTION_MARKERS.iter().any(|marker| reason.contains(marker)) {
        SaleError::Cancelled
    } else {
        SaleError::Failed(reason)
    }
}

/// Drives approve→sell flows against the Harvest contract.
pub struct Sale<'a> {
    provider: &'a RetryProvider,
    sender: &'a TxSender,
    harvest: Address,
    chain: Chain,
    confirmations: u64,
    timeout: Duration,
    stage: SellStage,
}

impl<'a> Sale<'a> {
    pub fn new(provider: &'a RetryProvider, sender: &'a TxSender, config: &Config) -> Self {
        Self {
            provider,
            sender,
            harvest: config.harvest_address,
            chain: config.chain,
            confirmations: config.confirmations,
            timeout: Duration::from_secs(config.tx_timeout),
            stage: SellStage::Idle,
        }
    }

    pub fn stage(&self) -> SellStage {
        self.stage
    }

    /// Sells `amount` units of an ERC20 token.
    ///
    /// The existing allowance is checked first; when it already covers the
    /// amount the approval transaction is skipped. The approved amount and
    /// the sold amount are always the same.
    pub async fn sell_erc20(
        &mut self,
        token: Address,
        amount: U256,
        observer: &mut dyn SaleObserver,
    ) -> Result<SaleReceipt, SaleError> {
        self.ensure_deployed()?;
        let owner = self.sender.from();

        let allowance = match IERC20::new(token, self.provider)
            .allowance(owner, self.harvest)
            .call()
            .await
        {
            Ok(allowance) => allowance,
            Err(err) => return self.fail(observer, err.to_string()),
        };

        let approval = if allowance >= amount {
            observer.on_event(&SaleEvent::ApprovalSkipped);
            None
        } else {
            let input = IERC20::approveCall { spender: self.harvest, amount }.abi_encode();
            Some(self.approve(observer, token, input).await?)
        };

        let input = IHarvest::sellErc20Call { token, amount }.abi_encode();
        self.sell(observer, approval, input).await
    }

    /// Sells a single ERC721 token.
    pub async fn sell_erc721(
        &mut self,
        token: Address,
        token_id: U256,
        observer: &mut dyn SaleObserver,
    ) -> Result<SaleReceipt, SaleError> {
        self.ensure_deployed()?;
        let owner = self.sender.from();
        let erc721 = IERC721::new(token, self.provider);

        let approved = match erc721.getApproved(token_id).call().await {
            Ok(approved) if approved == self.harvest => true,
            Ok(_) => match erc721.isApprovedForAll(owner, self.harvest).call().await {
                Ok(for_all) => for_all,
                Err(err) => return self.fail(observer, err.to_string()),
            },
            Err(err) => return self.fail(observer, err.to_string()),
        };

        let approval = if approved {
            observer.on_event(&SaleEvent::ApprovalSkipped);
            None
        } else {
            let input = IERC721::approveCall { to: self.harvest, tokenId: token_id }.abi_encode();
            Some(self.approve(observer, token, input).await?)
        };

        let input = IHarvest::sellErc721Call { token, tokenId: token_id }.abi_encode();
        self.sell(observer, approval, input).await
    }

    /// Sells `amount` units of an ERC1155 token id.
    pub async fn sell_erc1155(
        &mut self,
        token: Address,
        token_id: U256,
        amount: U256,
        observer: &mut dyn SaleObserver,
    ) -> Result<SaleReceipt, SaleError> {
        self.ensure_deployed()?;
        let owner = self.sender.from();

        let approved = match IERC1155::new(token, self.provider)
            .isApprovedForAll(owner, self.harvest)
            .call()
            .await
        {
            Ok(for_all) => for_all,
            Err(err) => return self.fail(observer, err.to_string()),
        };

        let approval = if approved {
            observer.on_event(&SaleEvent::ApprovalSkipped);
            None
        } else {
            let input = IERC1155::setApprovalForAllCall {
                operator: self.harvest,
                approved: true,
            }
            .abi_encode();
            Some(self.approve(observer, token, input).await?)
        };

        let input =
            IHarvest::sellErc1155Call { token, tokenId: token_id, amount }.abi_encode();
        self.sell(observer, approval, input).await
    }

    fn ensure_deployed(&self) -> Result<(), SaleError> {
        if chains::is_harvest_deployed(self.chain) {
            Ok(())
        } else {
            Err(SaleError::NotDeployed(self.chain))
        }
    }

    /// Submits an approval to `token` and waits for it to confirm.
    async fn approve(
        &mut self,
        observer: &mut dyn SaleObserver,
        token: Address,
        input: Vec<u8>,
    ) -> Result<TxHash, SaleError> {
        self.transition(SellStage::Approving);
        observer.on_event(&SaleEvent::Approving);

        let hash = match self.sender.send(token, input).await {
            Ok(hash) => hash,
            Err(err) => return self.fail(observer, harvest_common::errors::display_chain(&err)),
        };
        observer.on_event(&SaleEvent::ApprovalSent(hash));
        debug!(target: "harvest::sale", %hash, "approval sent");

        if let Err(reason) = self.wait(hash).await {
            return self.fail(observer, reason);
        }
        observer.on_event(&SaleEvent::ApprovalConfirmed(hash));
        Ok(hash)
    }

    /// Submits the sell call and waits for it to confirm.
    async fn sell(
        &mut self,
        observer: &mut dyn SaleObserver,
        approval: Option<TxHash>,
        input: Vec<u8>,
    ) -> Result<SaleReceipt, SaleError> {
        self.transition(SellStage::Selling);
        observer.on_event(&SaleEvent::Selling);

        let hash = match self.sender.send(self.harvest, input).await {
            Ok(hash) => hash,
            Err(err) => return self.fail(observer, harvest_common::errors::display_chain(&err)),
        };
        observer.on_event(&SaleEvent::SellSent(hash));
        debug!(target: "harvest::sale", %hash, "sell sent");

        let receipt = match self.wait(hash).await {
            Ok(receipt) => receipt,
            Err(reason) => return self.fail(observer, reason),
        };

        self.transition(SellStage::Idle);
        let receipt = SaleReceipt {
            approval,
            sale: hash,
            gas_used: receipt.gas_used,
            price_wei: SALE_PRICE_WEI,
        };
        observer.on_event(&SaleEvent::Sold(receipt.clone()));
        Ok(receipt)
    }

    /// Waits for the receipt through the read provider, so local and browser
    /// submission behave the same.
    async fn wait(&self, hash: TxHash) -> Result<TransactionReceipt, String> {
        let receipt = PendingTransactionBuilder::new(self.provider.clone(), hash)
            .with_required_confirmations(self.confirmations)
            .with_timeout(Some(self.timeout))
            .get_receipt()
            .await
            .map_err(|err| err.to_string())?;
        if !receipt.status() {
            return Err(format!("{} transaction {hash} reverted", self.stage));
        }
        Ok(receipt)
    }

    /// Resets to `Idle` and reports the classified failure. Never submits
    /// anything further.
    fn fail<T>(
        &mut self,
        observer: &mut dyn SaleObserver,
        reason: String,
    ) -> Result<T, SaleError> {
        let stage = self.stage;
        self.stage = SellStage::Idle;
        let error = classify(reason);
        observer.on_event(&SaleEvent::Failed { stage, reason: error.to_string() });
        Err(error)
    }

    fn transition(&mut self, next: SellStage) {
        use SellStage::*;
        debug_assert!(
            matches!(
                (self.stage, next),
                (Idle, Approving) | (Approving, Selling) | (Idle, Selling) | (Selling, Idle)
            ),
            "illegal sale transition {:?} -> {next:?}",
            self.stage,
        );
        self.stage = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_provider::{Provider, ProviderBuilder};
    use alloy_signer_local::PrivateKeySigner;
    use harvest_common::provider::get_http_provider;

    #[derive(Default)]
    struct Recorder(Vec<SaleEvent>);

    impl SaleObserver for Recorder {
        fn on_event(&mut self, event: &SaleEvent) {
            self.0.push(event.clone());
        }
    }

    /// A provider/sender pair pointed at the given node URL.
    fn sale_parts(url: &str) -> (RetryProvider, TxSender) {
        let provider = get_http_provider(url);
        let signer = PrivateKeySigner::random();
        let from = signer.address();
        let wallet_provider =
            ProviderBuilder::new().wallet(signer).connect_http(url.parse().unwrap());
        let sender = TxSender::Local { provider: wallet_provider.erased(), from };
        (provider, sender)
    }

    /// A sale whose provider and sender never get to talk to a network.
    fn offline_sale() -> (RetryProvider, TxSender) {
        sale_parts("http://127.0.0.1:1")
    }

    fn event_names(recorder: &Recorder) -> Vec<&'static str> {
        recorder
            .0
            .iter()
            .map(|event| match event {
                SaleEvent::Approving => "approving",
                SaleEvent::ApprovalSent(_) => "approval-sent",
                SaleEvent::ApprovalConfirmed(_) => "approval-confirmed",
                SaleEvent::ApprovalSkipped => "approval-skipped",
                SaleEvent::Selling => "selling",
                SaleEvent::SellSent(_) => "sell-sent",
                SaleEvent::Sold(_) => "sold",
                SaleEvent::Failed { .. } => "failed",
            })
            .collect()
    }

    const TX_HASH: &str = "0x1111111111111111111111111111111111111111111111111111111111111111";
    const WORD_ZERO: &str =
        "0x0000000000000000000000000000000000000000000000000000000000000000";
    const WORD_MAX: &str =
        "0xffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff";

    /// A single-endpoint JSON-RPC node answering everything the fillers and
    /// the engine ask for, with a fixed `eth_call` word and receipt status.
    async fn mock_node(call_word: &'static str, receipt_status: &'static str) -> String {
        let handler = move |axum::Json(body): axum::Json<serde_json::Value>| async move {
            let bloom = format!("0x{}", "0".repeat(512));
            let result = match body["method"].as_str().unwrap_or_default() {
                "eth_chainId" => serde_json::json!("0x1"),
                "eth_blockNumber" => serde_json::json!("0x64"),
                "eth_getTransactionCount" => serde_json::json!("0x0"),
                "eth_estimateGas" => serde_json::json!("0x5208"),
                "eth_gasPrice" | "eth_maxPriorityFeePerGas" => serde_json::json!("0x3b9aca00"),
                "eth_feeHistory" => serde_json::json!({
                    "oldestBlock": "0x63",
                    "baseFeePerGas": ["0x3b9aca00", "0x3b9aca00"],
                    "gasUsedRatio": [0.5],
                    "reward": [["0x3b9aca00"]],
                }),
                "eth_call" => serde_json::json!(call_word),
                "eth_sendRawTransaction" => serde_json::json!(TX_HASH),
                "eth_getTransactionReceipt" => serde_json::json!({
                    "transactionHash": TX_HASH,
                    "transactionIndex": "0x0",
                    "blockHash": WORD_ZERO,
                    "blockNumber": "0x64",
                    "from": "0x0000000000000000000000000000000000000001",
                    "to": "0x0000000000000000000000000000000000000002",
                    "gasUsed": "0x5208",
                    "cumulativeGasUsed": "0x5208",
                    "effectiveGasPrice": "0x3b9aca00",
                    "contractAddress": null,
                    "logs": [],
                    "logsBloom": bloom,
                    "status": receipt_status,
                    "type": "0x2",
                }),
                "eth_getBlockByNumber" | "eth_getBlockByHash" => serde_json::json!({
                    "hash": WORD_ZERO,
                    "parentHash": WORD_ZERO,
                    "sha3Uncles": WORD_ZERO,
                    "miner": "0x0000000000000000000000000000000000000000",
                    "stateRoot": WORD_ZERO,
                    "transactionsRoot": WORD_ZERO,
                    "receiptsRoot": WORD_ZERO,
                    "logsBloom": bloom,
                    "difficulty": "0x0",
                    "number": "0x64",
                    "gasLimit": "0x1c9c380",
                    "gasUsed": "0x5208",
                    "timestamp": "0x0",
                    "extraData": "0x",
                    "mixHash": WORD_ZERO,
                    "nonce": "0x0000000000000000",
                    "baseFeePerGas": "0x3b9aca00",
                    "size": "0x0",
                    "uncles": [],
                    "transactions": [],
                }),
                _ => serde_json::Value::Null,
            };
            axum::Json(serde_json::json!({
                "jsonrpc": "2.0",
                "id": body["id"],
                "result": result,
            }))
        };
        let app = axum::Router::new().route("/", axum::routing::post(handler));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn sells_erc20_with_an_approval_first() {
        // zero allowance forces the approval transaction
        let url = mock_node(WORD_ZERO, "0x1").await;
        let config = Config::default();
        let (provider, sender) = sale_parts(&url);
        let mut sale = Sale::new(&provider, &sender, &config);
        let mut recorder = Recorder::default();

        let receipt =
            sale.sell_erc20(Address::ZERO, U256::from(5), &mut recorder).await.unwrap();
        assert_eq!(receipt.approval, Some(TX_HASH.parse::<TxHash>().unwrap()));
        assert_eq!(receipt.sale, TX_HASH.parse::<TxHash>().unwrap());
        assert_eq!(receipt.gas_used, 21_000);
        assert_eq!(receipt.price_wei, SALE_PRICE_WEI);
        assert_eq!(sale.stage(), SellStage::Idle);
        assert_eq!(
            event_names(&recorder),
            ["approving", "approval-sent", "approval-confirmed", "selling", "sell-sent", "sold"]
        );
    }

    #[tokio::test]
    async fn skips_the_approval_when_the_allowance_covers_it() {
        let url = mock_node(WORD_MAX, "0x1").await;
        let config = Config::default();
        let (provider, sender) = sale_parts(&url);
        let mut sale = Sale::new(&provider, &sender, &config);
        let mut recorder = Recorder::default();

        let receipt =
            sale.sell_erc20(Address::ZERO, U256::from(5), &mut recorder).await.unwrap();
        assert_eq!(receipt.approval, None);
        assert_eq!(sale.stage(), SellStage::Idle);
        assert_eq!(
            event_names(&recorder),
            ["approval-skipped", "selling", "sell-sent", "sold"]
        );
    }

    #[tokio::test]
    async fn reverted_receipts_fail_the_sale_at_its_stage() {
        let url = mock_node(WORD_MAX, "0x0").await;
        let config = Config::default();
        let (provider, sender) = sale_parts(&url);
        let mut sale = Sale::new(&provider, &sender, &config);
        let mut recorder = Recorder::default();

        let err =
            sale.sell_erc20(Address::ZERO, U256::from(5), &mut recorder).await.unwrap_err();
        assert!(err.to_string().contains("reverted"), "{err}");
        assert_eq!(sale.stage(), SellStage::Idle);

        match recorder.0.last() {
            Some(SaleEvent::Failed { stage, reason }) => {
                assert_eq!(*stage, SellStage::Selling);
                assert!(reason.contains("sell transaction"), "{reason}");
            }
            other => panic!("unexpected final event: {other:?}"),
        }
    }

    #[test]
    fn classifies_wallet_rejections() {
        for reason in ["User rejected the request", "Error: user rejected tx", "User denied"] {
            assert!(matches!(classify(reason.to_string()), SaleError::Cancelled));
        }
        let other = classify("execution reverted".to_string());
        assert_eq!(other.to_string(), "execution reverted");
        assert_eq!(SaleError::Cancelled.to_string(), "Transaction cancelled");
    }

    #[tokio::test]
    async fn refuses_to_sell_on_unsupported_chains() {
        let config = Config { chain: Chain::sepolia(), ..Default::default() };
        let (provider, sender) = offline_sale();
        let mut sale = Sale::new(&provider, &sender, &config);

        let err = sale
            .sell_erc721(Address::ZERO, U256::from(1), &mut ())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Harvest is not deployed on sepolia. Switch to Ethereum or Base to sell."
        );
        assert_eq!(sale.stage(), SellStage::Idle);
    }

    #[test]
    fn legal_transitions_walk_the_machine() {
        let config = Config::default();
        let (provider, sender) = offline_sale();
        let mut sale = Sale::new(&provider, &sender, &config);

        sale.transition(SellStage::Approving);
        sale.transition(SellStage::Selling);
        sale.transition(SellStage::Idle);
        // approval skipped goes straight to selling
        sale.transition(SellStage::Selling);
        assert_eq!(sale.stage(), SellStage::Selling);
    }

    #[test]
    #[should_panic(expected = "illegal sale transition")]
    fn illegal_transition_panics_in_debug() {
        let config = Config::default();
        let (provider, sender) = offline_sale();
        let mut sale = Sale::new(&provider, &sender, &config);

        sale.transition(SellStage::Selling);
        sale.transition(SellStage::Approving);
    }

    #[test]
    fn failure_resets_to_idle_and_reports_the_stage() {
        let config = Config::default();
        let (provider, sender) = offline_sale();
        let mut sale = Sale::new(&provider, &sender, &config);
        let mut recorder = Recorder::default();

        sale.transition(SellStage::Approving);
        let err: Result<(), _> =
            sale.fail(&mut recorder, "User rejected the request".to_string());
        assert!(matches!(err, Err(SaleError::Cancelled)));
        assert_eq!(sale.stage(), SellStage::Idle);

        match recorder.0.as_slice() {
            [SaleEvent::Failed { stage, reason }] => {
                assert_eq!(*stage, SellStage::Approving);
                assert_eq!(reason, "Transaction cancelled");
            }
            other => panic!("unexpected events: {other:?}"),
        }
    }
}
