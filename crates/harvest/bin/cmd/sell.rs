use alloy_chains::Chain;
use alloy_primitives::{Address, U256, utils::parse_units};
use clap::Parser;
use eyre::Result;
use harvest::{
    contracts::IERC20,
    sale::{Sale, SaleEvent, SaleObserver, SaleReceipt},
    tx::TxSender,
};
use harvest_cli::{
    opts::EthereumOpts,
    utils::{LoadConfig, get_provider},
};
use harvest_common::{fmt::format_eth, term::SpinnerReporter};
use harvest_config::chains;
use yansi::Paint;

/// Sell an asset to the Harvest contract.
#[derive(Debug, Parser)]
pub enum SellSubcommand {
    /// Sell an ERC20 token.
    #[command(visible_alias = "20")]
    Erc20 {
        /// The token contract address.
        token: Address,

        /// The amount to sell, in display units (e.g. `1.5`). Defaults to
        /// the full balance.
        amount: Option<String>,

        /// Sell the full balance (the default when AMOUNT is omitted).
        #[arg(long, conflicts_with = "amount")]
        all: bool,

        #[command(flatten)]
        eth: EthereumOpts,
    },

    /// Sell an ERC721 token.
    #[command(visible_alias = "721")]
    Erc721 {
        /// The token contract address.
        token: Address,

        /// The token id.
        token_id: U256,

        #[command(flatten)]
        eth: EthereumOpts,
    },

    /// Sell units of an ERC1155 token id.
    #[command(visible_alias = "1155")]
    Erc1155 {
        /// The token contract address.
        token: Address,

        /// The token id.
        token_id: U256,

        /// How many units to sell.
        #[arg(default_value = "1")]
        amount: U256,

        #[command(flatten)]
        eth: EthereumOpts,
    },
}

impl SellSubcommand {
    pub async fn run(self) -> Result<()> {
        match self {
            Self::Erc20 { token, amount, all, eth } => {
                let config = eth.load_config()?;
                let provider = get_provider(&config)?;
                let mut sender = TxSender::from_wallet_opts(&config, &eth.wallet).await?;

                let erc20 = IERC20::new(token, &provider);
                let amount = match (all, amount) {
                    (false, Some(amount)) => {
                        let decimals = erc20.decimals().call().await.unwrap_or(18);
                        parse_units(&amount, decimals)?.get_absolute()
                    }
                    (true, _) | (false, None) => erc20.balanceOf(sender.from()).call().await?,
                };
                eyre::ensure!(!amount.is_zero(), "nothing to sell: the amount is zero");

                let mut sale = Sale::new(&provider, &sender, &config);
                let mut progress = Progress::token(config.chain);
                let result = sale.sell_erc20(token, amount, &mut progress).await;
                finish(progress, &mut sender, result).await
            }
            Self::Erc721 { token, token_id, eth } => {
                let config = eth.load_config()?;
                let provider = get_provider(&config)?;
                let mut sender = TxSender::from_wallet_opts(&config, &eth.wallet).await?;

                let mut sale = Sale::new(&provider, &sender, &config);
                let mut progress = Progress::nft(config.chain);
                let result = sale.sell_erc721(token, token_id, &mut progress).await;
                finish(progress, &mut sender, result).await
            }
            Self::Erc1155 { token, token_id, amount, eth } => {
                eyre::ensure!(!amount.is_zero(), "nothing to sell: the amount is zero");
                let config = eth.load_config()?;
                let provider = get_provider(&config)?;
                let mut sender = TxSender::from_wallet_opts(&config, &eth.wallet).await?;

                let mut sale = Sale::new(&provider, &sender, &config);
                let mut progress = Progress::nft(config.chain);
                let result = sale.sell_erc1155(token, token_id, amount, &mut progress).await;
                finish(progress, &mut sender, result).await
            }
        }
    }
}

/// Stops the spinner, shuts the sender down and prints the sale summary.
async fn finish(
    progress: Progress,
    sender: &mut TxSender,
    result: Result<SaleReceipt, harvest::sale::SaleError>,
) -> Result<()> {
    let chain = progress.chain;
    drop(progress);
    sender.shutdown().await?;
    let receipt = result?;

    if let Some(approval) = receipt.approval {
        println!("Approval: {}", chains::explorer_tx_url(chain, approval).dim());
    }
    println!("Sale:     {}", chains::explorer_tx_url(chain, receipt.sale).dim());
    println!(
        "Received: {} ETH ({} gas used)",
        format_eth(receipt.price_wei),
        receipt.gas_used
    );
    Ok(())
}

/// Reports sale progress on a terminal spinner.
struct Progress {
    spinner: SpinnerReporter,
    chain: Chain,
    approving: &'static str,
    selling: &'static str,
    sold: &'static str,
}

impl Progress {
    fn token(chain: Chain) -> Self {
        Self {
            spinner: SpinnerReporter::spawn("Preparing to sell token..."),
            chain,
            approving: "Approving token transfer...",
            selling: "Selling token...",
            sold: "Token sold successfully!",
        }
    }

    fn nft(chain: Chain) -> Self {
        Self {
            spinner: SpinnerReporter::spawn("Preparing to sell NFT..."),
            chain,
            approving: "Approving NFT transfer...",
            selling: "Selling NFT...",
            sold: "NFT sold successfully!",
        }
    }
}

impl SaleObserver for Progress {
    fn on_event(&mut self, event: &SaleEvent) {
        match event {
            SaleEvent::Approving => self.spinner.set_message(self.approving),
            SaleEvent::ApprovalSent(hash) => {
                self.spinner.print_line(format!(
                    "Approval sent: {}",
                    chains::explorer_tx_url(self.chain, *hash)
                ));
            }
            SaleEvent::ApprovalConfirmed(_) => self.spinner.print_line("Approval confirmed."),
            SaleEvent::ApprovalSkipped => {
                self.spinner.print_line("Already approved, skipping the approval transaction.");
            }
            SaleEvent::Selling => self.spinner.set_message(self.selling),
            SaleEvent::SellSent(hash) => {
                self.spinner.print_line(format!(
                    "Sell sent: {}",
                    chains::explorer_tx_url(self.chain, *hash)
                ));
            }
            SaleEvent::Sold(_) => self.spinner.finish(self.sold),
            // The spinner is cleared on drop; the error itself is reported
            // by the command.
            SaleEvent::Failed { .. } => {}
        }
    }
}
