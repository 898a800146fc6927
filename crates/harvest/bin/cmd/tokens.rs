use crate::cmd::resolve_owner;
use alloy_primitives::Address;
use clap::Parser;
use eyre::Result;
use harvest::indexer::AlchemyClient;
use harvest_cli::{opts::EthereumOpts, utils::LoadConfig};
use harvest_config::chains;
use yansi::Paint;

/// List ERC20 token holdings.
#[derive(Debug, Parser)]
pub struct TokensArgs {
    /// The owner to list holdings for. Defaults to the configured sender or
    /// the wallet address.
    owner: Option<Address>,

    /// Print the holdings as JSON.
    #[arg(long, short)]
    json: bool,

    #[command(flatten)]
    eth: EthereumOpts,
}

impl TokensArgs {
    pub async fn run(self) -> Result<()> {
        let config = self.eth.load_config()?;
        let owner = resolve_owner(self.owner, &config, &self.eth.wallet).await?;

        let indexer = AlchemyClient::from_config(&config)?;
        let holdings = indexer.erc20_holdings(owner).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&holdings)?);
            return Ok(());
        }

        if holdings.is_empty() {
            println!("No ERC20 tokens found");
            return Ok(());
        }

        println!("{} ERC20 tokens held by {owner}\n", holdings.len());
        for holding in &holdings {
            println!("{} ({})", holding.display_name().bold(), holding.display_symbol());
            println!("  Balance:  {}", holding.formatted_balance());
            println!(
                "  Contract: {}",
                chains::explorer_address_url(config.chain, holding.contract_address).dim()
            );
            println!();
        }
        Ok(())
    }
}
