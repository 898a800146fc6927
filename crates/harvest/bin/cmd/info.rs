use alloy_provider::Provider;
use clap::Parser;
use eyre::Result;
use harvest_cli::{
    opts::EthereumOpts,
    utils::{LoadConfig, get_provider},
};
use harvest_common::fmt::{format_eth, shorten_hex};
use harvest_config::chains;
use yansi::Paint;

/// Show the Harvest contract panel for the active chain.
#[derive(Debug, Parser)]
pub struct InfoArgs {
    #[command(flatten)]
    eth: EthereumOpts,
}

impl InfoArgs {
    pub async fn run(self) -> Result<()> {
        let config = self.eth.load_config()?;
        let provider = get_provider(&config)?;

        let harvest = config.harvest_address;
        let balance = provider.get_balance(harvest).await?;
        let deployed = config.is_harvest_deployed();

        println!("{}", "Harvest Contract".bold());
        println!("  Address: {} ({})", shorten_hex(&harvest), chains::explorer_address_url(config.chain, harvest).dim());
        println!("  Balance: {} ETH", format_eth(balance));
        let status =
            if deployed { "deployed".green().to_string() } else { "not deployed".red().to_string() };
        println!("  Network: {} [{status}]", config.chain);

        if !deployed {
            println!();
            println!(
                "{}",
                format!(
                    "Not deployed on {}. Please switch to Ethereum or Base to use Harvest.",
                    config.chain
                )
                .yellow()
            );
        }

        println!();
        println!("{}", "How it works:".bold());
        println!("  1. Approve the Harvest contract to transfer your token");
        println!("  2. Call the sell function (ERC20, ERC721, or ERC1155)");
        println!("  3. Receive 1 gwei for your token (contract must have ETH)");

        Ok(())
    }
}
