use crate::cmd::resolve_owner;
use alloy_primitives::Address;
use clap::Parser;
use eyre::Result;
use harvest::indexer::{AlchemyClient, TokenStandard};
use harvest_cli::{opts::EthereumOpts, utils::LoadConfig};
use harvest_config::chains;
use yansi::Paint;

/// List ERC721 and ERC1155 holdings.
#[derive(Debug, Parser)]
pub struct NftsArgs {
    /// The owner to list holdings for. Defaults to the configured sender or
    /// the wallet address.
    owner: Option<Address>,

    /// Print the holdings as JSON.
    #[arg(long, short)]
    json: bool,

    #[command(flatten)]
    eth: EthereumOpts,
}

impl NftsArgs {
    pub async fn run(self) -> Result<()> {
        let config = self.eth.load_config()?;
        let owner = resolve_owner(self.owner, &config, &self.eth.wallet).await?;

        let indexer = AlchemyClient::from_config(&config)?;
        let page = indexer.all_nfts(owner).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&page)?);
            return Ok(());
        }

        if page.owned_nfts.is_empty() {
            println!("No NFTs found");
            return Ok(());
        }

        println!("{} NFTs held by {owner}\n", page.total_count);
        for nft in &page.owned_nfts {
            println!("{} [{}]", nft.display_name().bold(), nft.token_type);
            println!("  Collection: {}", nft.collection_name());
            if nft.token_type == TokenStandard::Erc1155
                && let Some(balance) = &nft.balance
            {
                println!("  Balance:    {balance}");
            }
            println!(
                "  OpenSea:    {}",
                chains::opensea_asset_url(config.chain, nft.contract.address, &nft.token_id).dim()
            );
            println!();
        }
        Ok(())
    }
}
