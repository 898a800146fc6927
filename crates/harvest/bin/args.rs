use crate::cmd::{info::InfoArgs, nfts::NftsArgs, sell::SellSubcommand, tokens::TokensArgs};
use clap::{Parser, Subcommand};

/// Sell wallet holdings to the Harvest contract for 1 gwei each.
#[derive(Parser)]
#[command(
    name = "harvest",
    version,
    after_help = "Find more information in the repository: https://github.com/harvest-rs/harvest",
    next_display_order = None
)]
pub struct Harvest {
    #[command(subcommand)]
    pub cmd: HarvestSubcommand,
}

#[derive(Subcommand)]
pub enum HarvestSubcommand {
    /// List ERC20 token holdings.
    #[command(visible_alias = "t")]
    Tokens(TokensArgs),

    /// List ERC721 and ERC1155 holdings.
    #[command(visible_alias = "n")]
    Nfts(NftsArgs),

    /// Sell an asset to the Harvest contract.
    #[command(subcommand, visible_alias = "s")]
    Sell(SellSubcommand),

    /// Show the Harvest contract panel for the active chain.
    #[command(visible_alias = "i")]
    Info(InfoArgs),
}
