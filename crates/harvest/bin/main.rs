use clap::Parser;
use eyre::Result;
use harvest_cli::{handler, utils};

mod args;
mod cmd;

use args::{Harvest, HarvestSubcommand};

fn main() -> Result<()> {
    handler::install();
    utils::load_dotenv();
    utils::subscriber();
    let args = Harvest::parse();
    run(args)
}

#[tokio::main]
async fn run(args: Harvest) -> Result<()> {
    match args.cmd {
        HarvestSubcommand::Tokens(cmd) => cmd.run().await,
        HarvestSubcommand::Nfts(cmd) => cmd.run().await,
        HarvestSubcommand::Sell(cmd) => cmd.run().await,
        HarvestSubcommand::Info(cmd) => cmd.run().await,
    }
}
