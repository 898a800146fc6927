pub mod info;
pub mod nfts;
pub mod sell;
pub mod tokens;

use alloy_primitives::Address;
use eyre::Result;
use harvest_config::Config;
use harvest_wallets::{WalletOpts, browser::BrowserWalletServer};
use std::time::Duration;

/// Resolves the owner whose holdings a list command shows.
///
/// Order: explicit argument, configured sender (`--from`, `ETH_FROM`, config
/// file), the local wallet's address, a browser wallet connection.
pub(crate) async fn resolve_owner(
    owner: Option<Address>,
    config: &Config,
    wallet: &WalletOpts,
) -> Result<Address> {
    if let Some(owner) = owner {
        return Ok(owner);
    }
    if let Some(sender) = config.sender {
        return Ok(sender);
    }
    if wallet.has_local_signer() {
        return Ok(wallet.signer()?.address());
    }
    if wallet.browser {
        let mut server = BrowserWalletServer::new(
            config.browser_port,
            true,
            Duration::from_secs(config.tx_timeout),
        );
        server.start().await?;
        println!("Waiting for a wallet to connect at {} ...", server.url());
        let connection = server.wait_for_connection(Duration::from_secs(300)).await?;
        server.stop().await?;
        return Ok(connection.address);
    }

    eyre::bail!(
        "no owner address: pass OWNER, set --from (or ETH_FROM), or provide a wallet option"
    )
}
