//! Transaction submission paths.
//!
//! A sale can be signed locally (private key, mnemonic, keystore) or by a
//! browser-extension wallet through the local bridge. Either way only the
//! hash comes back here; receipt waiting goes through the read provider in
//! the sale engine, so the engine never cares which path submitted.

use alloy_network::TransactionBuilder;
use alloy_primitives::{Address, TxHash};
use alloy_provider::{DynProvider, Provider};
use alloy_rpc_types::TransactionRequest;
use eyre::{Result, WrapErr};
use harvest_common::provider::ProviderBuilder;
use harvest_config::Config;
use harvest_wallets::{
    WalletOpts,
    browser::{BrowserTransaction, BrowserWalletError, BrowserWalletServer},
    validate_from_address,
};
use std::time::Duration;
use uuid::Uuid;

/// How long to wait for a browser wallet to connect to the bridge.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(300);

/// Submits transactions either through a local signer or a browser wallet.
pub enum TxSender {
    /// A wallet-filled provider: fills, signs and sends raw transactions.
    Local { provider: DynProvider, from: Address },
    /// The browser bridge: the wallet extension signs and sends.
    Browser { server: BrowserWalletServer, from: Address },
}

impl TxSender {
    /// Builds the sender the wallet options ask for.
    pub async fn from_wallet_opts(config: &Config, opts: &WalletOpts) -> Result<Self> {
        if opts.browser {
            Self::browser(config, opts.from).await
        } else {
            Self::local(config, opts)
        }
    }

    /// Builds a locally-signing sender from the wallet options.
    pub fn local(config: &Config, opts: &WalletOpts) -> Result<Self> {
        let signer = opts.signer()?;
        let from = signer.address();
        validate_from_address(opts.from, from)?;

        let url = config.rpc_url()?;
        let provider = ProviderBuilder::new(&url).build_with_wallet(signer.into_wallet())?;
        Ok(Self::Local { provider, from })
    }

    /// Starts the browser bridge and waits for a wallet to connect.
    ///
    /// The connected wallet must be on the configured chain; the bridge does
    /// not switch networks for the user.
    pub async fn browser(config: &Config, from: Option<Address>) -> Result<Self> {
        let mut server = BrowserWalletServer::new(
            config.browser_port,
            true,
            Duration::from_secs(config.tx_timeout),
        );
        server.start().await.wrap_err("failed to start the browser wallet bridge")?;
        println!("Waiting for a wallet to connect at {} ...", server.url());

        let connection = server.wait_for_connection(CONNECT_TIMEOUT).await?;
        if connection.chain_id != config.chain.id() {
            return Err(BrowserWalletError::ChainMismatch {
                expected: config.chain.id(),
                actual: connection.chain_id,
            }
            .into());
        }
        validate_from_address(from, connection.address)?;
        println!("Connected: {}", connection.address);

        Ok(Self::Browser { server, from: connection.address })
    }

    /// The address transactions are sent from.
    pub fn from(&self) -> Address {
        match self {
            Self::Local { from, .. } | Self::Browser { from, .. } => *from,
        }
    }

    /// Submits a calldata-carrying transaction to `to`, returning its hash.
    pub async fn send(&self, to: Address, input: Vec<u8>) -> Result<TxHash> {
        let request = TransactionRequest::default()
            .with_from(self.from())
            .with_to(to)
            .with_input(input);

        match self {
            Self::Local { provider, .. } => {
                let pending = provider.send_transaction(request).await?;
                Ok(*pending.tx_hash())
            }
            Self::Browser { server, .. } => {
                let tx = BrowserTransaction { id: Uuid::new_v4(), request };
                Ok(server.request_transaction(tx).await?)
            }
        }
    }

    /// Shuts the browser bridge down, if there is one.
    pub async fn shutdown(&mut self) -> Result<()> {
        if let Self::Browser { server, .. } = self {
            server.stop().await?;
        }
        Ok(())
    }
}
