use crate::{PendingSigner, RawWalletOpts, WalletSigner, utils};
use alloy_primitives::Address;
use clap::Parser;
use eyre::Result;
use serde::Serialize;

/// The wallet options can either be:
/// 1. Raw (via private key / mnemonic / interactive prompt)
/// 2. Keystore (via file path)
/// 3. Browser (via the local wallet bridge and a browser-extension wallet)
#[derive(Clone, Debug, Default, Serialize, Parser)]
#[command(next_help_heading = "Wallet options", about = None, long_about = None)]
pub struct WalletOpts {
    /// The sender account.
    #[arg(long, short, value_name = "ADDRESS", env = "ETH_FROM")]
    #[serde(skip)]
    pub from: Option<Address>,

    /// Sign and send through a browser-extension wallet instead of a local key.
    ///
    /// Starts a local bridge server and waits for a wallet to connect.
    #[arg(long)]
    #[serde(skip)]
    pub browser: bool,

    #[command(flatten)]
    #[serde(flatten)]
    pub raw: RawWalletOpts,

    /// Use the keystore by its filename in the default keystores directory
    /// (~/.harvest/keystores) or by its full path.
    #[arg(
        long = "keystore",
        visible_alias = "keystore-path",
        value_name = "PATH",
        env = "ETH_KEYSTORE"
    )]
    pub keystore_path: Option<String>,

    /// Use a keystore by its account name from the default keystores directory.
    #[arg(
        long = "account",
        value_name = "ACCOUNT_NAME",
        env = "ETH_KEYSTORE_ACCOUNT",
        conflicts_with = "keystore_path"
    )]
    pub keystore_account_name: Option<String>,

    /// The keystore password.
    ///
    /// Used with --keystore.
    #[arg(long = "password", requires = "keystore_path", value_name = "PASSWORD")]
    pub keystore_password: Option<String>,

    /// The keystore password file path.
    ///
    /// Used with --keystore.
    #[arg(
        long = "password-file",
        requires = "keystore_path",
        value_name = "PASSWORD_FILE",
        env = "ETH_PASSWORD"
    )]
    pub keystore_password_file: Option<String>,
}

impl WalletOpts {
    /// Returns the signer configured by these options, prompting where needed.
    ///
    /// Errors if no wallet option was given. The `--browser` path does not go
    /// through here: a browser wallet signs and sends in one step through the
    /// bridge, so it never yields a local signer.
    pub fn signer(&self) -> Result<WalletSigner> {
        tracing::trace!("start finding signer");

        if let Some(private_key) = &self.raw.private_key {
            return utils::create_private_key_signer(private_key.trim());
        }
        if self.raw.interactive {
            return Ok(PendingSigner::Interactive.unlock()?);
        }
        if let Some(mnemonic) = &self.raw.mnemonic {
            return utils::create_mnemonic_signer(
                mnemonic,
                self.raw.mnemonic_passphrase.as_deref(),
                self.raw.hd_path.as_deref(),
                self.raw.mnemonic_index,
            );
        }
        if let Some(path) = utils::maybe_get_keystore_path(
            self.keystore_path.as_deref(),
            self.keystore_account_name.as_deref(),
        )? {
            let (signer, pending) = utils::create_keystore_signer(
                &path,
                self.keystore_password.as_deref(),
                self.keystore_password_file.as_deref(),
            )?;
            return match (signer, pending) {
                (Some(signer), _) => Ok(signer),
                (_, Some(pending)) => Ok(pending.unlock()?),
                (None, None) => unreachable!(),
            };
        }

        eyre::bail!(
            "\
Error accessing local wallet. Did you set a private key, mnemonic or keystore?
Run `harvest sell --help` or use the `--browser` flag to sign with a browser wallet."
        )
    }

    /// Whether any local wallet option was provided.
    pub fn has_local_signer(&self) -> bool {
        self.raw.private_key.is_some()
            || self.raw.interactive
            || self.raw.mnemonic.is_some()
            || self.keystore_path.is_some()
            || self.keystore_account_name.is_some()
    }
}

/// Ensures a `--from` override matches the address the signer will sign with.
pub fn validate_from_address(
    specified_from: Option<Address>,
    signer_address: Address,
) -> Result<()> {
    if let Some(specified_from) = specified_from
        && specified_from != signer_address
    {
        eyre::bail!(
            "\
The specified sender via CLI/env vars does not match the sender derived from the wallet options.
Remove the explicit sender or pass the wallet option that corresponds to {specified_from}."
        )
    }
    Ok(())
}
