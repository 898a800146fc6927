use crate::error::WalletSignerError;
use alloy_network::EthereumWallet;
use alloy_primitives::Address;
use alloy_signer_local::{MnemonicBuilder, PrivateKeySigner, coins_bip39::English};
use std::path::PathBuf;

type Result<T> = std::result::Result<T, WalletSignerError>;

/// A signer with its private key available in memory.
#[derive(Clone, Debug)]
pub enum WalletSigner {
    /// A wallet instantiated with a locally stored private key.
    Local(PrivateKeySigner),
}

impl WalletSigner {
    /// Creates a signer from the given mnemonic parameters.
    pub fn from_mnemonic(
        mnemonic: &str,
        passphrase: Option<&str>,
        derivation_path: Option<&str>,
        index: u32,
    ) -> Result<Self> {
        let mut builder = MnemonicBuilder::<English>::default().phrase(mnemonic);

        if let Some(passphrase) = passphrase {
            builder = builder.password(passphrase)
        }

        builder = if let Some(hd_path) = derivation_path {
            builder.derivation_path(hd_path)?
        } else {
            builder.index(index)?
        };

        Ok(Self::Local(builder.build()?))
    }

    /// The address this signer signs for.
    pub fn address(&self) -> Address {
        match self {
            Self::Local(inner) => inner.address(),
        }
    }

    /// Converts the signer into a network wallet that can fill transactions.
    pub fn into_wallet(self) -> EthereumWallet {
        match self {
            Self::Local(inner) => EthereumWallet::from(inner),
        }
    }
}

/// Signers that require user action to be unlocked.
#[derive(Debug)]
pub enum PendingSigner {
    Keystore(PathBuf),
    Interactive,
}

impl PendingSigner {
    /// Unlocks the pending signer, prompting the user for the secret.
    pub fn unlock(self) -> Result<WalletSigner> {
        match self {
            Self::Keystore(path) => {
                let password = rpassword::prompt_password("Enter keystore password:")?;
                let signer = PrivateKeySigner::decrypt_keystore(path, password)
                    .map_err(|_| WalletSignerError::IncorrectKeystorePassword)?;
                Ok(WalletSigner::Local(signer))
            }
            Self::Interactive => {
                let private_key = rpassword::prompt_password("Enter private key:")?;
                let private_key = private_key.trim();
                let private_key = private_key.strip_prefix("0x").unwrap_or(private_key);
                Ok(WalletSigner::Local(private_key.parse()?))
            }
        }
    }
}
