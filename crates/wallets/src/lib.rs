//! # harvest-wallets
//!
//! Wallet CLI options and signer construction for the Harvest CLI, plus the
//! browser wallet bridge used to sign through a browser-extension wallet.

pub mod browser;

mod error;
pub use error::{PrivateKeyError, WalletSignerError};

mod raw_wallet;
pub use raw_wallet::RawWalletOpts;

mod signer;
pub use signer::{PendingSigner, WalletSigner};

mod wallet;
pub use wallet::{WalletOpts, validate_from_address};

pub mod utils;
