use eyre::Result;
use harvest_common::provider::{ProviderBuilder, RetryProvider};
use harvest_config::{Config, ExtractConfigError, figment};
use tracing_subscriber::prelude::*;

/// Loads the config by merging a CLI options provider on top of the default
/// figment (defaults, `harvest.toml`, `HARVEST_` env vars).
///
/// Takes `&self` so the options stay usable after loading; commands read
/// their wallet options again once the config is built.
pub trait LoadConfig {
    fn load_config(&self) -> Result<Config, ExtractConfigError>;
}

impl<T> LoadConfig for T
where
    T: figment::Provider + Clone,
{
    fn load_config(&self) -> Result<Config, ExtractConfigError> {
        Config::from_provider(Config::figment().merge(self.clone()))
    }
}

/// Returns a provider builder for the config's active RPC endpoint.
pub fn get_provider_builder(config: &Config) -> Result<ProviderBuilder> {
    let url = config.rpc_url()?;
    Ok(ProviderBuilder::new(&url))
}

/// Returns a retrying provider for the config's active RPC endpoint.
pub fn get_provider(config: &Config) -> Result<RetryProvider> {
    get_provider_builder(config)?.build()
}

/// Initializes a tracing Subscriber for logging
pub fn subscriber() {
    let registry = tracing_subscriber::Registry::default()
        .with(tracing_subscriber::EnvFilter::from_default_env());
    registry.with(tracing_subscriber::fmt::layer()).init()
}

/// Loads a dotenv file, from the cwd and the project root, ignoring potential
/// failure.
///
/// Only loads the `.env` file if it exists, and does not override existing
/// environment variables.
pub fn load_dotenv() {
    let load = |p: &std::path::Path| {
        dotenvy::from_path(p.join(".env")).ok();
    };

    if let Ok(cwd) = std::env::current_dir() {
        load(&cwd);
    }
}
