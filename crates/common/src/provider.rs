//! Commonly used helpers to construct `Provider`s.

use crate::{ALCHEMY_FREE_TIER_CUPS, REQUEST_TIMEOUT};
use alloy_network::EthereumWallet;
use alloy_provider::{DynProvider, Provider, ProviderBuilder as AlloyProviderBuilder, RootProvider};
use alloy_rpc_client::{ClientBuilder, RpcClient};
use alloy_transport::layers::RetryBackoffLayer;
use eyre::{Result, WrapErr};
use std::time::Duration;
use url::Url;

/// Helper type alias for a retrying read-only provider.
pub type RetryProvider = RootProvider;

/// Constructs a retrying provider for the given URL.
///
/// # Panics
///
/// Panics if the URL is invalid.
#[track_caller]
pub fn get_http_provider(url: impl AsRef<str>) -> RetryProvider {
    try_get_http_provider(url).unwrap()
}

/// Constructs a retrying provider for the given URL.
pub fn try_get_http_provider(url: impl AsRef<str>) -> Result<RetryProvider> {
    ProviderBuilder::new(url.as_ref()).build()
}

/// Helper type to construct a `RetryProvider`.
#[derive(Debug)]
pub struct ProviderBuilder {
    // Note: this is a result, so we can easily chain builder calls
    url: Result<Url>,
    max_retry: u32,
    initial_backoff: u64,
    timeout: Duration,
    /// Available compute units per second.
    compute_units_per_second: u64,
}

impl ProviderBuilder {
    /// Creates a new builder instance for the given URL.
    pub fn new(url_str: &str) -> Self {
        // a copy is needed for the next lines to work
        let mut url_str = url_str;

        // invalid url: non-prefixed URL scheme is not allowed, so we prepend the default http
        // prefix
        let storage;
        if url_str.starts_with("localhost:") {
            storage = format!("http://{url_str}");
            url_str = storage.as_str();
        }

        let url =
            Url::parse(url_str).wrap_err_with(|| format!("invalid provider URL: {url_str:?}"));

        Self {
            url,
            max_retry: 8,
            initial_backoff: 800,
            timeout: REQUEST_TIMEOUT,
            compute_units_per_second: ALCHEMY_FREE_TIER_CUPS,
        }
    }

    /// Enables a request timeout.
    ///
    /// The timeout is applied from when the request starts connecting until the
    /// response body has finished.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// How often to retry a failed request.
    pub fn max_retry(mut self, max_retry: u32) -> Self {
        self.max_retry = max_retry;
        self
    }

    /// The starting backoff delay to use after the first failed request.
    pub fn initial_backoff(mut self, initial_backoff: u64) -> Self {
        self.initial_backoff = initial_backoff;
        self
    }

    /// Sets the number of assumed available compute units per second.
    ///
    /// See also <https://docs.alchemy.com/reference/compute-unit-costs>.
    pub fn compute_units_per_second(mut self, compute_units_per_second: u64) -> Self {
        self.compute_units_per_second = compute_units_per_second;
        self
    }

    /// Constructs the `RetryProvider` taking all configs into account.
    pub fn build(self) -> Result<RetryProvider> {
        Ok(RootProvider::new(self.build_client()?))
    }

    /// Constructs a provider that fills and signs transactions with the given wallet
    /// before submitting them over this transport.
    pub fn build_with_wallet(self, wallet: EthereumWallet) -> Result<DynProvider> {
        let client = self.build_client()?;
        Ok(AlloyProviderBuilder::new().wallet(wallet).connect_client(client).erased())
    }

    fn build_client(self) -> Result<RpcClient> {
        let Self { url, max_retry, initial_backoff, timeout, compute_units_per_second } = self;
        let url = url?;

        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let transport = alloy_transport_http::Http::with_client(client, url);
        Ok(ClientBuilder::default()
            .layer(RetryBackoffLayer::new(max_retry, initial_backoff, compute_units_per_second))
            .transport(transport, false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_build_provider_for_http_urls() {
        assert!(try_get_http_provider("https://eth-mainnet.g.alchemy.com/v2/key").is_ok());
        assert!(try_get_http_provider("http://127.0.0.1:8545").is_ok());
        // a bare localhost url gets an http scheme prepended
        assert!(try_get_http_provider("localhost:8545").is_ok());
    }

    #[test]
    fn rejects_invalid_urls() {
        assert!(try_get_http_provider("not a url").is_err());
    }
}
