use alloy_primitives::ChainId;

/// Errors the browser wallet bridge can produce.
#[derive(Debug, thiserror::Error)]
pub enum BrowserWalletError {
    /// No wallet has connected to the bridge yet.
    #[error("browser wallet is not connected")]
    NotConnected,
    /// The wallet (or its user) rejected the request.
    #[error("{operation} rejected: {reason}")]
    Rejected { operation: &'static str, reason: String },
    /// The wallet did not answer within the configured timeout.
    #[error("timed out waiting for the browser wallet")]
    Timeout,
    /// The wallet is connected to a different chain than the one requested.
    #[error(
        "the browser wallet is connected to chain {actual}, but chain {expected} was requested. Switch networks in the wallet and retry."
    )]
    ChainMismatch { expected: ChainId, actual: ChainId },
    /// The wallet answered a transaction without a hash or an error.
    #[error("the browser wallet returned neither a transaction hash nor an error")]
    MissingHash,
    /// The bridge server failed to bind or serve.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
