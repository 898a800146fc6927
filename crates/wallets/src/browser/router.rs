use crate::browser::{handlers, state::BrowserWalletState};
use axum::{
    Router,
    routing::{get, post},
};

/// Builds the bridge router.
///
/// The server binds to loopback only and lives for a single CLI invocation,
/// so the API carries no session layer.
pub(crate) fn build_router(state: BrowserWalletState) -> Router {
    let api = Router::new()
        .route("/connection", get(handlers::get_connection).post(handlers::post_connection))
        .route("/transaction/request", get(handlers::get_transaction_request))
        .route("/transaction/response", post(handlers::post_transaction_response))
        .with_state(state);

    Router::new().route("/", get(handlers::serve_index)).nest("/api", api)
}
