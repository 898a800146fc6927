use crate::browser::{
    page,
    state::BrowserWalletState,
    types::{BrowserApiResponse, BrowserTransaction, Connection, TransactionResponse},
};
use axum::{
    extract::State,
    response::{Html, Json},
};

pub(crate) async fn serve_index() -> Html<&'static str> {
    Html(page::INDEX_HTML)
}

pub(crate) async fn get_connection(
    State(state): State<BrowserWalletState>,
) -> Json<BrowserApiResponse<Connection>> {
    match state.get_connection() {
        Some(connection) => Json(BrowserApiResponse::Ok(connection)),
        None => Json(BrowserApiResponse::error("Wallet not connected")),
    }
}

/// The wallet page posts its connection here; `null` disconnects.
pub(crate) async fn post_connection(
    State(state): State<BrowserWalletState>,
    Json(connection): Json<Option<Connection>>,
) -> Json<BrowserApiResponse<()>> {
    match &connection {
        Some(connection) => {
            tracing::debug!(target: "harvest::browser", address = %connection.address, chain_id = connection.chain_id, "wallet connected");
        }
        None => tracing::debug!(target: "harvest::browser", "wallet disconnected"),
    }
    state.set_connection(connection);
    Json(BrowserApiResponse::Ok(()))
}

pub(crate) async fn get_transaction_request(
    State(state): State<BrowserWalletState>,
) -> Json<BrowserApiResponse<BrowserTransaction>> {
    match state.read_next_transaction_request() {
        Some(request) => Json(BrowserApiResponse::Ok(request)),
        None => Json(BrowserApiResponse::error("No pending transaction")),
    }
}

pub(crate) async fn post_transaction_response(
    State(state): State<BrowserWalletState>,
    Json(response): Json<TransactionResponse>,
) -> Json<BrowserApiResponse<()>> {
    if !state.has_transaction_request(&response.id) {
        return Json(BrowserApiResponse::error("Unknown transaction id"));
    }
    state.add_transaction_response(response);
    Json(BrowserApiResponse::Ok(()))
}
