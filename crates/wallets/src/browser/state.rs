use crate::browser::{
    queue::RequestQueue,
    types::{BrowserTransaction, Connection, TransactionResponse},
};
use parking_lot::Mutex;
use std::sync::Arc;
use uuid::Uuid;

/// Shared state between the bridge server handlers and the CLI side.
#[derive(Clone, Debug)]
pub(crate) struct BrowserWalletState {
    /// Current information about the wallet connection.
    connection: Arc<Mutex<Option<Connection>>>,
    /// Request/response queue for transactions.
    transactions: Arc<Mutex<RequestQueue<BrowserTransaction, TransactionResponse>>>,
}

impl Default for BrowserWalletState {
    fn default() -> Self {
        Self::new()
    }
}

impl BrowserWalletState {
    pub(crate) fn new() -> Self {
        Self {
            connection: Arc::new(Mutex::new(None)),
            transactions: Arc::new(Mutex::new(RequestQueue::new())),
        }
    }

    pub(crate) fn is_connected(&self) -> bool {
        self.connection.lock().is_some()
    }

    pub(crate) fn get_connection(&self) -> Option<Connection> {
        *self.connection.lock()
    }

    pub(crate) fn set_connection(&self, connection: Option<Connection>) {
        *self.connection.lock() = connection;
    }

    pub(crate) fn add_transaction_request(&self, request: BrowserTransaction) {
        self.transactions.lock().add_request(request.id, request);
    }

    pub(crate) fn has_transaction_request(&self, id: &Uuid) -> bool {
        self.transactions.lock().has_request(id)
    }

    pub(crate) fn read_next_transaction_request(&self) -> Option<BrowserTransaction> {
        self.transactions.lock().read_request().cloned()
    }

    pub(crate) fn remove_transaction_request(&self, id: &Uuid) {
        self.transactions.lock().remove_request(id);
    }

    /// Records a response and settles the matching request.
    pub(crate) fn add_transaction_response(&self, response: TransactionResponse) {
        let id = response.id;
        let mut transactions = self.transactions.lock();
        transactions.add_response(id, response);
        transactions.remove_request(&id);
    }

    /// Takes the transaction response, removing it from the queue.
    pub(crate) fn get_transaction_response(&self, id: &Uuid) -> Option<TransactionResponse> {
        self.transactions.lock().get_response(id)
    }
}
