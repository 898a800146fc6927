use std::collections::{HashMap, VecDeque};
use uuid::Uuid;

/// A FIFO queue of pending requests paired with their out-of-band responses.
///
/// The wallet page reads requests without consuming them; a request is
/// removed when its response arrives or when the waiter gives up.
#[derive(Debug)]
pub(crate) struct RequestQueue<Req, Resp> {
    requests: VecDeque<(Uuid, Req)>,
    responses: HashMap<Uuid, Resp>,
}

impl<Req, Resp> RequestQueue<Req, Resp> {
    pub(crate) fn new() -> Self {
        Self { requests: VecDeque::new(), responses: HashMap::new() }
    }

    pub(crate) fn add_request(&mut self, id: Uuid, request: Req) {
        self.requests.push_back((id, request));
    }

    pub(crate) fn has_request(&self, id: &Uuid) -> bool {
        self.requests.iter().any(|(request_id, _)| request_id == id)
    }

    /// Peeks at the next request without removing it.
    pub(crate) fn read_request(&self) -> Option<&Req> {
        self.requests.front().map(|(_, request)| request)
    }

    pub(crate) fn remove_request(&mut self, id: &Uuid) {
        self.requests.retain(|(request_id, _)| request_id != id);
    }

    pub(crate) fn add_response(&mut self, id: Uuid, response: Resp) {
        self.responses.insert(id, response);
    }

    /// Takes the response for the given id, if it has arrived.
    pub(crate) fn get_response(&mut self, id: &Uuid) -> Option<Resp> {
        self.responses.remove(id)
    }
}
