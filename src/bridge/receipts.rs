//! Correlation table for in-flight worklet requests.

use std::collections::HashMap;

use parking_lot::Mutex;

use super::protocol::ReceiptPayload;

/// Maps correlation ids to fulfilled receipt payloads.
///
/// The pump thread is the sole producer; the dispatching caller is the sole
/// consumer per id. Entries are removed on consumption or on timeout so the
/// table stays bounded regardless of worklet behavior.
#[derive(Debug, Default)]
pub struct ReceiptTable {
    inner: Mutex<HashMap<u64, ReceiptPayload>>,
}

impl ReceiptTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the payload for a pending request.
    pub fn fulfill(&self, id: u64, payload: ReceiptPayload) {
        self.inner.lock().insert(id, payload);
    }

    /// Consume and remove the payload for `id`, if it has arrived.
    pub fn take(&self, id: u64) -> Option<ReceiptPayload> {
        self.inner.lock().remove(&id)
    }

    /// Drop any entry for `id`. Called on timeout so a late receipt cannot
    /// linger.
    pub fn discard(&self, id: u64) {
        self.inner.lock().remove(&id);
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_consumes_entry() {
        let table = ReceiptTable::new();
        table.fulfill(1, ReceiptPayload::Ack);

        assert_eq!(table.take(1), Some(ReceiptPayload::Ack));
        assert_eq!(table.take(1), None);
        assert!(table.is_empty());
    }

    #[test]
    fn entries_are_matched_by_id_not_order() {
        let table = ReceiptTable::new();
        table.fulfill(2, ReceiptPayload::Ack);
        table.fulfill(
            1,
            ReceiptPayload::Audio(crate::models::audio::ReadResult::default()),
        );

        assert!(matches!(table.take(1), Some(ReceiptPayload::Audio(_))));
        assert_eq!(table.take(2), Some(ReceiptPayload::Ack));
    }

    #[test]
    fn discard_leaves_no_residual() {
        let table = ReceiptTable::new();
        table.fulfill(5, ReceiptPayload::Ack);
        table.discard(5);
        assert!(table.is_empty());

        // Discarding an id that never arrived is a no-op.
        table.discard(6);
        assert!(table.is_empty());
    }
}
