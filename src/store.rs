use crate::model::ReceiptId;
use crate::validation::ValidatedReceipt;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Storage for accepted receipts, keyed by an opaque identifier.
///
/// Implementations must be safe to share across request handlers: concurrent
/// `put` calls each receive a distinct id and none of their entries is lost.
pub trait ReceiptStore: Send + Sync {
    fn put(&self, receipt: ValidatedReceipt) -> ReceiptId;

    fn get(&self, id: &ReceiptId) -> Option<Arc<ValidatedReceipt>>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-local store. Entries live until the process exits.
#[derive(Debug, Default)]
pub struct InMemoryReceiptStore {
    receipts: RwLock<HashMap<ReceiptId, Arc<ValidatedReceipt>>>,
}

impl InMemoryReceiptStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReceiptStore for InMemoryReceiptStore {
    fn put(&self, receipt: ValidatedReceipt) -> ReceiptId {
        let receipt = Arc::new(receipt);
        let mut receipts = self.receipts.write();
        loop {
            let id = ReceiptId(Uuid::new_v4().to_string());
            match receipts.entry(id) {
                Entry::Vacant(slot) => {
                    let id = slot.key().clone();
                    slot.insert(receipt);
                    return id;
                }
                Entry::Occupied(slot) => {
                    debug!(receipt_id = %slot.key(), "receipt id collision, regenerating");
                }
            }
        }
    }

    fn get(&self, id: &ReceiptId) -> Option<Arc<ValidatedReceipt>> {
        self.receipts.read().get(id).cloned()
    }

    fn len(&self) -> usize {
        self.receipts.read().len()
    }
}
