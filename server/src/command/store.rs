//! Process-wide store of live command records
//!
//! Every operation takes the single store lock exactly once, so selection
//! and mutation of a record always happen in one critical section.

use super::error::QueueError;
use super::lifecycle::{LifecycleEvent, Transition};
use super::record::CommandRecord;
use doorlink_shared::{timing, CommandId};
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Temporal cutoffs enforced at read time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Windows {
    /// Delivery eligibility after creation
    pub visibility_ms: u64,
    /// Forced removal after creation
    pub retention_ms: u64,
}

impl Default for Windows {
    fn default() -> Self {
        Self {
            visibility_ms: timing::VISIBILITY_WINDOW_MS,
            retention_ms: timing::RETENTION_WINDOW_MS,
        }
    }
}

/// Owns all command records
pub struct CommandStore {
    windows: Windows,
    records: Mutex<HashMap<CommandId, CommandRecord>>,
}

impl CommandStore {
    pub fn new(windows: Windows) -> Self {
        Self {
            windows,
            records: Mutex::new(HashMap::new()),
        }
    }

    /// Add a new record
    pub async fn insert(&self, record: CommandRecord) -> Result<(), QueueError> {
        let mut records = self.records.lock().await;
        if records.contains_key(&record.id) {
            return Err(QueueError::DuplicateId(record.id));
        }
        records.insert(record.id.clone(), record);
        Ok(())
    }

    pub async fn get(&self, id: &CommandId) -> Result<CommandRecord, QueueError> {
        self.records
            .lock()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| QueueError::NotFound(id.clone()))
    }

    /// Delete a record; absent ids are not an error
    pub async fn remove(&self, id: &CommandId) -> Option<CommandRecord> {
        self.records.lock().await.remove(id)
    }

    /// Records still eligible for delivery, in issue order
    pub async fn list_undelivered(&self, now_ms: u64) -> Vec<CommandRecord> {
        let records = self.records.lock().await;
        let mut eligible: Vec<CommandRecord> = records
            .values()
            .filter(|r| r.is_deliverable(now_ms, self.windows.visibility_ms))
            .cloned()
            .collect();
        eligible.sort_by_key(|r| r.seq);
        eligible
    }

    /// Select the earliest issued eligible record and mark it delivered
    pub async fn claim_next(&self, now_ms: u64) -> Option<CommandRecord> {
        let mut records = self.records.lock().await;

        let next_id = records
            .values()
            .filter(|r| r.is_deliverable(now_ms, self.windows.visibility_ms))
            .min_by_key(|r| r.seq)
            .map(|r| r.id.clone())?;

        let record = records.get_mut(&next_id)?;
        match record.apply(LifecycleEvent::Deliver) {
            Transition::Moved(_) => Some(record.clone()),
            _ => None,
        }
    }

    /// Apply a lifecycle event to one record
    ///
    /// Returns the record as it looked right after the event, even when the
    /// transition removed it from the store.
    pub async fn apply(
        &self,
        id: &CommandId,
        event: LifecycleEvent,
    ) -> Result<(CommandRecord, Transition), QueueError> {
        let mut records = self.records.lock().await;
        let record = records
            .get_mut(id)
            .ok_or_else(|| QueueError::NotFound(id.clone()))?;

        let transition = record.apply(event);
        let after = record.clone();

        if transition == Transition::Removed {
            records.remove(id);
        }

        Ok((after, transition))
    }

    /// Remove every record past the retention window
    pub async fn sweep_expired(&self, now_ms: u64) -> usize {
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|_, r| !r.is_expired(now_ms, self.windows.retention_ms));
        before - records.len()
    }

    /// Clone of every record, in no particular order
    pub async fn snapshot(&self) -> Vec<CommandRecord> {
        self.records.lock().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

impl Default for CommandStore {
    fn default() -> Self {
        Self::new(Windows::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doorlink_shared::{CommandKind, Outcome};

    fn record(created_at: u64, seq: u64) -> CommandRecord {
        CommandRecord::new(
            CommandId::new(created_at, seq),
            seq,
            CommandKind::Deactivate,
            1,
            None,
            created_at,
        )
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = CommandStore::default();
        let r = record(1_000, 1);
        store.insert(r.clone()).await.unwrap();

        assert_eq!(store.get(&r.id).await.unwrap(), r);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let store = CommandStore::default();
        store.insert(record(1_000, 1)).await.unwrap();

        let err = store.insert(record(1_000, 1)).await.unwrap_err();
        assert_eq!(err, QueueError::DuplicateId(CommandId::new(1_000, 1)));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_unknown_is_not_found() {
        let store = CommandStore::default();
        let id = CommandId::from("missing");
        assert_eq!(store.get(&id).await, Err(QueueError::NotFound(id)));
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let store = CommandStore::default();
        let r = record(1_000, 1);
        store.insert(r.clone()).await.unwrap();

        assert!(store.remove(&r.id).await.is_some());
        assert!(store.remove(&r.id).await.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_list_undelivered_in_insertion_order() {
        let store = CommandStore::default();
        store.insert(record(1_000, 1)).await.unwrap();
        store.insert(record(1_005, 3)).await.unwrap();
        store.insert(record(1_005, 2)).await.unwrap();

        let seqs: Vec<u64> = store
            .list_undelivered(2_000)
            .await
            .iter()
            .map(|r| r.seq)
            .collect();
        assert_eq!(seqs, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_order_follows_seq_not_timestamp() {
        let store = CommandStore::default();
        // Wall clock stepped back between the two issues
        store.insert(record(1_000_000, 1)).await.unwrap();
        store.insert(record(999_000, 2)).await.unwrap();

        let seqs: Vec<u64> = store
            .list_undelivered(1_001_000)
            .await
            .iter()
            .map(|r| r.seq)
            .collect();
        assert_eq!(seqs, vec![1, 2]);
        assert_eq!(store.claim_next(1_001_000).await.unwrap().seq, 1);
    }

    #[tokio::test]
    async fn test_list_undelivered_respects_visibility() {
        let store = CommandStore::default();
        store.insert(record(0, 1)).await.unwrap();
        store.insert(record(30_000, 2)).await.unwrap();

        let visible = store.list_undelivered(61_000).await;
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].seq, 2);
        // Still physically stored
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_claim_next_marks_delivered() {
        let store = CommandStore::default();
        store.insert(record(1_000, 1)).await.unwrap();
        store.insert(record(2_000, 2)).await.unwrap();

        let first = store.claim_next(3_000).await.unwrap();
        assert_eq!(first.seq, 1);
        assert!(first.delivered);

        let second = store.claim_next(3_000).await.unwrap();
        assert_eq!(second.seq, 2);

        assert!(store.claim_next(3_000).await.is_none());
        assert!(store.list_undelivered(3_000).await.is_empty());
    }

    #[tokio::test]
    async fn test_apply_success_removes() {
        let store = CommandStore::default();
        let r = record(1_000, 1);
        store.insert(r.clone()).await.unwrap();

        let (after, transition) = store.apply(&r.id, LifecycleEvent::AckSuccess).await.unwrap();
        assert_eq!(transition, Transition::Removed);
        assert_eq!(after.outcome, Outcome::Confirmed);
        assert!(store.get(&r.id).await.is_err());
    }

    #[tokio::test]
    async fn test_apply_unknown_is_not_found() {
        let store = CommandStore::default();
        let id = CommandId::from("gone");
        let err = store.apply(&id, LifecycleEvent::AckSuccess).await.unwrap_err();
        assert_eq!(err, QueueError::NotFound(id));
    }

    #[tokio::test]
    async fn test_sweep_expired() {
        let store = CommandStore::default();
        store.insert(record(0, 1)).await.unwrap();
        store.insert(record(100_000, 2)).await.unwrap();

        assert_eq!(store.sweep_expired(299_999).await, 0);
        assert_eq!(store.sweep_expired(300_000).await, 1);
        assert_eq!(store.sweep_expired(300_000).await, 0);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_claims_never_share_a_record() {
        let store = std::sync::Arc::new(CommandStore::default());
        for seq in 1..=3 {
            store.insert(record(1_000 + seq, seq)).await.unwrap();
        }

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move { store.claim_next(2_000).await }));
        }

        let mut claimed = Vec::new();
        for handle in handles {
            if let Some(r) = handle.await.unwrap() {
                claimed.push(r.id);
            }
        }
        assert_eq!(claimed.len(), 3);

        let mut unique = claimed.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 3);
    }
}
