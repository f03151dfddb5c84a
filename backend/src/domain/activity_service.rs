use chrono::Utc;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crate::domain::errors::DomainResult;
use crate::domain::session::Session;
use crate::storage::{DocumentStore, DocumentStoreExt, KeyLocks, RecordKey};
use shared::{ActivityEntry, ActivityListResponse};

pub(crate) type ActivityMap = BTreeMap<String, ActivityEntry>;

/// How many entries a pet's activity log keeps. Older entries are dropped
/// at write time, so the stored record itself never grows past this.
pub const MAX_ENTRIES: usize = 5;

/// Service for the "recent activity" feed of completed tasks
#[derive(Clone)]
pub struct ActivityService {
    store: Arc<dyn DocumentStore>,
    locks: KeyLocks,
    session: Session,
}

impl ActivityService {
    pub fn new(store: Arc<dyn DocumentStore>, locks: KeyLocks, session: Session) -> Self {
        Self {
            store,
            locks,
            session,
        }
    }

    fn activity_key(&self, pet_id: &str) -> RecordKey {
        RecordKey::activity(self.session.user_id(), pet_id)
    }

    /// Log one completed task, keeping only the newest [`MAX_ENTRIES`]
    pub async fn record(&self, pet_id: &str, text: &str) -> DomainResult<ActivityEntry> {
        let key = self.activity_key(pet_id);
        let _guard = self.locks.acquire(&key.lock_key()).await;
        let mut entries: ActivityMap = self.store.read_or_default(&key).await?;

        let now = Utc::now();
        let stamp = unused_stamp(&entries, now.timestamp_millis() as u64);
        let entry = ActivityEntry {
            id: ActivityEntry::generate_id(stamp),
            text: text.to_string(),
            recorded_at: now.to_rfc3339(),
        };
        entries.insert(entry.id.clone(), entry.clone());

        trim_to_newest(&mut entries);
        self.store.write(&key, &entries).await?;

        info!("Recorded activity for pet {}: {}", pet_id, entry.text);

        Ok(entry)
    }

    /// The feed, newest first, never longer than [`MAX_ENTRIES`]
    pub async fn recent(&self, pet_id: &str) -> DomainResult<ActivityListResponse> {
        let entries: ActivityMap = self.store.read_or_default(&self.activity_key(pet_id)).await?;

        let mut entries: Vec<ActivityEntry> = entries.into_values().collect();
        entries.sort_by_key(|e| Reverse(entry_stamp(&e.id)));
        entries.truncate(MAX_ENTRIES);

        Ok(ActivityListResponse { entries })
    }
}

/// Stamp encoded in an entry ID; unparseable IDs count as oldest
fn entry_stamp(id: &str) -> u64 {
    ActivityEntry::parse_id(id).unwrap_or(0)
}

fn trim_to_newest(entries: &mut ActivityMap) {
    if entries.len() <= MAX_ENTRIES {
        return;
    }

    let mut ids: Vec<String> = entries.keys().cloned().collect();
    ids.sort_by_key(|id| Reverse(entry_stamp(id)));
    for id in ids.into_iter().skip(MAX_ENTRIES) {
        entries.remove(&id);
    }
}

fn unused_stamp(existing: &ActivityMap, mut stamp: u64) -> u64 {
    while existing.contains_key(&ActivityEntry::generate_id(stamp)) {
        stamp += 1;
    }
    stamp
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::RemoteStore;

    fn setup_test() -> ActivityService {
        let store: Arc<dyn DocumentStore> = Arc::new(RemoteStore::new());
        ActivityService::new(store, KeyLocks::new(), Session::new("user::test"))
    }

    #[tokio::test]
    async fn test_record_and_recent() {
        let service = setup_test();

        let entry = service.record("pet::1", "Give Rex lunch").await.unwrap();
        assert!(entry.id.starts_with("activity::"));
        assert!(!entry.recorded_at.is_empty());

        let entries = service.recent("pet::1").await.unwrap().entries;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].text, "Give Rex lunch");
    }

    #[tokio::test]
    async fn test_recent_is_newest_first() {
        let service = setup_test();

        for text in ["first", "second", "third"] {
            service.record("pet::1", text).await.unwrap();
        }

        let texts: Vec<String> = service
            .recent("pet::1")
            .await
            .unwrap()
            .entries
            .into_iter()
            .map(|e| e.text)
            .collect();
        assert_eq!(texts, vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn test_log_never_exceeds_cap() {
        let service = setup_test();

        for i in 0..9 {
            service
                .record("pet::1", &format!("entry {}", i))
                .await
                .unwrap();

            let entries = service.recent("pet::1").await.unwrap().entries;
            assert!(entries.len() <= MAX_ENTRIES);
        }

        // Only the five newest survive
        let texts: Vec<String> = service
            .recent("pet::1")
            .await
            .unwrap()
            .entries
            .into_iter()
            .map(|e| e.text)
            .collect();
        assert_eq!(
            texts,
            vec!["entry 8", "entry 7", "entry 6", "entry 5", "entry 4"]
        );
    }

    #[tokio::test]
    async fn test_stored_record_trimmed_at_write() {
        let store: Arc<dyn DocumentStore> = Arc::new(RemoteStore::new());
        let session = Session::new("user::test");
        let service = ActivityService::new(store.clone(), KeyLocks::new(), session.clone());

        for i in 0..8 {
            service.record("pet::1", &format!("entry {}", i)).await.unwrap();
        }

        // The persisted map itself holds at most five entries
        let stored: ActivityMap = store
            .read_or_default(&RecordKey::activity(session.user_id(), "pet::1"))
            .await
            .unwrap();
        assert_eq!(stored.len(), MAX_ENTRIES);
    }

    #[tokio::test]
    async fn test_empty_feed() {
        let service = setup_test();
        assert!(service.recent("pet::1").await.unwrap().entries.is_empty());
    }

    #[test]
    fn test_trim_keeps_the_newest() {
        let mut entries = ActivityMap::new();
        for stamp in [100u64, 200, 300, 400, 500, 600, 700] {
            let entry = ActivityEntry {
                id: ActivityEntry::generate_id(stamp),
                text: format!("at {}", stamp),
                recorded_at: String::new(),
            };
            entries.insert(entry.id.clone(), entry);
        }

        trim_to_newest(&mut entries);

        assert_eq!(entries.len(), MAX_ENTRIES);
        assert!(!entries.contains_key(&ActivityEntry::generate_id(100)));
        assert!(!entries.contains_key(&ActivityEntry::generate_id(200)));
        assert!(entries.contains_key(&ActivityEntry::generate_id(700)));
    }
}
