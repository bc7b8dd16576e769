use super::{expiry_from, NoteStore, SweepReport};
use crate::error::{NoteError, Result};
use crate::model::{Note, NoteId};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

#[derive(Clone)]
struct Entry {
    note: Note,
    expires_at: DateTime<Utc>,
}

impl Entry {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// In-memory note store.
///
/// Every operation runs under one mutex, which makes `consume` a true
/// get-and-delete: no second caller can observe a read-once note between
/// the read and the removal.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<NoteId, Entry>>,
    simulate_unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with `StoreUnavailable`.
    pub fn set_simulate_unavailable(&self, simulate: bool) {
        self.simulate_unavailable.store(simulate, Ordering::SeqCst);
    }

    /// Number of entries held, live or expired.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entries(&self) -> Result<MutexGuard<'_, HashMap<NoteId, Entry>>> {
        if self.simulate_unavailable.load(Ordering::SeqCst) {
            return Err(NoteError::StoreUnavailable(
                "Simulated store outage".to_string(),
            ));
        }
        self.entries
            .lock()
            .map_err(|_| NoteError::StoreUnavailable("Memory store lock poisoned".to_string()))
    }
}

impl NoteStore for MemoryStore {
    fn put(&self, id: &NoteId, note: &Note, ttl: Duration) -> Result<()> {
        let now = Utc::now();
        let expires_at = expiry_from(now, ttl)?;
        let mut entries = self.entries()?;

        if entries.get(id).is_some_and(|e| e.is_live(now)) {
            tracing::error!(note_id = %id, "Refusing to overwrite live note");
            return Err(NoteError::DuplicateId(*id));
        }

        entries.insert(
            *id,
            Entry {
                note: note.clone(),
                expires_at,
            },
        );
        Ok(())
    }

    fn get(&self, id: &NoteId) -> Result<Option<Note>> {
        let now = Utc::now();
        let entries = self.entries()?;
        Ok(entries
            .get(id)
            .filter(|e| e.is_live(now))
            .map(|e| e.note.clone()))
    }

    fn delete(&self, id: &NoteId) -> Result<()> {
        let mut entries = self.entries()?;
        entries.remove(id);
        Ok(())
    }

    fn consume(&self, id: &NoteId) -> Result<Option<Note>> {
        let now = Utc::now();
        let mut entries = self.entries()?;

        let (live, read_once) = match entries.get(id) {
            None => return Ok(None),
            Some(e) => (e.is_live(now), e.note.is_read_once()),
        };

        if !live {
            entries.remove(id);
            return Ok(None);
        }

        if read_once {
            Ok(entries.remove(id).map(|e| e.note))
        } else {
            Ok(entries.get(id).map(|e| e.note.clone()))
        }
    }

    fn sweep(&self) -> Result<SweepReport> {
        let now = Utc::now();
        let mut entries = self.entries()?;
        let before = entries.len();
        entries.retain(|_, e| e.is_live(now));

        Ok(SweepReport {
            expired_removed: before - entries.len(),
            stale_artifacts_removed: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NoteMode;
    use std::thread;
    use uuid::Uuid;

    const DAY: Duration = Duration::from_secs(86_400);

    fn new_id() -> NoteId {
        NoteId::from_uuid(Uuid::new_v4())
    }

    #[test]
    fn put_then_get_round_trips() {
        let store = MemoryStore::new();
        let id = new_id();
        let note = Note::new(vec![0, 159, 146, 150, 255], NoteMode::Persistent);

        store.put(&id, &note, DAY).unwrap();

        assert_eq!(store.get(&id).unwrap(), Some(note));
    }

    #[test]
    fn empty_payload_round_trips() {
        let store = MemoryStore::new();
        let id = new_id();
        let note = Note::new(Vec::new(), NoteMode::ReadOnce);

        store.put(&id, &note, DAY).unwrap();

        assert_eq!(store.consume(&id).unwrap(), Some(note));
    }

    #[test]
    fn get_does_not_consume_read_once() {
        let store = MemoryStore::new();
        let id = new_id();
        store
            .put(&id, &Note::new(b"x".to_vec(), NoteMode::ReadOnce), DAY)
            .unwrap();

        assert!(store.get(&id).unwrap().is_some());
        assert!(store.get(&id).unwrap().is_some());
    }

    #[test]
    fn consume_removes_read_once_only() {
        let store = MemoryStore::new();
        let once = new_id();
        let kept = new_id();
        store
            .put(&once, &Note::new(b"a".to_vec(), NoteMode::ReadOnce), DAY)
            .unwrap();
        store
            .put(&kept, &Note::new(b"b".to_vec(), NoteMode::Persistent), DAY)
            .unwrap();

        assert!(store.consume(&once).unwrap().is_some());
        assert!(store.consume(&once).unwrap().is_none());
        assert!(store.consume(&kept).unwrap().is_some());
        assert!(store.consume(&kept).unwrap().is_some());
    }

    #[test]
    fn put_refuses_live_duplicate() {
        let store = MemoryStore::new();
        let id = new_id();
        let note = Note::new(b"first".to_vec(), NoteMode::Persistent);
        store.put(&id, &note, DAY).unwrap();

        let err = store
            .put(&id, &Note::new(b"second".to_vec(), NoteMode::Persistent), DAY)
            .unwrap_err();

        assert!(matches!(err, NoteError::DuplicateId(dup) if dup == id));
        assert_eq!(store.get(&id).unwrap(), Some(note));
    }

    #[test]
    fn expired_entries_read_as_absent() {
        let store = MemoryStore::new();
        let id = new_id();
        store
            .put(
                &id,
                &Note::new(b"brief".to_vec(), NoteMode::Persistent),
                Duration::from_millis(20),
            )
            .unwrap();

        thread::sleep(Duration::from_millis(60));

        assert_eq!(store.get(&id).unwrap(), None);
        assert_eq!(store.consume(&id).unwrap(), None);
    }

    #[test]
    fn delete_is_idempotent() {
        let store = MemoryStore::new();
        let id = new_id();
        store.delete(&id).unwrap();
        store
            .put(&id, &Note::new(b"x".to_vec(), NoteMode::Persistent), DAY)
            .unwrap();
        store.delete(&id).unwrap();
        store.delete(&id).unwrap();
        assert_eq!(store.get(&id).unwrap(), None);
    }

    #[test]
    fn sweep_drops_only_expired() {
        let store = MemoryStore::new();
        let short = new_id();
        let long = new_id();
        store
            .put(
                &short,
                &Note::new(b"s".to_vec(), NoteMode::Persistent),
                Duration::from_millis(10),
            )
            .unwrap();
        store
            .put(&long, &Note::new(b"l".to_vec(), NoteMode::Persistent), DAY)
            .unwrap();
        thread::sleep(Duration::from_millis(40));

        let report = store.sweep().unwrap();

        assert_eq!(report.expired_removed, 1);
        assert_eq!(store.len(), 1);
        assert!(store.get(&long).unwrap().is_some());
    }

    #[test]
    fn simulated_outage_surfaces_as_unavailable() {
        let store = MemoryStore::new();
        store.set_simulate_unavailable(true);

        let err = store.get(&new_id()).unwrap_err();
        assert!(err.is_unavailable());

        store.set_simulate_unavailable(false);
        assert!(store.get(&new_id()).is_ok());
    }

    #[test]
    fn concurrent_consume_delivers_once() {
        let store = MemoryStore::new();
        let id = new_id();
        store
            .put(&id, &Note::new(b"secret".to_vec(), NoteMode::ReadOnce), DAY)
            .unwrap();

        let hits: usize = thread::scope(|s| {
            let handles: Vec<_> = (0..50)
                .map(|_| s.spawn(|| store.consume(&id).unwrap()))
                .collect();
            handles
                .into_iter()
                .filter_map(|h| h.join().unwrap())
                .count()
        });

        assert_eq!(hits, 1);
    }
}
