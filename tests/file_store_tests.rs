use burnpad::error::NoteError;
use burnpad::model::{Note, NoteId, NoteMode};
use burnpad::store::fs::FileStore;
use burnpad::store::NoteStore;
use std::fs;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;
use uuid::Uuid;

const DAY: Duration = Duration::from_secs(86_400);

fn setup() -> (TempDir, FileStore) {
    let dir = TempDir::new().unwrap();
    let store = FileStore::new(dir.path().join("notes"));
    (dir, store)
}

fn new_id() -> NoteId {
    NoteId::from_uuid(Uuid::new_v4())
}

fn file_names(store: &FileStore) -> Vec<String> {
    fs::read_dir(store.root())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn test_put_get_round_trip_binary() {
    let (_dir, store) = setup();
    let id = new_id();
    let note = Note::new(vec![0xff, 0x00, b'\n', 0xc3, 0x28], NoteMode::Persistent);

    store.put(&id, &note, DAY).unwrap();

    assert_eq!(store.get(&id).unwrap(), Some(note));
}

#[test]
fn test_empty_payload_round_trips() {
    let (_dir, store) = setup();
    let id = new_id();
    let note = Note::new(Vec::new(), NoteMode::Persistent);

    store.put(&id, &note, DAY).unwrap();

    assert_eq!(store.consume(&id).unwrap(), Some(note));
}

#[test]
fn test_put_leaves_no_temp_files() {
    let (_dir, store) = setup();
    let id = new_id();

    store
        .put(&id, &Note::new(b"atomic".to_vec(), NoteMode::ReadOnce), DAY)
        .unwrap();

    let names = file_names(&store);
    assert_eq!(names, vec![format!("note-{}.note", id)]);
}

#[test]
fn test_put_refuses_to_overwrite() {
    let (_dir, store) = setup();
    let id = new_id();
    let original = Note::new(b"original".to_vec(), NoteMode::Persistent);
    store.put(&id, &original, DAY).unwrap();

    let err = store
        .put(&id, &Note::new(b"intruder".to_vec(), NoteMode::Persistent), DAY)
        .unwrap_err();

    assert!(matches!(err, NoteError::DuplicateId(dup) if dup == id));
    assert_eq!(store.get(&id).unwrap(), Some(original));
    assert_eq!(file_names(&store).len(), 1);
}

#[test]
fn test_put_replaces_expired_occupant() {
    let (_dir, store) = setup();
    let id = new_id();
    store
        .put(
            &id,
            &Note::new(b"old".to_vec(), NoteMode::Persistent),
            Duration::from_millis(10),
        )
        .unwrap();
    thread::sleep(Duration::from_millis(40));

    let fresh = Note::new(b"new".to_vec(), NoteMode::Persistent);
    store.put(&id, &fresh, DAY).unwrap();

    assert_eq!(store.get(&id).unwrap(), Some(fresh));
}

#[test]
fn test_get_never_consumes() {
    let (_dir, store) = setup();
    let id = new_id();
    store
        .put(&id, &Note::new(b"peek".to_vec(), NoteMode::ReadOnce), DAY)
        .unwrap();

    for _ in 0..3 {
        assert!(store.get(&id).unwrap().is_some());
    }
    assert!(store.consume(&id).unwrap().is_some());
    assert!(store.get(&id).unwrap().is_none());
}

#[test]
fn test_consume_read_once_then_gone() {
    let (_dir, store) = setup();
    let id = new_id();
    store
        .put(&id, &Note::new(b"secret".to_vec(), NoteMode::ReadOnce), DAY)
        .unwrap();

    let first = store.consume(&id).unwrap().unwrap();
    assert_eq!(first.payload, b"secret");
    assert_eq!(store.consume(&id).unwrap(), None);
    assert!(file_names(&store).is_empty(), "claim file left behind");
}

#[test]
fn test_consume_persistent_repeatedly() {
    let (_dir, store) = setup();
    let id = new_id();
    store
        .put(&id, &Note::new(b"hello".to_vec(), NoteMode::Persistent), DAY)
        .unwrap();

    for _ in 0..5 {
        assert_eq!(store.consume(&id).unwrap().unwrap().payload, b"hello");
    }
}

#[test]
fn test_expired_note_reads_as_absent() {
    let (_dir, store) = setup();
    let id = new_id();
    store
        .put(
            &id,
            &Note::new(b"brief".to_vec(), NoteMode::Persistent),
            Duration::from_millis(20),
        )
        .unwrap();
    assert!(store.get(&id).unwrap().is_some());

    thread::sleep(Duration::from_millis(60));

    assert_eq!(store.get(&id).unwrap(), None);
    assert_eq!(store.consume(&id).unwrap(), None);
}

#[test]
fn test_delete_is_idempotent() {
    let (_dir, store) = setup();
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
fn test_concurrent_consume_single_winner() {
    let (_dir, store) = setup();
    let id = new_id();
    store
        .put(&id, &Note::new(b"secret".to_vec(), NoteMode::ReadOnce), DAY)
        .unwrap();

    let results: Vec<Option<Note>> = thread::scope(|s| {
        let handles: Vec<_> = (0..50)
            .map(|_| s.spawn(|| store.consume(&id).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let winners: Vec<&Note> = results.iter().flatten().collect();
    assert_eq!(winners.len(), 1);
    assert_eq!(winners[0].payload, b"secret");
}

#[test]
fn test_independent_handles_share_single_winner() {
    // Separate FileStore values over one directory stand in for separate
    // service processes: nothing is shared but the filesystem.
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("notes");
    let writer = FileStore::new(root.clone());
    let id = new_id();
    writer
        .put(&id, &Note::new(b"shared".to_vec(), NoteMode::ReadOnce), DAY)
        .unwrap();

    let delivered: usize = thread::scope(|s| {
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let root = root.clone();
                s.spawn(move || FileStore::new(root).consume(&id).unwrap())
            })
            .collect();
        handles
            .into_iter()
            .filter_map(|h| h.join().unwrap())
            .count()
    });

    assert_eq!(delivered, 1);
}

#[test]
fn test_sweep_removes_expired_and_stale_artifacts() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::new(dir.path().to_path_buf()).with_artifact_grace(Duration::ZERO);
    let expired = new_id();
    let live = new_id();
    store
        .put(
            &expired,
            &Note::new(b"old".to_vec(), NoteMode::ReadOnce),
            Duration::from_millis(5),
        )
        .unwrap();
    store
        .put(&live, &Note::new(b"new".to_vec(), NoteMode::Persistent), DAY)
        .unwrap();
    fs::write(dir.path().join(".tmp-crashed"), b"partial").unwrap();
    fs::write(dir.path().join(format!(".claim-{}-x", new_id())), b"orphan").unwrap();
    thread::sleep(Duration::from_millis(30));

    let report = store.sweep().unwrap();

    assert_eq!(report.expired_removed, 1);
    assert_eq!(report.stale_artifacts_removed, 2);
    assert_eq!(file_names(&store), vec![format!("note-{}.note", live)]);
}

#[test]
fn test_sweep_keeps_fresh_artifacts() {
    let (_dir, store) = setup();
    store
        .put(&new_id(), &Note::new(b"x".to_vec(), NoteMode::Persistent), DAY)
        .unwrap();
    fs::write(store.root().join(".tmp-inflight"), b"writing").unwrap();

    let report = store.sweep().unwrap();

    assert_eq!(report.expired_removed, 0);
    assert_eq!(report.stale_artifacts_removed, 0);
    assert_eq!(file_names(&store).len(), 2);
}

#[test]
fn test_sweep_on_missing_dir_is_empty() {
    let (_dir, store) = setup();
    let report = store.sweep().unwrap();
    assert_eq!(report, Default::default());
}

#[test]
fn test_corrupt_note_is_an_error_not_a_miss() {
    let (_dir, store) = setup();
    let id = new_id();
    fs::create_dir_all(store.root()).unwrap();
    fs::write(store.root().join(format!("note-{}.note", id)), b"garbage").unwrap();

    let err = store.get(&id).unwrap_err();

    assert!(err.is_unavailable());
}
