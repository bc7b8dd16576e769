use crate::config::NotePolicy;
use crate::error::{NoteError, Result};
use crate::keygen::KeyGenerator;
use crate::model::{Note, NoteId, NoteMode};
use crate::store::NoteStore;

pub fn run<S: NoteStore, K: KeyGenerator>(
    store: &S,
    keys: &K,
    policy: &NotePolicy,
    payload: Vec<u8>,
    read_once: bool,
) -> Result<NoteId> {
    if payload.is_empty() {
        return Err(NoteError::InvalidInput("Note cannot be empty".to_string()));
    }
    if payload.len() > policy.max_payload_bytes {
        return Err(NoteError::InvalidInput(format!(
            "Note is {} bytes, the limit is {}",
            payload.len(),
            policy.max_payload_bytes
        )));
    }

    let mode = NoteMode::from_read_once(read_once);
    let id = keys.generate();
    let size = payload.len();
    store.put(&id, &Note::new(payload, mode), policy.ttl_for(mode))?;

    tracing::info!(?mode, size, "Note created");
    Ok(id)
}
