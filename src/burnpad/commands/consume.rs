use crate::error::Result;
use crate::model::NoteId;
use crate::store::NoteStore;

/// Deliver the payload behind `id`, burning read-once notes.
///
/// Returns `Ok(None)` for ids that are malformed, never existed, expired or
/// were already consumed. Callers get no signal telling these apart.
pub fn run<S: NoteStore>(store: &S, id: &str) -> Result<Option<Vec<u8>>> {
    let Ok(id) = id.parse::<NoteId>() else {
        return Ok(None);
    };
    Ok(store.consume(&id)?.map(|note| note.payload))
}
