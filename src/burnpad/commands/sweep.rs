use crate::error::Result;
use crate::store::{NoteStore, SweepReport};

pub fn run<S: NoteStore>(store: &S) -> Result<SweepReport> {
    store.sweep()
}
