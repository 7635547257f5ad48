//! Object id allocator.
//!
//! Every class instance and every native container draws an id when it is
//! created. Ids only give objects an identity for `===` and hashing; they
//! are never reused while the counter moves forward. `dir` and `help`
//! instantiate classes temporarily and roll the counter back afterwards
//! with [`snapshot`] / [`restore`].

use std::cell::Cell;

pub type ObjectId = u64;

thread_local! {
    static NEXT_ID: Cell<ObjectId> = const { Cell::new(1) };
}

/// Saved counter position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IdSnapshot(ObjectId);

/// Allocate the next object id.
#[inline]
pub fn next_id() -> ObjectId {
    NEXT_ID.with(|next| {
        let id = next.get();
        next.set(id + 1);
        id
    })
}

pub fn snapshot() -> IdSnapshot {
    IdSnapshot(NEXT_ID.with(Cell::get))
}

/// Roll the counter back to `snapshot`.
pub fn restore(snapshot: IdSnapshot) {
    NEXT_ID.with(|next| next.set(snapshot.0));
}
