//! Row edit sessions
//!
//! Stages an in-progress edit of a single row and commits or discards it
//! atomically. The one piece of real state-machine logic in the system:
//! a session over a pre-existing row and a session opened on a freshly
//! inserted blank row both accept `commit`, but only the latter deletes
//! its row on `cancel` — a never-confirmed new row must not survive.

use crate::table::{RowId, StoreError, TableError, TableStore};

/// How the session's row came to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowOrigin {
    /// The row was present before the session began
    Existing,
    /// The row was inserted blank when the session began
    Inserted,
}

/// In-progress edit of a single row
///
/// Holds a snapshot of the row's values at session start (the edit dialog
/// pre-fills from it) and is consumed by `commit` or `cancel`.
#[derive(Debug)]
pub struct EditSession {
    row_id: RowId,
    origin: RowOrigin,
    snapshot: Vec<String>,
}

impl EditSession {
    /// Open a session on a pre-existing row
    pub fn begin(store: &TableStore, id: RowId) -> Result<Self, TableError> {
        let snapshot = store
            .table()
            .get(id)
            .ok_or(TableError::NotFound(id))?
            .to_vec();
        Ok(Self {
            row_id: id,
            origin: RowOrigin::Existing,
            snapshot,
        })
    }

    /// Insert a blank row and open a session on it
    pub fn begin_insert(store: &mut TableStore) -> Result<Self, StoreError> {
        let id = store.insert_blank()?;
        let snapshot = vec![String::new(); store.table().column_count()];
        Ok(Self {
            row_id: id,
            origin: RowOrigin::Inserted,
            snapshot,
        })
    }

    pub fn row_id(&self) -> RowId {
        self.row_id
    }

    /// The row's values when the session began
    pub fn snapshot(&self) -> &[String] {
        &self.snapshot
    }

    /// Whether cancelling this session would delete the row
    pub fn is_new(&self) -> bool {
        self.origin == RowOrigin::Inserted
    }

    /// Validate arity and apply the edited values, consuming the session
    pub fn commit(self, store: &mut TableStore, values: Vec<String>) -> Result<(), StoreError> {
        store.update(self.row_id, values)
    }

    /// Discard the session
    ///
    /// A no-op for a pre-existing row; deletes the row when the session
    /// inserted it.
    pub fn cancel(self, store: &mut TableStore) -> Result<(), StoreError> {
        match self.origin {
            RowOrigin::Existing => Ok(()),
            RowOrigin::Inserted => {
                tracing::debug!("cancelled new-row session, removing row {}", self.row_id);
                store.delete(self.row_id)
            }
        }
    }
}
