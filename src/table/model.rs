//! Table data model
//!
//! Headers plus an insertion-ordered mapping from stable row identity to
//! row values. Row order is what the file dictated (plus appends); display
//! order is a view concern and never touches this structure.

use std::collections::HashMap;
use std::fmt;

use uuid::Uuid;

/// Stable identity for a row, independent of display order
///
/// Generated fresh at load and insert time. Positional indices are not
/// identities here: any insert or delete would invalidate them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowId(Uuid);

impl RowId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors for row-level table operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// No row with the given identity
    NotFound(RowId),
    /// Value count does not match the header count
    ArityMismatch { expected: usize, actual: usize },
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "no row with identity {}", id),
            Self::ArityMismatch { expected, actual } => {
                write!(f, "row has {} values, table has {} columns", actual, expected)
            }
        }
    }
}

impl std::error::Error for TableError {}

/// In-memory table: headers and identity-keyed rows
///
/// Invariant: every row has exactly one value per header column, enforced
/// on every insert and update.
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    order: Vec<RowId>,
    rows: HashMap<RowId, Vec<String>>,
}

impl Table {
    /// Create an empty table with no headers and no rows
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty table with the given header set
    pub fn with_headers(headers: Vec<String>) -> Self {
        Self {
            headers,
            order: Vec::new(),
            rows: HashMap::new(),
        }
    }

    /// Ordered column names, established once per load
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Resolve a column name to its index (first match wins)
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    /// Number of data rows (headers excluded)
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: RowId) -> bool {
        self.rows.contains_key(&id)
    }

    /// Values of one row, if the identity is live
    pub fn get(&self, id: RowId) -> Option<&[String]> {
        self.rows.get(&id).map(Vec::as_slice)
    }

    /// Iterate rows in insertion order
    pub fn rows(&self) -> impl Iterator<Item = (RowId, &[String])> {
        self.order
            .iter()
            .filter_map(|id| self.rows.get(id).map(|row| (*id, row.as_slice())))
    }

    fn check_arity(&self, actual: usize) -> Result<(), TableError> {
        if actual != self.headers.len() {
            return Err(TableError::ArityMismatch {
                expected: self.headers.len(),
                actual,
            });
        }
        Ok(())
    }

    /// Append a row, returning its fresh identity
    pub fn insert(&mut self, values: Vec<String>) -> Result<RowId, TableError> {
        self.check_arity(values.len())?;
        let id = RowId::new();
        self.order.push(id);
        self.rows.insert(id, values);
        Ok(id)
    }

    /// Append a row of empty strings, for insert-then-edit flows
    pub fn insert_blank(&mut self) -> RowId {
        let id = RowId::new();
        self.order.push(id);
        self.rows.insert(id, vec![String::new(); self.headers.len()]);
        id
    }

    /// Replace a row's values wholesale
    pub fn update(&mut self, id: RowId, values: Vec<String>) -> Result<(), TableError> {
        if !self.rows.contains_key(&id) {
            return Err(TableError::NotFound(id));
        }
        self.check_arity(values.len())?;
        self.rows.insert(id, values);
        Ok(())
    }

    /// Remove a row, returning its values
    ///
    /// A second delete of the same identity fails with `NotFound` rather
    /// than silently succeeding.
    pub fn delete(&mut self, id: RowId) -> Result<Vec<String>, TableError> {
        let values = self.rows.remove(&id).ok_or(TableError::NotFound(id))?;
        self.order.retain(|existing| *existing != id);
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn sample_table() -> Table {
        let mut table = Table::with_headers(row(&["name", "age"]));
        table.insert(row(&["Alice", "30"])).unwrap();
        table.insert(row(&["Bob", "25"])).unwrap();
        table
    }

    #[test]
    fn test_insert_returns_targetable_identity() {
        let mut table = sample_table();
        let id = table.insert(row(&["Carol", "41"])).unwrap();

        assert_eq!(table.get(id).unwrap(), row(&["Carol", "41"]).as_slice());
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_insert_rejects_wrong_arity() {
        let mut table = sample_table();
        let err = table.insert(row(&["only-one"])).unwrap_err();

        assert_eq!(err, TableError::ArityMismatch { expected: 2, actual: 1 });
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_insert_blank_matches_header_arity() {
        let mut table = sample_table();
        let id = table.insert_blank();

        assert_eq!(table.get(id).unwrap(), row(&["", ""]).as_slice());
    }

    #[test]
    fn test_update_replaces_wholesale() {
        let mut table = sample_table();
        let id = table.rows().next().unwrap().0;

        table.update(id, row(&["Alicia", "31"])).unwrap();
        assert_eq!(table.get(id).unwrap(), row(&["Alicia", "31"]).as_slice());
    }

    #[test]
    fn test_update_missing_identity_fails() {
        let mut table = sample_table();
        let mut other = Table::with_headers(row(&["x"]));
        let foreign = other.insert(row(&["y"])).unwrap();

        assert!(matches!(
            table.update(foreign, row(&["a", "b"])),
            Err(TableError::NotFound(_))
        ));
    }

    #[test]
    fn test_update_rejects_wrong_arity() {
        let mut table = sample_table();
        let id = table.rows().next().unwrap().0;

        let err = table.update(id, row(&["too", "many", "values"])).unwrap_err();
        assert_eq!(err, TableError::ArityMismatch { expected: 2, actual: 3 });
        // Row unchanged on failure
        assert_eq!(table.get(id).unwrap(), row(&["Alice", "30"]).as_slice());
    }

    #[test]
    fn test_delete_twice_fails_second_time() {
        let mut table = sample_table();
        let id = table.rows().next().unwrap().0;

        assert!(table.delete(id).is_ok());
        assert!(matches!(table.delete(id), Err(TableError::NotFound(_))));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_rows_preserve_insertion_order() {
        let mut table = Table::with_headers(row(&["n"]));
        for i in 0..5 {
            table.insert(vec![i.to_string()]).unwrap();
        }

        let values: Vec<&str> = table.rows().map(|(_, r)| r[0].as_str()).collect();
        assert_eq!(values, vec!["0", "1", "2", "3", "4"]);
    }

    #[test]
    fn test_order_stable_across_delete() {
        let mut table = Table::with_headers(row(&["n"]));
        let ids: Vec<RowId> = (0..4)
            .map(|i| table.insert(vec![i.to_string()]).unwrap())
            .collect();

        table.delete(ids[1]).unwrap();
        let values: Vec<&str> = table.rows().map(|(_, r)| r[0].as_str()).collect();
        assert_eq!(values, vec!["0", "2", "3"]);
    }

    #[test]
    fn test_column_index_first_match() {
        let table = Table::with_headers(row(&["a", "b", "a"]));
        assert_eq!(table.column_index("a"), Some(0));
        assert_eq!(table.column_index("b"), Some(1));
        assert_eq!(table.column_index("missing"), None);
    }

    #[test]
    fn test_empty_table_has_no_headers() {
        let table = Table::new();
        assert!(table.is_empty());
        assert!(table.headers().is_empty());
    }
}
