//! View projection
//!
//! Derives a filtered and/or sorted snapshot of a [`Table`] for display.
//! The projection never mutates the table, owns nothing the table needs,
//! and is recomputed on every search or sort request: identical inputs
//! yield identical output.

use crate::table::{RowId, Table};

/// A derived, read-only ordering of table rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct View {
    entries: Vec<(RowId, Vec<String>)>,
}

impl View {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(identity, row)` pairs in display order
    pub fn iter(&self) -> impl Iterator<Item = (RowId, &[String])> {
        self.entries.iter().map(|(id, row)| (*id, row.as_slice()))
    }

    /// Row identities in display order
    pub fn ids(&self) -> impl Iterator<Item = RowId> + '_ {
        self.entries.iter().map(|(id, _)| *id)
    }
}

/// Project the table under an optional filter and an optional sort
///
/// Filtering is case-insensitive substring containment against every field;
/// an empty query includes every row. Sorting resolves `sort_column` by
/// header name and compares the whole column numerically only when every
/// value parses as a number, lexicographically otherwise — never a
/// row-by-row mix. The sort is stable, so ties keep their prior order.
pub fn compute_view(table: &Table, filter_query: &str, sort_column: Option<&str>) -> View {
    let query = filter_query.trim().to_lowercase();
    let mut entries: Vec<(RowId, Vec<String>)> = table
        .rows()
        .filter(|(_, row)| query.is_empty() || row_matches(row, &query))
        .map(|(id, row)| (id, row.to_vec()))
        .collect();

    if let Some(name) = sort_column {
        match table.column_index(name) {
            Some(column) => sort_entries(&mut entries, column),
            None => {
                tracing::debug!("unknown sort column {:?}, leaving order unchanged", name);
            }
        }
    }

    View { entries }
}

fn row_matches(row: &[String], query: &str) -> bool {
    row.iter().any(|value| value.to_lowercase().contains(query))
}

/// Sort by one column, deciding the comparison mode once for the whole
/// column: numeric when every value parses as `f64`, lexicographic
/// otherwise
fn sort_entries(entries: &mut Vec<(RowId, Vec<String>)>, column: usize) {
    let keys: Option<Vec<f64>> = entries
        .iter()
        .map(|(_, row)| row[column].trim().parse::<f64>().ok())
        .collect();

    match keys {
        Some(keys) => {
            let mut keyed: Vec<(f64, (RowId, Vec<String>))> =
                keys.into_iter().zip(entries.drain(..)).collect();
            keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
            entries.extend(keyed.into_iter().map(|(_, entry)| entry));
        }
        None => entries.sort_by(|a, b| a.1[column].cmp(&b.1[column])),
    }
}
