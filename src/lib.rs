//! Delimit - delimited-text table core
//!
//! This crate provides the data-handling core of a tabular file viewer:
//! format sniffing (encoding + delimiter), an identity-keyed table store
//! with file persistence, derived view projections (search and sort), and
//! row edit sessions. Rendering and event wiring belong to a UI layer and
//! are not part of this crate.

pub mod cli;
pub mod config;
pub mod config_paths;
pub mod edit;
pub mod session;
pub mod sniff;
pub mod table;
pub mod tracing;
pub mod view;

// Re-export commonly used types
pub use edit::EditSession;
pub use sniff::{Delimiter, Encoding};
pub use table::{RowId, SavePolicy, Table, TableStore};
pub use view::{compute_view, View};
