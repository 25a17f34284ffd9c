//! Table storage
//!
//! The in-memory table and the file-backed store wrapped around it.
//!
//! # Architecture
//!
//! ```text
//! TableStore
//! ├── Table (headers + identity-keyed rows)
//! ├── Source (path, encoding, delimiter from the sniffer)
//! └── SavePolicy (OnEdit | OnDemand, applied uniformly)
//! ```
//!
//! The store is the only writer of the table; views and edit sessions go
//! through it rather than holding their own copies of row data.

mod model;
mod store;

pub use model::{RowId, Table, TableError};
pub use store::{
    LoadError, PersistError, SavePolicy, Source, StoreError, TableStore, MAX_FILE_SIZE,
};
