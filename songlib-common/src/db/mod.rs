//! Database bootstrap and schema management

pub mod init;
pub mod schema_sync;
pub mod table_schemas;

pub use init::*;
pub use schema_sync::*;
pub use table_schemas::*;
