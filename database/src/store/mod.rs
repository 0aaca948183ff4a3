//! Row-level access to slots and their payloads.
//!
//! Every method takes the connection to run on, so the orchestrator can hand in
//! its open transaction and have all reads and writes land in the same unit.

pub mod data;
pub mod slots;

pub use data::SaveSlotDataStore;
pub use slots::SaveSlotStore;

use crate::DatabaseError;

fn column<'r, T>(row: &'r sqlx::sqlite::SqliteRow, name: &str) -> Result<T, DatabaseError>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    use sqlx::Row;
    row.try_get(name).map_err(DatabaseError::from_query)
}
