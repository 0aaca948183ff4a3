pub mod config;
pub mod directory;
pub mod error;
pub mod models;
pub mod observers;
pub mod orchestrator;
pub mod retry;
pub mod store;

#[cfg(test)]
mod tests;

pub use config::DatabaseConfig;
pub use directory::PlayerDirectory;
pub use error::{DatabaseError, ErrorKind};
pub use models::{
    PlayerRecord, PlayerSnapshot, SaveOutcome, SavePath, SaveSlotDataRecord, SaveSlotRecord,
    SlotSnapshot, SlotState,
};
pub use observers::{SaveObserver, SlotSavedEvent, TracingObserver};
pub use orchestrator::SaveSlotOrchestrator;
pub use retry::{retry_with_backoff, RetryPolicy};
pub use store::{SaveSlotDataStore, SaveSlotStore};

pub async fn run_migrations(pool: &sqlx::SqlitePool) -> Result<(), DatabaseError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| DatabaseError::Migration(e.to_string()))
}

// NoopObserver for when nothing needs to hear about saves
pub struct NoopObserver;

#[async_trait::async_trait]
impl SaveObserver for NoopObserver {
    async fn slot_saved(&self, _event: &SlotSavedEvent) -> Result<(), DatabaseError> {
        Ok(())
    }
}
