use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use types::{ExternalIdentity, SlotIndex};

use crate::{DatabaseError, PlayerRecord, SavePath};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotSavedEvent {
    pub player_id: i64,
    pub identity: ExternalIdentity,
    pub index: SlotIndex,
    pub path: SavePath,
    pub saved_at: DateTime<Utc>,
}

/// Notified after a save has committed. A failing observer never undoes the save.
#[async_trait]
pub trait SaveObserver: Send + Sync {
    async fn slot_saved(&self, event: &SlotSavedEvent) -> Result<(), DatabaseError>;

    /// Called whenever a profile is requested for `player`.
    async fn player_resolved(&self, _player: &PlayerRecord) -> Result<(), DatabaseError> {
        Ok(())
    }
}
