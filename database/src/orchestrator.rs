use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use sqlx::SqlitePool;
use types::{validate_index, validate_payload, Payload, SlotIndex};

use crate::directory::fetch_player;
use crate::observers::{SaveObserver, SlotSavedEvent};
use crate::store::{SaveSlotDataStore, SaveSlotStore};
use crate::{
    DatabaseError, NoopObserver, PlayerRecord, PlayerSnapshot, SaveOutcome, SavePath, SlotSnapshot,
    SlotState,
};

/// Creates or updates a slot and its payload as one atomic unit.
///
/// Slot states move `Absent -> Complete` on a first save, `SlotOnly -> Complete`
/// when an earlier save left a slot without payload, and `Complete -> Complete`
/// on every later save. Nothing here moves a slot back.
#[derive(Clone)]
pub struct SaveSlotOrchestrator {
    pool: SqlitePool,
    observer: Arc<dyn SaveObserver>,
}

impl SaveSlotOrchestrator {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            observer: Arc::new(NoopObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn SaveObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Validates the raw request values, then runs [`Self::upsert`].
    ///
    /// A validation failure returns before any connection is taken from the pool.
    pub async fn save(
        &self,
        player: &PlayerRecord,
        raw_index: &Value,
        raw_payload: Option<&Value>,
    ) -> Result<SaveOutcome, DatabaseError> {
        let index = validate_index(raw_index)?;
        let payload = validate_payload(raw_payload)?;
        self.upsert(player, index, payload).await
    }

    /// Writes `payload` to slot `index` and returns the player's refreshed view.
    ///
    /// Any error rolls the whole transaction back: the transaction is dropped
    /// uncommitted on every early return. Conflicts with a concurrent writer
    /// are reported, not retried.
    pub async fn upsert(
        &self,
        player: &PlayerRecord,
        index: SlotIndex,
        payload: Payload,
    ) -> Result<SaveOutcome, DatabaseError> {
        let store = SaveSlotStore::for_player(player);
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(DatabaseError::from_transaction)?;

        // Writing first makes SQLite take the write lock at the start of the
        // transaction, so a racing save waits on busy_timeout and then reads
        // the committed slot instead of failing a lock upgrade.
        let touched = sqlx::query("UPDATE players SET updated_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(player.id)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::from_query)?;
        if touched.rows_affected() == 0 {
            return Err(DatabaseError::PlayerNotFound(player.id.to_string()));
        }

        let path = match store.state(&mut *tx, index).await? {
            SlotState::Absent => {
                let slot = store.create(&mut *tx, index).await?;
                SaveSlotDataStore.insert(&mut *tx, &slot, payload).await?;
                SavePath::Created
            }
            SlotState::SlotOnly(mut slot) => {
                tracing::warn!(
                    "Slot {} of player {} has no payload, attaching a new one",
                    index,
                    player.id
                );
                SaveSlotDataStore.insert(&mut *tx, &slot, payload).await?;
                store.touch(&mut *tx, &mut slot).await?;
                SavePath::Repaired
            }
            SlotState::Complete(mut slot, data) => {
                SaveSlotDataStore.overwrite(&mut *tx, data, payload).await?;
                store.touch(&mut *tx, &mut slot).await?;
                SavePath::Overwritten
            }
        };

        tx.commit()
            .await
            .map_err(DatabaseError::from_transaction)?;
        tracing::info!("Saved slot {} for player {} ({:?})", index, player.id, path);
        self.notify(player, index, path).await;

        // The write is durable from here on, even if the re-read fails.
        let snapshot = self.profile(player).await?;

        Ok(SaveOutcome { path, snapshot })
    }

    pub async fn load(
        &self,
        player: &PlayerRecord,
        raw_index: &Value,
    ) -> Result<Payload, DatabaseError> {
        let index = validate_index(raw_index)?;
        self.load_slot(player, index).await
    }

    /// A missing slot and a slot without payload are the same `SlotNotFound`.
    pub async fn load_slot(
        &self,
        player: &PlayerRecord,
        index: SlotIndex,
    ) -> Result<Payload, DatabaseError> {
        let store = SaveSlotStore::for_player(player);
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(DatabaseError::from_transaction)?;
        let state = store.state(&mut *tx, index).await?;
        tx.commit()
            .await
            .map_err(DatabaseError::from_transaction)?;

        match state {
            SlotState::Complete(_, data) => {
                tracing::debug!("Loaded slot {} for player {}", index, player.id);
                Ok(data.payload)
            }
            SlotState::Absent | SlotState::SlotOnly(_) => Err(DatabaseError::SlotNotFound(index)),
        }
    }

    /// Reads the player and all of its slots from one committed snapshot.
    pub async fn profile(&self, player: &PlayerRecord) -> Result<PlayerSnapshot, DatabaseError> {
        let store = SaveSlotStore::for_player(player);
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(DatabaseError::from_transaction)?;
        let fresh = fetch_player(&mut *tx, player.id).await?;
        let slots = store.list_with_data(&mut *tx).await?;
        tx.commit()
            .await
            .map_err(DatabaseError::from_transaction)?;

        Ok(PlayerSnapshot {
            player: fresh,
            slots: slots
                .into_iter()
                .map(|(slot, data)| SlotSnapshot::new(slot, data))
                .collect(),
        })
    }

    /// Tells the observer a profile was requested. Observer failures are only logged.
    pub async fn observe_player(&self, player: &PlayerRecord) {
        if let Err(e) = self.observer.player_resolved(player).await {
            tracing::warn!("Save observer failed for player {}: {}", player.id, e);
        }
    }

    async fn notify(&self, player: &PlayerRecord, index: SlotIndex, path: SavePath) {
        let event = SlotSavedEvent {
            player_id: player.id,
            identity: player.identity.clone(),
            index,
            path,
            saved_at: Utc::now(),
        };
        if let Err(e) = self.observer.slot_saved(&event).await {
            tracing::warn!("Save observer failed for slot {}: {}", index, e);
        }
    }
}
