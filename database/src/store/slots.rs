use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::SqliteConnection;
use types::{Payload, SlotIndex};

use super::{column, SaveSlotDataStore};
use crate::{DatabaseError, PlayerRecord, SaveSlotDataRecord, SaveSlotRecord, SlotState};

/// Slot rows belonging to one player.
#[derive(Debug, Clone, Copy)]
pub struct SaveSlotStore {
    player_id: i64,
}

impl SaveSlotStore {
    pub fn for_player(player: &PlayerRecord) -> Self {
        Self {
            player_id: player.id,
        }
    }

    pub async fn find(
        &self,
        conn: &mut SqliteConnection,
        index: SlotIndex,
    ) -> Result<Option<SaveSlotRecord>, DatabaseError> {
        let row = sqlx::query(
            "SELECT id, player_id, slot_index, created_at, updated_at
             FROM save_slots WHERE player_id = ? AND slot_index = ?",
        )
        .bind(self.player_id)
        .bind(i64::from(index))
        .fetch_optional(&mut *conn)
        .await
        .map_err(DatabaseError::from_query)?;

        row.as_ref().map(slot_from_row).transpose()
    }

    /// Inserts the slot row. A row already present for the same index is a `UniquenessConflict`.
    pub async fn create(
        &self,
        conn: &mut SqliteConnection,
        index: SlotIndex,
    ) -> Result<SaveSlotRecord, DatabaseError> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO save_slots (player_id, slot_index, created_at, updated_at) VALUES (?, ?, ?, ?)",
        )
        .bind(self.player_id)
        .bind(i64::from(index))
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await
        .map_err(|e| match DatabaseError::from_query(e) {
            DatabaseError::UniquenessConflict(_) => DatabaseError::UniquenessConflict(format!(
                "slot {} already exists for player {}",
                index, self.player_id
            )),
            other => other,
        })?;

        Ok(SaveSlotRecord {
            id: result.last_insert_rowid(),
            player_id: self.player_id,
            index,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn touch(
        &self,
        conn: &mut SqliteConnection,
        slot: &mut SaveSlotRecord,
    ) -> Result<(), DatabaseError> {
        let now = Utc::now();
        sqlx::query("UPDATE save_slots SET updated_at = ? WHERE id = ?")
            .bind(now)
            .bind(slot.id)
            .execute(&mut *conn)
            .await
            .map_err(DatabaseError::from_query)?;
        slot.updated_at = now;
        Ok(())
    }

    pub async fn state(
        &self,
        conn: &mut SqliteConnection,
        index: SlotIndex,
    ) -> Result<SlotState, DatabaseError> {
        let Some(slot) = self.find(conn, index).await? else {
            return Ok(SlotState::Absent);
        };

        Ok(match SaveSlotDataStore.find(conn, slot.id).await? {
            Some(data) => SlotState::Complete(slot, data),
            None => SlotState::SlotOnly(slot),
        })
    }

    pub async fn list_with_data(
        &self,
        conn: &mut SqliteConnection,
    ) -> Result<Vec<(SaveSlotRecord, Option<SaveSlotDataRecord>)>, DatabaseError> {
        let rows = sqlx::query(
            "SELECT s.id, s.player_id, s.slot_index, s.created_at, s.updated_at,
                    d.slot_id AS data_slot_id, d.payload,
                    d.created_at AS data_created_at, d.updated_at AS data_updated_at
             FROM save_slots s
             LEFT JOIN save_slot_data d ON d.slot_id = s.id
             WHERE s.player_id = ?
             ORDER BY s.slot_index ASC",
        )
        .bind(self.player_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(DatabaseError::from_query)?;

        rows.iter()
            .map(|row| -> Result<_, DatabaseError> {
                let slot = slot_from_row(row)?;
                let data_slot_id: Option<i64> = column(row, "data_slot_id")?;
                let data = match data_slot_id {
                    Some(slot_id) => {
                        let payload: String = column(row, "payload")?;
                        Some(SaveSlotDataRecord {
                            slot_id,
                            payload: Payload::from_json_str(&payload)?,
                            created_at: column(row, "data_created_at")?,
                            updated_at: column(row, "data_updated_at")?,
                        })
                    }
                    None => None,
                };
                Ok((slot, data))
            })
            .collect()
    }
}

fn slot_from_row(row: &SqliteRow) -> Result<SaveSlotRecord, DatabaseError> {
    let raw_index: i64 = column(row, "slot_index")?;
    let index = SlotIndex::new(raw_index).map_err(|_| {
        DatabaseError::Query(format!("stored slot index {raw_index} is out of range"))
    })?;

    Ok(SaveSlotRecord {
        id: column(row, "id")?,
        player_id: column(row, "player_id")?,
        index,
        created_at: column(row, "created_at")?,
        updated_at: column(row, "updated_at")?,
    })
}
