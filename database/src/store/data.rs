use chrono::Utc;
use sqlx::SqliteConnection;
use types::Payload;

use super::column;
use crate::{DatabaseError, SaveSlotDataRecord, SaveSlotRecord};

/// Payload rows, keyed one-to-one by their slot.
#[derive(Debug, Clone, Copy, Default)]
pub struct SaveSlotDataStore;

impl SaveSlotDataStore {
    pub async fn find(
        &self,
        conn: &mut SqliteConnection,
        slot_id: i64,
    ) -> Result<Option<SaveSlotDataRecord>, DatabaseError> {
        let row = sqlx::query(
            "SELECT slot_id, payload, created_at, updated_at FROM save_slot_data WHERE slot_id = ?",
        )
        .bind(slot_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(DatabaseError::from_query)?;

        match row {
            Some(r) => {
                let payload: String = column(&r, "payload")?;
                Ok(Some(SaveSlotDataRecord {
                    slot_id: column(&r, "slot_id")?,
                    payload: Payload::from_json_str(&payload)?,
                    created_at: column(&r, "created_at")?,
                    updated_at: column(&r, "updated_at")?,
                }))
            }
            None => Ok(None),
        }
    }

    pub async fn insert(
        &self,
        conn: &mut SqliteConnection,
        slot: &SaveSlotRecord,
        payload: Payload,
    ) -> Result<SaveSlotDataRecord, DatabaseError> {
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO save_slot_data (slot_id, payload, created_at, updated_at) VALUES (?, ?, ?, ?)",
        )
        .bind(slot.id)
        .bind(payload.to_json_string()?)
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(SaveSlotDataRecord {
            slot_id: slot.id,
            payload,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replaces the stored payload wholesale; nothing from the previous payload survives.
    pub async fn overwrite(
        &self,
        conn: &mut SqliteConnection,
        existing: SaveSlotDataRecord,
        payload: Payload,
    ) -> Result<SaveSlotDataRecord, DatabaseError> {
        let now = Utc::now();
        let result =
            sqlx::query("UPDATE save_slot_data SET payload = ?, updated_at = ? WHERE slot_id = ?")
                .bind(payload.to_json_string()?)
                .bind(now)
                .bind(existing.slot_id)
                .execute(&mut *conn)
                .await
                .map_err(DatabaseError::from_query)?;

        if result.rows_affected() != 1 {
            return Err(DatabaseError::Query(format!(
                "payload for slot {} disappeared during overwrite",
                existing.slot_id
            )));
        }

        Ok(SaveSlotDataRecord {
            payload,
            updated_at: now,
            ..existing
        })
    }
}
