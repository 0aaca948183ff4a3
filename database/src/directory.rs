use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use types::ExternalIdentity;

use crate::{DatabaseError, PlayerRecord};

const SELECT_PLAYER_BY_IDENTITY: &str = "SELECT id, identity, played_in_alpha, played_in_beta, created_at, updated_at
     FROM players WHERE identity = ?";
const SELECT_PLAYER_BY_ID: &str = "SELECT id, identity, played_in_alpha, played_in_beta, created_at, updated_at
     FROM players WHERE id = ?";

/// Maps external identities to exactly one player row each.
#[derive(Debug, Clone)]
pub struct PlayerDirectory {
    pool: SqlitePool,
}

impl PlayerDirectory {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find(
        &self,
        identity: &ExternalIdentity,
    ) -> Result<Option<PlayerRecord>, DatabaseError> {
        let row = sqlx::query(SELECT_PLAYER_BY_IDENTITY)
            .bind(identity.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        row.as_ref().map(player_from_row).transpose()
    }

    /// Returns the player for `identity`, creating it with default flags on first access.
    ///
    /// Two callers racing on the first access both end up with the same row: the
    /// insert that loses is ignored and the winner's row is read back.
    pub async fn resolve_or_create(
        &self,
        identity: &ExternalIdentity,
    ) -> Result<PlayerRecord, DatabaseError> {
        if let Some(player) = self.find(identity).await? {
            return Ok(player);
        }

        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO players (identity, created_at, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(identity) DO NOTHING",
        )
        .bind(identity.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        if result.rows_affected() > 0 {
            tracing::info!(
                "Created player {} for identity {}",
                result.last_insert_rowid(),
                identity
            );
        } else {
            tracing::debug!("Player for identity {} was created concurrently", identity);
        }

        self.find(identity)
            .await?
            .ok_or_else(|| DatabaseError::PlayerNotFound(identity.to_string()))
    }
}

pub(crate) async fn fetch_player(
    conn: &mut SqliteConnection,
    player_id: i64,
) -> Result<PlayerRecord, DatabaseError> {
    let row = sqlx::query(SELECT_PLAYER_BY_ID)
        .bind(player_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(DatabaseError::from_query)?;

    match row {
        Some(r) => player_from_row(&r),
        None => Err(DatabaseError::PlayerNotFound(player_id.to_string())),
    }
}

fn player_from_row(row: &SqliteRow) -> Result<PlayerRecord, DatabaseError> {
    let identity: String = row.try_get("identity").map_err(DatabaseError::from_query)?;
    Ok(PlayerRecord {
        id: row.try_get("id").map_err(DatabaseError::from_query)?,
        identity: ExternalIdentity::new(identity),
        played_in_alpha: row
            .try_get("played_in_alpha")
            .map_err(DatabaseError::from_query)?,
        played_in_beta: row
            .try_get("played_in_beta")
            .map_err(DatabaseError::from_query)?,
        created_at: row.try_get("created_at").map_err(DatabaseError::from_query)?,
        updated_at: row.try_get("updated_at").map_err(DatabaseError::from_query)?,
    })
}
