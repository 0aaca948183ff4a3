use std::sync::Arc;

use database::{
    retry_with_backoff, run_migrations, DatabaseConfig, DatabaseError, PlayerDirectory,
    PlayerSnapshot, RetryPolicy, SaveObserver, SaveSlotOrchestrator,
};
use serde_json::Value;
use sqlx::SqlitePool;
use types::{validate_index, validate_payload, ExternalIdentity, Payload};

/// The three operations the protocol layer exposes for one resolved identity.
#[derive(Clone)]
pub struct ProfileService {
    directory: PlayerDirectory,
    orchestrator: SaveSlotOrchestrator,
    retry: RetryPolicy,
}

impl ProfileService {
    pub fn new(pool: SqlitePool, retry: RetryPolicy) -> Self {
        Self {
            directory: PlayerDirectory::new(pool.clone()),
            orchestrator: SaveSlotOrchestrator::new(pool),
            retry,
        }
    }

    pub async fn connect(config: &DatabaseConfig, retry: RetryPolicy) -> Result<Self, DatabaseError> {
        let pool = config.create_pool().await?;
        run_migrations(&pool).await?;
        Ok(Self::new(pool, retry))
    }

    pub fn with_observer(mut self, observer: Arc<dyn SaveObserver>) -> Self {
        self.orchestrator = self.orchestrator.with_observer(observer);
        self
    }

    pub fn pool(&self) -> &SqlitePool {
        self.orchestrator.pool()
    }

    pub async fn get_profile(
        &self,
        identity: &ExternalIdentity,
    ) -> Result<PlayerSnapshot, DatabaseError> {
        let player = self.directory.resolve_or_create(identity).await?;
        self.orchestrator.observe_player(&player).await;
        self.orchestrator.profile(&player).await
    }

    /// Reading never creates a player: an unknown identity has no slots to load.
    pub async fn load_slot(
        &self,
        identity: &ExternalIdentity,
        raw_index: &Value,
    ) -> Result<Payload, DatabaseError> {
        let index = validate_index(raw_index)?;
        match self.directory.find(identity).await? {
            Some(player) => self.orchestrator.load_slot(&player, index).await,
            None => Err(DatabaseError::SlotNotFound(index)),
        }
    }

    /// Saves and returns the refreshed profile. A save that loses a race with a
    /// concurrent writer is sent again according to the retry policy.
    pub async fn save_slot(
        &self,
        identity: &ExternalIdentity,
        raw_index: &Value,
        raw_payload: Option<&Value>,
    ) -> Result<PlayerSnapshot, DatabaseError> {
        let index = validate_index(raw_index)?;
        let payload = validate_payload(raw_payload)?;
        let player = self.directory.resolve_or_create(identity).await?;

        let orchestrator = self.orchestrator.clone();
        let outcome = retry_with_backoff(
            move || {
                let orchestrator = orchestrator.clone();
                let player = player.clone();
                let payload = payload.clone();
                Box::pin(async move { orchestrator.upsert(&player, index, payload).await })
            },
            self.retry,
            DatabaseError::is_retryable,
        )
        .await?;

        Ok(outcome.snapshot)
    }
}
