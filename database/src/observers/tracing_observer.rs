use async_trait::async_trait;

use super::{SaveObserver, SlotSavedEvent};
use crate::{DatabaseError, PlayerRecord};

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

#[async_trait]
impl SaveObserver for TracingObserver {
    async fn slot_saved(&self, event: &SlotSavedEvent) -> Result<(), DatabaseError> {
        tracing::info!(
            player_id = event.player_id,
            identity = %event.identity,
            index = event.index.get(),
            path = ?event.path,
            "slot saved"
        );
        Ok(())
    }

    async fn player_resolved(&self, player: &PlayerRecord) -> Result<(), DatabaseError> {
        tracing::debug!(
            player_id = player.id,
            identity = %player.identity,
            "player resolved"
        );
        Ok(())
    }
}
