use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use types::{ExternalIdentity, Payload, SlotIndex};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: i64,
    pub identity: ExternalIdentity,
    pub played_in_alpha: bool,
    pub played_in_beta: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveSlotRecord {
    pub id: i64,
    pub player_id: i64,
    pub index: SlotIndex,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveSlotDataRecord {
    pub slot_id: i64,
    pub payload: Payload,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What storage holds for one (player, index) pair.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotState {
    Absent,
    /// A slot row with no payload, left behind by an interrupted save.
    SlotOnly(SaveSlotRecord),
    Complete(SaveSlotRecord, SaveSlotDataRecord),
}

/// Which transition a successful save performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SavePath {
    Created,
    Repaired,
    Overwritten,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotSnapshot {
    pub index: SlotIndex,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub data: Option<Payload>,
}

impl SlotSnapshot {
    pub fn new(slot: SaveSlotRecord, data: Option<SaveSlotDataRecord>) -> Self {
        Self {
            index: slot.index,
            created_at: slot.created_at,
            updated_at: slot.updated_at,
            data: data.map(|d| d.payload),
        }
    }
}

/// A player exported together with every slot and its payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    #[serde(flatten)]
    pub player: PlayerRecord,
    pub slots: Vec<SlotSnapshot>,
}

impl PlayerSnapshot {
    pub fn slot(&self, index: SlotIndex) -> Option<&SlotSnapshot> {
        self.slots.iter().find(|s| s.index == index)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome {
    pub path: SavePath,
    pub snapshot: PlayerSnapshot,
}
