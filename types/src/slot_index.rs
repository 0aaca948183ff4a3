use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::validation::{Field, ValidationError};

pub const MIN_SLOT_INDEX: u8 = 1;
pub const MAX_SLOT_INDEX: u8 = 5;

/// A save slot position, always within `MIN_SLOT_INDEX..=MAX_SLOT_INDEX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct SlotIndex(u8);

impl SlotIndex {
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        if (MIN_SLOT_INDEX as i64..=MAX_SLOT_INDEX as i64).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ValidationError::new(
                Field::Index,
                format!("must be between {MIN_SLOT_INDEX} and {MAX_SLOT_INDEX}"),
            ))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = SlotIndex> {
        (MIN_SLOT_INDEX..=MAX_SLOT_INDEX).map(SlotIndex)
    }
}

impl TryFrom<i64> for SlotIndex {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SlotIndex> for i64 {
    fn from(index: SlotIndex) -> Self {
        index.0 as i64
    }
}

impl Display for SlotIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
