pub mod identity;
pub mod payload;
pub mod slot_index;
pub mod validation;

pub use identity::ExternalIdentity;
pub use payload::Payload;
pub use slot_index::{SlotIndex, MAX_SLOT_INDEX, MIN_SLOT_INDEX};
pub use validation::{validate_index, validate_payload, Field, ValidationError};
