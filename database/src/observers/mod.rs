pub mod tracing_observer;
pub mod traits;

pub use tracing_observer::TracingObserver;
pub use traits::{SaveObserver, SlotSavedEvent};
