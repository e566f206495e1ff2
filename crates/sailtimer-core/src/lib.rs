pub mod clock;
pub mod engine;
pub mod error;
pub mod format;
pub mod models;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{TickOutcome, TimerEngine};
pub use error::{Error, Result};
