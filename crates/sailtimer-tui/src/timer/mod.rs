pub mod events;
pub mod session;

pub use events::{TimerEvent, TimerEventType};
pub use session::{SessionError, TimerSession};
