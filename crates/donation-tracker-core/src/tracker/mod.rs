mod clock;
mod countdown;
mod engine;
mod reminder;
mod shared;
mod ticker;

pub use clock::{Clock, FixedClock, SystemClock};
pub use countdown::{derive_countdown, Countdown};
pub use engine::{CycleSnapshot, CycleState, CycleTracker};
pub use reminder::Reminder;
pub use shared::{SharedTracker, TICK_PERIOD};
pub use ticker::TickerHandle;
