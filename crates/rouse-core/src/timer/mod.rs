mod countdown;
mod delay;

pub use countdown::{Countdown, CountdownState};
pub use delay::{DelayQueue, TaskId};
