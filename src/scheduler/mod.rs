//! Poll Scheduler
//!
//! Re-fetches slices on fixed intervals. Each poller is owned through a
//! [`PollHandle`]; stopping or dropping the handle cancels the timer.

mod poller;

pub use poller::{PollHandle, Poller, Refresh};
