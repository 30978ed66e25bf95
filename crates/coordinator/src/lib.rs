pub mod claimer;
pub mod dispatch;
pub mod heartbeat;
pub mod recovery;
pub mod registry;
pub mod status;

#[cfg(test)]
mod test_utils;

pub use claimer::TaskClaimer;
pub use dispatch::DispatchEngine;
pub use heartbeat::HeartbeatMonitor;
pub use recovery::ClaimRecovery;
pub use registry::{RegisterOutcome, WorkerRegistry};
pub use status::StatusTracker;
