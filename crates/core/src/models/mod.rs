pub mod task;
pub mod worker;

pub use task::{ClaimedTask, LifecycleField, StatusTransition, Task, TaskAssignment, TaskLifecycle};
pub use worker::{WorkerRecord, WorkerRegistration};
