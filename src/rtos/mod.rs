//! Minimal cooperative run-time: tick-driven task scheduler and system clock

pub mod clock;
pub mod scheduler;
pub mod task;

pub use clock::{ClockTime, SystemClock, DAY_MS};
pub use scheduler::{ScheduleError, Scheduler};
pub use task::{Task, TaskFunction, TaskId};
