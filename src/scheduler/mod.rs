mod cron;
mod heap;
mod lock_keeper;
mod options;
mod scheduler;
mod task;
mod time;

pub use heap::TaskId;
pub use options::SchedulerOptions;
pub use scheduler::SchedulerError;
pub use scheduler::TaskScheduler;
pub use task::TaskContext;
pub use task::TaskError;
pub use task::TaskInfo;
pub use task::TaskKind;
pub use task::TaskStatus;
pub use time::Clock;
pub use time::RealClock;
