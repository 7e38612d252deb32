use crate::scheduler::cron::CronSchedule;
use crate::scheduler::time::Clock;
use crate::scheduler::TaskId;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

pub type TaskError = Box<dyn std::error::Error + Send + Sync>;

pub(super) type TaskHandler =
    Arc<dyn Fn(TaskContext) -> Pin<Box<dyn Future<Output = Result<(), TaskError>> + Send>> + Send + Sync>;

pub(super) fn boxed_handler<F, Fut>(handler: F) -> TaskHandler
where
    F: Fn(TaskContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    Arc::new(move |ctx| Box::pin(handler(ctx)))
}

/// Handed to every handler invocation. The token is cancelled when the run exceeds the task
/// timeout or the task is cancelled while running.
#[derive(Clone, Debug)]
pub struct TaskContext {
    task_id: TaskId,
    task_name: String,
    cancellation: CancellationToken,
}

impl TaskContext {
    pub(super) fn new(task_id: TaskId, task_name: String, cancellation: CancellationToken) -> Self {
        TaskContext {
            task_id,
            task_name,
            cancellation,
        }
    }

    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    pub fn task_name(&self) -> &str {
        &self.task_name
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    pub async fn cancelled(&self) {
        self.cancellation.cancelled().await
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TaskStatus {
    /// Waiting in the heap for its next run.
    Pending,
    Running,
    Success,
    Failed,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TaskKind {
    OneShot,
    Interval(Duration),
    Cron(String),
}

/// Point-in-time view of a scheduled task.
#[derive(Clone, Debug)]
pub struct TaskInfo {
    pub id: TaskId,
    pub name: String,
    pub kind: TaskKind,
    pub status: TaskStatus,
    /// `None` while the task is running.
    pub next_run_at: Option<Instant>,
    pub need_lock: bool,
    /// Completed runs, successful or not. Skipped fires do not count.
    pub run_count: u64,
    /// Error of the most recent run, cleared by a successful one.
    pub last_error: Option<String>,
}

pub(super) enum Recurrence {
    Once,
    Every(Duration),
    Cron(CronSchedule),
}

impl Recurrence {
    /// When the task should run next, measured from now. `None` ends the task.
    pub fn next_run<C: Clock>(&self, clock: &C) -> Option<Instant> {
        match self {
            Recurrence::Once => None,
            Recurrence::Every(interval) => Some(clock.now() + *interval),
            Recurrence::Cron(schedule) => {
                let now_utc = clock.utc_now();
                let next_utc = schedule.next_after(&now_utc)?;
                let delay = (next_utc - now_utc).to_std().unwrap_or_else(|_| Duration::from_secs(0));
                Some(clock.now() + delay)
            }
        }
    }

    pub fn kind(&self) -> TaskKind {
        match self {
            Recurrence::Once => TaskKind::OneShot,
            Recurrence::Every(interval) => TaskKind::Interval(*interval),
            Recurrence::Cron(schedule) => TaskKind::Cron(schedule.expression().to_string()),
        }
    }
}

pub(super) struct TaskEntry {
    pub name: String,
    pub handler: TaskHandler,
    pub recurrence: Recurrence,
    pub need_lock: bool,
    pub status: TaskStatus,
    pub next_run_at: Option<Instant>,
    pub run_count: u64,
    pub last_error: Option<String>,
    pub in_flight: Option<CancellationToken>,
}

impl TaskEntry {
    pub fn info(&self, id: TaskId) -> TaskInfo {
        TaskInfo {
            id,
            name: self.name.clone(),
            kind: self.recurrence.kind(),
            status: self.status,
            next_run_at: self.next_run_at,
            need_lock: self.need_lock,
            run_count: self.run_count,
            last_error: self.last_error.clone(),
        }
    }
}
