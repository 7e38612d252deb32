use crate::scheduler::cron::CronSchedule;
use crate::scheduler::heap::TaskHeap;
use crate::scheduler::lock_keeper::{ClusterLock, LockKeeper};
use crate::scheduler::options::SchedulerOptionsValidated;
use crate::scheduler::task::{self, Recurrence, TaskEntry, TaskHandler};
use crate::scheduler::time::{Clock, RealClock};
use crate::scheduler::{SchedulerOptions, TaskContext, TaskError, TaskId, TaskInfo, TaskStatus};
use crate::services::{LockError, LockProvider};
use std::collections::HashMap;
use std::convert::TryFrom;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("Invalid cron expression '{expression}': {reason}")]
    InvalidCron { expression: String, reason: String },

    #[error("Interval must be greater than zero")]
    InvalidInterval,

    #[error("Invalid scheduler options: {0}")]
    InvalidOptions(&'static str),

    #[error("Scheduler is already started")]
    AlreadyStarted,

    #[error("Scheduler has been stopped")]
    Stopped,

    #[error("Failed to set up cluster lock: {0}")]
    Lock(#[from] LockError),
}

/// Runs one-shot, fixed-interval and cron tasks off a single timer.
///
/// Tasks wait in a min-heap ordered by their next run time. The timer sleeps until the earliest
/// deadline, pops every task that is due and hands each one to its own tokio task, so a slow
/// handler never holds up the timer. A task is out of the heap for as long as it runs and goes
/// back in only once the run has finished, so it never has two runs in flight.
///
/// Tasks added with `need_lock` only run on the instance holding the scheduler's cluster lock.
/// Everywhere else their fires are skipped, but they keep being rescheduled.
pub struct TaskScheduler<C: Clock = RealClock> {
    inner: Arc<Inner<C>>,
}

struct Inner<C: Clock> {
    logger: slog::Logger,
    options: SchedulerOptionsValidated,
    clock: C,
    // Never held together with `heap`.
    tasks: Mutex<HashMap<TaskId, TaskEntry>>,
    heap: Mutex<TaskHeap>,
    timer_wakeup: Notify,
    next_task_id: AtomicU64,
    lock_provider: Option<Arc<dyn LockProvider>>,
    cluster_lock: Mutex<Option<Arc<ClusterLock>>>,
    lock_keeper: Mutex<Option<JoinHandle<()>>>,
    holds_lock: Arc<AtomicBool>,
    started: AtomicBool,
    stop_token: CancellationToken,
}

impl TaskScheduler<RealClock> {
    pub fn new(
        logger: &slog::Logger,
        options: SchedulerOptions,
        lock_provider: Option<Arc<dyn LockProvider>>,
    ) -> Result<Self, SchedulerError> {
        Self::with_clock(logger, options, lock_provider, RealClock)
    }
}

impl<C: Clock> TaskScheduler<C> {
    pub fn with_clock(
        logger: &slog::Logger,
        options: SchedulerOptions,
        lock_provider: Option<Arc<dyn LockProvider>>,
        clock: C,
    ) -> Result<Self, SchedulerError> {
        let options = SchedulerOptionsValidated::try_from(options).map_err(SchedulerError::InvalidOptions)?;
        if options.lock_name.is_some() && lock_provider.is_none() {
            return Err(SchedulerError::InvalidOptions("A lock name requires a lock provider"));
        }

        let inner = Inner {
            logger: logger.new(slog::o!("Component" => "TaskScheduler")),
            options,
            clock,
            tasks: Mutex::new(HashMap::new()),
            heap: Mutex::new(TaskHeap::new()),
            timer_wakeup: Notify::new(),
            next_task_id: AtomicU64::new(1),
            lock_provider,
            cluster_lock: Mutex::new(None),
            lock_keeper: Mutex::new(None),
            holds_lock: Arc::new(AtomicBool::new(false)),
            started: AtomicBool::new(false),
            stop_token: CancellationToken::new(),
        };

        Ok(TaskScheduler { inner: Arc::new(inner) })
    }

    /// Run `handler` once, as soon as possible.
    pub fn add_task<F, Fut>(&self, name: &str, handler: F, need_lock: bool) -> TaskId
    where
        F: Fn(TaskContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        self.add_delay_task(name, Duration::from_secs(0), handler, need_lock)
    }

    /// Run `handler` once, after `delay`.
    pub fn add_delay_task<F, Fut>(&self, name: &str, delay: Duration, handler: F, need_lock: bool) -> TaskId
    where
        F: Fn(TaskContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        let first_run = self.inner.clock.now() + delay;
        self.inner
            .insert(name, Recurrence::Once, first_run, task::boxed_handler(handler), need_lock)
    }

    /// Run `handler` every `interval`, measured from the end of one run to the start of the next.
    /// The first run is immediate when `immediate` is set.
    pub fn add_interval_task<F, Fut>(
        &self,
        name: &str,
        interval: Duration,
        immediate: bool,
        handler: F,
        need_lock: bool,
    ) -> Result<TaskId, SchedulerError>
    where
        F: Fn(TaskContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        if interval == Duration::from_secs(0) {
            return Err(SchedulerError::InvalidInterval);
        }

        let now = self.inner.clock.now();
        let first_run = if immediate { now } else { now + interval };

        Ok(self.inner.insert(
            name,
            Recurrence::Every(interval),
            first_run,
            task::boxed_handler(handler),
            need_lock,
        ))
    }

    /// Run `handler` on a 5-field cron schedule, e.g. `*/5 * * * *`.
    pub fn add_cron_task<F, Fut>(
        &self,
        name: &str,
        expression: &str,
        handler: F,
        need_lock: bool,
    ) -> Result<TaskId, SchedulerError>
    where
        F: Fn(TaskContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        let recurrence = Recurrence::Cron(CronSchedule::parse(expression)?);
        let first_run = recurrence
            .next_run(&self.inner.clock)
            .ok_or_else(|| SchedulerError::InvalidCron {
                expression: expression.to_string(),
                reason: "schedule never fires".to_string(),
            })?;

        Ok(self
            .inner
            .insert(name, recurrence, first_run, task::boxed_handler(handler), need_lock))
    }

    /// Remove a task. A run already in flight is signalled through its context but not awaited.
    /// Returns false if there was no such task.
    pub fn cancel_task(&self, task_id: TaskId) -> bool {
        let removed = self
            .inner
            .tasks
            .lock()
            .expect("TaskScheduler.cancel_task() tasks lock poison")
            .remove(&task_id);

        match removed {
            Some(entry) => {
                self.inner
                    .heap
                    .lock()
                    .expect("TaskScheduler.cancel_task() heap lock poison")
                    .remove(task_id);
                if let Some(in_flight) = entry.in_flight {
                    in_flight.cancel();
                }
                slog::debug!(self.inner.logger, "Cancelled {} '{}'", task_id, entry.name);
                true
            }
            None => false,
        }
    }

    pub fn get_task(&self, task_id: TaskId) -> Option<TaskInfo> {
        self.inner
            .tasks
            .lock()
            .expect("TaskScheduler.get_task() lock poison")
            .get(&task_id)
            .map(|entry| entry.info(task_id))
    }

    /// Every task, ordered by ID.
    pub fn get_all_tasks(&self) -> Vec<TaskInfo> {
        let mut infos: Vec<TaskInfo> = self
            .inner
            .tasks
            .lock()
            .expect("TaskScheduler.get_all_tasks() lock poison")
            .iter()
            .map(|(id, entry)| entry.info(*id))
            .collect();
        infos.sort_by_key(|info| info.id);

        infos
    }

    /// Whether this instance currently holds the scheduler's cluster lock.
    pub fn has_lock(&self) -> bool {
        self.inner.holds_lock.load(Ordering::Acquire)
    }

    /// Take the cluster lock if one is configured, then start the timer. Not getting the lock is
    /// not an error; the lock keeper keeps trying.
    pub async fn start(&self) -> Result<(), SchedulerError> {
        if self.inner.stop_token.is_cancelled() {
            return Err(SchedulerError::Stopped);
        }
        if self.inner.started.swap(true, Ordering::SeqCst) {
            return Err(SchedulerError::AlreadyStarted);
        }

        if let Err(e) = self.start_lock_keeper().await {
            self.inner.started.store(false, Ordering::SeqCst);
            return Err(e);
        }

        let timer = TimerTask {
            inner: self.inner.clone(),
            clock: self.inner.clock.clone(),
        };
        tokio::task::spawn(timer.run());
        slog::info!(self.inner.logger, "Started");

        Ok(())
    }

    /// Stop scheduling new runs and give up the cluster lock. Runs in flight finish on their own,
    /// bounded by the task timeout.
    pub async fn stop(&self) {
        self.inner.stop_token.cancel();

        // An acquire the keeper already started has to land before the lock can be released.
        let lock_keeper = self
            .inner
            .lock_keeper
            .lock()
            .expect("TaskScheduler.stop() lock poison")
            .take();
        if let Some(lock_keeper) = lock_keeper {
            if let Err(e) = lock_keeper.await {
                slog::warn!(self.inner.logger, "Lock keeper ended abnormally: {}", e);
            }
        }

        let cluster_lock = self
            .inner
            .cluster_lock
            .lock()
            .expect("TaskScheduler.stop() lock poison")
            .take();
        if let Some(cluster_lock) = cluster_lock {
            cluster_lock.release().await;
        }
        slog::info!(self.inner.logger, "Stopped");
    }

    async fn start_lock_keeper(&self) -> Result<(), SchedulerError> {
        let (lock_name, lock_provider) = match (&self.inner.options.lock_name, &self.inner.lock_provider) {
            (Some(lock_name), Some(lock_provider)) => (lock_name, lock_provider),
            _ => return Ok(()),
        };

        let lock = lock_provider.create_lock(lock_name, self.inner.options.lock_ttl).await?;
        let cluster_lock = Arc::new(ClusterLock::new(
            &self.inner.logger,
            lock,
            self.inner.holds_lock.clone(),
            self.inner.options.lock_acquire_timeout,
        ));
        cluster_lock.try_acquire().await;

        let keeper = LockKeeper::new(
            cluster_lock.clone(),
            self.inner.clock.clone(),
            self.inner.options.lock_ttl,
            self.inner.stop_token.child_token(),
        );
        let keeper_handle = tokio::task::spawn(keeper.run());

        self.inner
            .cluster_lock
            .lock()
            .expect("TaskScheduler.start_lock_keeper() lock poison")
            .replace(cluster_lock);
        self.inner
            .lock_keeper
            .lock()
            .expect("TaskScheduler.start_lock_keeper() lock poison")
            .replace(keeper_handle);

        Ok(())
    }
}

impl<C: Clock> Drop for TaskScheduler<C> {
    fn drop(&mut self) {
        self.inner.stop_token.cancel();
    }
}

impl<C: Clock> Inner<C> {
    fn insert(
        &self,
        name: &str,
        recurrence: Recurrence,
        first_run: Instant,
        handler: TaskHandler,
        need_lock: bool,
    ) -> TaskId {
        let task_id = TaskId::new(self.next_task_id.fetch_add(1, Ordering::Relaxed));

        self.tasks.lock().expect("TaskScheduler.insert() tasks lock poison").insert(
            task_id,
            TaskEntry {
                name: name.to_string(),
                handler,
                recurrence,
                need_lock,
                status: TaskStatus::Pending,
                next_run_at: Some(first_run),
                run_count: 0,
                last_error: None,
                in_flight: None,
            },
        );
        self.heap
            .lock()
            .expect("TaskScheduler.insert() heap lock poison")
            .push(task_id, first_run);
        self.timer_wakeup.notify_one();

        slog::debug!(self.logger, "Added {} '{}'", task_id, name);
        task_id
    }

    fn fire_due_tasks(self: &Arc<Self>) {
        let now = self.clock.now();
        let due = self.heap.lock().expect("TaskScheduler heap lock poison").pop_due(now);

        for task_id in due {
            self.dispatch(task_id);
        }
    }

    fn dispatch(self: &Arc<Self>, task_id: TaskId) {
        let launch = {
            let mut tasks = self.tasks.lock().expect("TaskScheduler.dispatch() lock poison");
            let entry = match tasks.get_mut(&task_id) {
                Some(entry) => entry,
                // Cancelled after it was popped.
                None => return,
            };

            if entry.need_lock && !self.holds_lock.load(Ordering::Acquire) {
                None
            } else {
                let cancellation = CancellationToken::new();
                entry.status = TaskStatus::Running;
                entry.next_run_at = None;
                entry.in_flight = Some(cancellation.clone());

                Some((
                    entry.handler.clone(),
                    TaskContext::new(task_id, entry.name.clone(), cancellation),
                ))
            }
        };

        match launch {
            Some((handler, ctx)) => {
                tokio::task::spawn(self.clone().execute(handler, ctx));
            }
            None => {
                slog::debug!(self.logger, "Skipping {}, cluster lock not held", task_id);
                self.reschedule(task_id);
            }
        }
    }

    async fn execute(self: Arc<Self>, handler: TaskHandler, ctx: TaskContext) {
        let task_id = ctx.task_id();
        let cancellation = ctx.cancellation_token().clone();
        let timeout = self.options.task_timeout;

        let mut run = tokio::task::spawn(handler(ctx));
        let result: Result<(), TaskError> = match tokio::time::timeout(timeout, &mut run).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(format!("Handler panicked: {}", join_error).into()),
            Err(_) => {
                cancellation.cancel();
                run.abort();
                Err(format!("Handler timed out after {:?}", timeout).into())
            }
        };

        self.finish(task_id, result);
    }

    fn finish(self: &Arc<Self>, task_id: TaskId, result: Result<(), TaskError>) {
        {
            let mut tasks = self.tasks.lock().expect("TaskScheduler.finish() lock poison");
            let entry = match tasks.get_mut(&task_id) {
                Some(entry) => entry,
                None => return,
            };

            entry.run_count += 1;
            entry.in_flight = None;
            match result {
                Ok(()) => {
                    entry.status = TaskStatus::Success;
                    entry.last_error = None;
                }
                Err(e) => {
                    slog::warn!(self.logger, "{} '{}' failed: {}", task_id, entry.name, e);
                    entry.status = TaskStatus::Failed;
                    entry.last_error = Some(e.to_string());
                }
            }

            if let Recurrence::Once = entry.recurrence {
                tasks.remove(&task_id);
                return;
            }
        }

        self.reschedule(task_id);
    }

    /// Put a task back in the heap at its next run time, or drop it if it has none.
    fn reschedule(&self, task_id: TaskId) {
        let next_run = {
            let mut tasks = self.tasks.lock().expect("TaskScheduler.reschedule() lock poison");
            let entry = match tasks.get_mut(&task_id) {
                Some(entry) => entry,
                None => return,
            };

            match entry.recurrence.next_run(&self.clock) {
                Some(next_run) => {
                    entry.status = TaskStatus::Pending;
                    entry.next_run_at = Some(next_run);
                    next_run
                }
                None => {
                    tasks.remove(&task_id);
                    return;
                }
            }
        };

        self.heap
            .lock()
            .expect("TaskScheduler.reschedule() heap lock poison")
            .push(task_id, next_run);

        // cancel_task() may have run between releasing the table and pushing to the heap.
        let still_scheduled = self
            .tasks
            .lock()
            .expect("TaskScheduler.reschedule() lock poison")
            .contains_key(&task_id);
        if !still_scheduled {
            self.heap
                .lock()
                .expect("TaskScheduler.reschedule() heap lock poison")
                .remove(task_id);
        }

        self.timer_wakeup.notify_one();
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.heap
            .lock()
            .expect("TaskScheduler.next_deadline() lock poison")
            .peek()
            .map(|(_, deadline)| deadline)
    }
}

struct TimerTask<C: Clock> {
    inner: Arc<Inner<C>>,
    clock: C,
}

impl<C: Clock> TimerTask<C> {
    async fn run(mut self) {
        loop {
            let next_deadline = self.inner.next_deadline();

            tokio::select! {
                _ = self.inner.stop_token.cancelled() => return,
                // A new or rescheduled task may be due before `next_deadline`.
                _ = self.inner.timer_wakeup.notified() => continue,
                _ = sleep_until_deadline(&mut self.clock, next_deadline) => {}
            }

            self.inner.fire_due_tasks();
        }
    }
}

async fn sleep_until_deadline<C: Clock>(clock: &mut C, deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => clock.sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}
