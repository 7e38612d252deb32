use crate::scheduler::time::Clock;
use crate::services::DistributedLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// The scheduler's cluster-wide lock and whether this instance currently holds it.
pub(super) struct ClusterLock {
    logger: slog::Logger,
    lock: Box<dyn DistributedLock>,
    held: Arc<AtomicBool>,
    acquire_timeout: Duration,
}

impl ClusterLock {
    pub fn new(
        logger: &slog::Logger,
        lock: Box<dyn DistributedLock>,
        held: Arc<AtomicBool>,
        acquire_timeout: Duration,
    ) -> Self {
        ClusterLock {
            logger: logger.new(slog::o!("Lock" => lock.name().to_string())),
            lock,
            held,
            acquire_timeout,
        }
    }

    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }

    /// One bounded attempt at taking the lock. Failure is expected whenever another instance
    /// holds it.
    pub async fn try_acquire(&self) -> bool {
        match tokio::time::timeout(self.acquire_timeout, self.lock.lock()).await {
            Ok(Ok(())) => {
                self.held.store(true, Ordering::Release);
                slog::info!(self.logger, "Acquired cluster lock");
                true
            }
            Ok(Err(e)) => {
                slog::debug!(self.logger, "Cluster lock not acquired: {}", e);
                false
            }
            Err(_) => {
                slog::warn!(self.logger, "Timed out acquiring cluster lock after {:?}", self.acquire_timeout);
                false
            }
        }
    }

    /// Extend the lease. On failure this instance steps down immediately, so no further
    /// lock-gated handler starts here.
    pub async fn refresh(&self) -> bool {
        match self.lock.refresh().await {
            Ok(()) => true,
            Err(e) => {
                self.held.store(false, Ordering::Release);
                slog::warn!(self.logger, "Lost cluster lock, stepping down: {}", e);
                false
            }
        }
    }

    pub async fn release(&self) {
        if !self.held.swap(false, Ordering::AcqRel) {
            return;
        }

        match self.lock.unlock().await {
            Ok(()) => slog::info!(self.logger, "Released cluster lock"),
            Err(e) => slog::warn!(self.logger, "Failed to release cluster lock: {}", e),
        }
    }
}

/// Ticks every TTL/3: refreshes the lock while held, and tries to take it while not.
pub(super) struct LockKeeper<C: Clock> {
    lock: Arc<ClusterLock>,
    clock: C,
    period: Duration,
    next_tick: Instant,
    stop_token: CancellationToken,
}

impl<C: Clock> LockKeeper<C> {
    pub fn new(lock: Arc<ClusterLock>, clock: C, lock_ttl: Duration, stop_token: CancellationToken) -> Self {
        let period = lock_ttl / 3;

        LockKeeper {
            lock,
            next_tick: clock.now() + period,
            clock,
            period,
            stop_token,
        }
    }

    pub async fn run(mut self) {
        loop {
            tokio::select! {
                _ = self.stop_token.cancelled() => return,
                _ = self.clock.sleep_until(self.next_tick) => {}
            }
            self.next_tick += self.period;

            if self.lock.is_held() {
                self.lock.refresh().await;
            } else {
                self.lock.try_acquire().await;
            }
        }
    }
}
