use std::convert::TryFrom;
use tokio::time::Duration;

#[derive(Clone, Default)]
pub struct SchedulerOptions {
    /// Upper bound on a single handler run.
    pub task_timeout: Option<Duration>,
    /// Cluster-wide lock that `need_lock` tasks require. Without one, `need_lock` tasks never run.
    pub lock_name: Option<String>,
    pub lock_ttl: Option<Duration>,
    pub lock_acquire_timeout: Option<Duration>,
}

pub(super) struct SchedulerOptionsValidated {
    pub task_timeout: Duration,
    pub lock_name: Option<String>,
    pub lock_ttl: Duration,
    pub lock_acquire_timeout: Duration,
}

impl SchedulerOptionsValidated {
    fn validate(&self) -> Result<(), &'static str> {
        if self.task_timeout == Duration::from_secs(0) {
            return Err("Task timeout must be greater than zero");
        }
        if let Some(lock_name) = &self.lock_name {
            if lock_name.is_empty() {
                return Err("Lock name must not be empty");
            }
        }
        // Lock TTLs travel in whole seconds.
        if self.lock_ttl < Duration::from_secs(1) {
            return Err("Lock TTL must be at least one second");
        }
        if self.lock_acquire_timeout >= self.lock_ttl {
            return Err("Lock acquire timeout must be less than the lock TTL");
        }

        Ok(())
    }
}

impl TryFrom<SchedulerOptions> for SchedulerOptionsValidated {
    type Error = &'static str;

    fn try_from(options: SchedulerOptions) -> Result<Self, Self::Error> {
        let values = SchedulerOptionsValidated {
            task_timeout: options.task_timeout.unwrap_or(Duration::from_secs(60)),
            lock_name: options.lock_name,
            lock_ttl: options.lock_ttl.unwrap_or(Duration::from_secs(30)),
            lock_acquire_timeout: options.lock_acquire_timeout.unwrap_or(Duration::from_secs(3)),
        };

        values.validate()?;
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let validated = SchedulerOptionsValidated::try_from(SchedulerOptions::default()).unwrap();

        assert_eq!(validated.task_timeout, Duration::from_secs(60));
        assert_eq!(validated.lock_name, None);
        assert_eq!(validated.lock_ttl, Duration::from_secs(30));
        assert_eq!(validated.lock_acquire_timeout, Duration::from_secs(3));
    }

    #[test]
    fn acquire_timeout_must_fit_in_ttl() {
        let options = SchedulerOptions {
            lock_ttl: Some(Duration::from_secs(2)),
            lock_acquire_timeout: Some(Duration::from_secs(2)),
            ..Default::default()
        };

        assert!(SchedulerOptionsValidated::try_from(options).is_err());
    }

    #[test]
    fn empty_lock_name_rejected() {
        let options = SchedulerOptions {
            lock_name: Some(String::new()),
            ..Default::default()
        };

        assert!(SchedulerOptionsValidated::try_from(options).is_err());
    }
}
