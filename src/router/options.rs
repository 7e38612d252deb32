use std::convert::TryFrom;

#[derive(Clone, Default)]
pub struct RouterOptions {
    /// How many leader-change notifications may queue up before the producer has to wait.
    pub leader_queue_capacity: Option<usize>,
}

pub(super) struct RouterOptionsValidated {
    pub leader_queue_capacity: usize,
}

impl RouterOptionsValidated {
    fn validate(&self) -> Result<(), &'static str> {
        if self.leader_queue_capacity == 0 {
            return Err("Leader notification queue capacity must be greater than zero");
        }

        Ok(())
    }
}

impl TryFrom<RouterOptions> for RouterOptionsValidated {
    type Error = &'static str;

    fn try_from(options: RouterOptions) -> Result<Self, Self::Error> {
        let values = RouterOptionsValidated {
            leader_queue_capacity: options.leader_queue_capacity.unwrap_or(16),
        };

        values.validate()?;
        Ok(values)
    }
}
