use crate::scheduler::SchedulerError;
use chrono::{DateTime, Utc};
use std::str::FromStr;

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// A classic 5-field cron expression: minute, hour, day of month, month, day of week.
///
/// Day-of-week numbers follow classic cron, where both 0 and 7 are Sunday. Expressions with a
/// seconds field are rejected.
///
/// When both day of month and day of week are restricted, a day matches if either one does, as
/// in classic cron. The cron crate requires both, so that case is kept as two schedules and the
/// earlier fire time wins.
#[derive(Clone, Debug)]
pub(super) struct CronSchedule {
    expression: String,
    schedules: Vec<cron::Schedule>,
}

impl CronSchedule {
    pub fn parse(expression: &str) -> Result<Self, SchedulerError> {
        let invalid = |reason: String| SchedulerError::InvalidCron {
            expression: expression.to_string(),
            reason,
        };

        let fields: Vec<&str> = expression.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(invalid(format!("expected 5 fields, found {}", fields.len())));
        }

        let (minute, hour, day_of_month, month) = (fields[0], fields[1], fields[2], fields[3]);
        let day_of_week = translate_day_of_week(fields[4]).map_err(invalid)?;

        let day_fields = if is_restricted(day_of_month) && is_restricted(fields[4]) {
            vec![(day_of_month, "*"), ("*", day_of_week.as_str())]
        } else {
            vec![(day_of_month, day_of_week.as_str())]
        };

        let mut schedules = Vec::with_capacity(day_fields.len());
        for (day_of_month, day_of_week) in day_fields {
            // The cron crate wants a leading seconds field. Pin it to 0 for minute granularity.
            let with_seconds = format!("0 {} {} {} {} {}", minute, hour, day_of_month, month, day_of_week);
            let schedule = cron::Schedule::from_str(&with_seconds).map_err(|e| invalid(e.to_string()))?;
            schedules.push(schedule);
        }

        Ok(CronSchedule {
            expression: expression.to_string(),
            schedules,
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// First fire time strictly after `after`. `None` if the schedule never fires again.
    pub fn next_after(&self, after: &DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedules
            .iter()
            .filter_map(|schedule| schedule.after(after).next())
            .min()
    }
}

/// Classic cron treats a day field starting with `*` as unrestricted, step or not.
fn is_restricted(field: &str) -> bool {
    !(field.starts_with('*') || field == "?")
}

/// Rewrite numeric weekdays as names, since the cron crate numbers Sunday as 1.
fn translate_day_of_week(field: &str) -> Result<String, String> {
    field
        .split(',')
        .map(translate_day_of_week_item)
        .collect::<Result<Vec<_>, _>>()
        .map(|items| items.join(","))
}

fn translate_day_of_week_item(item: &str) -> Result<String, String> {
    let (range, step) = match item.find('/') {
        Some(slash) => (&item[..slash], Some(&item[slash..])),
        None => (item, None),
    };

    if range == "*" || range == "?" {
        return Ok(item.to_string());
    }

    let translated = match range.find('-') {
        Some(dash) => {
            let (start, end) = (&range[..dash], &range[dash + 1..]);
            match (weekday_number(start)?, weekday_number(end)?) {
                (Some(7), _) => return Err(format!("day-of-week range '{}' cannot start at 7", item)),
                (Some(start), Some(7)) if start != 0 => {
                    if step.is_some() {
                        return Err(format!("day-of-week range '{}' ending at 7 cannot take a step", item));
                    }
                    // Split so the range does not wrap: e.g. 5-7 means Fri, Sat and Sun.
                    return Ok(format!("{}-Sat,Sun", WEEKDAYS[start]));
                }
                (Some(0), Some(7)) => "Sun-Sat".to_string(),
                (start_num, end_num) => format!(
                    "{}-{}",
                    start_num.map(|n| WEEKDAYS[n % 7]).unwrap_or(start),
                    end_num.map(|n| WEEKDAYS[n % 7]).unwrap_or(end)
                ),
            }
        }
        None => match weekday_number(range)? {
            Some(n) => WEEKDAYS[n % 7].to_string(),
            None => range.to_string(),
        },
    };

    Ok(format!("{}{}", translated, step.unwrap_or("")))
}

/// `Some(0..=7)` for a numeric weekday, `None` for anything else (a name, left for the cron crate
/// to judge).
fn weekday_number(value: &str) -> Result<Option<usize>, String> {
    if !value.chars().all(|c| c.is_ascii_digit()) || value.is_empty() {
        return Ok(None);
    }

    match value.parse::<usize>() {
        Ok(n) if n <= 7 => Ok(Some(n)),
        _ => Err(format!("day-of-week '{}' is out of range 0-7", value)),
    }
}
