use std::str::FromStr;
use chrono::{DateTime, Local, Utc};
use crate::config::ScheduleTimezone;
use crate::errors::RemediationError;

/// A parsed cron expression bound to a timezone.
///
/// Accepts the classic five-field form (`min hour dom mon dow`, Sunday = 0)
/// as well as the six/seven-field form with a leading seconds field, which
/// is passed through unchanged (Sunday = 1 there).
#[derive(Debug, Clone)]
pub struct CronSchedule {
    expr: String,
    schedule: cron::Schedule,
    timezone: ScheduleTimezone,
}

impl CronSchedule {
    pub fn parse(expr: &str) -> Result<Self, RemediationError> {
        let fields: Vec<&str> = expr.split_whitespace().collect();
        let normalized = match fields.len() {
            5 => format!(
                "0 {} {} {} {} {}",
                fields[0], fields[1], fields[2], fields[3], shift_day_of_week(fields[4])
            ),
            6 | 7 => fields.join(" "),
            n => {
                return Err(RemediationError::Schedule(format!(
                    "invalid cron expression '{}': expected 5 fields, got {}",
                    expr, n
                )))
            }
        };
        let schedule = cron::Schedule::from_str(&normalized).map_err(|e| {
            RemediationError::Schedule(format!("invalid cron expression '{}': {}", expr, e))
        })?;
        Ok(Self {
            expr: expr.trim().to_string(),
            schedule,
            timezone: ScheduleTimezone::Local,
        })
    }

    pub fn with_timezone(mut self, timezone: ScheduleTimezone) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn expression(&self) -> &str {
        &self.expr
    }

    /// First fire time strictly after `after`.
    pub fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self.timezone {
            ScheduleTimezone::Utc => self.schedule.after(&after).next(),
            ScheduleTimezone::Local => self
                .schedule
                .after(&after.with_timezone(&Local))
                .next()
                .map(|t| t.with_timezone(&Utc)),
        }
    }
}

/// Map classic day-of-week numbers (0-7, Sunday = 0 or 7) onto the 1-7
/// numbering of the seconds-based format. Names and `*` are left alone.
fn shift_day_of_week(field: &str) -> String {
    field.split(',').map(shift_day_of_week_part).collect::<Vec<_>>().join(",")
}

fn shift_day_of_week_part(part: &str) -> String {
    let (range, step) = match part.split_once('/') {
        Some((r, s)) => (r, Some(s)),
        None => (part, None),
    };

    // A range ending on the second Sunday (7) would wrap past Saturday once
    // shifted, so it is split into `lo..Sat` plus Sunday.
    if let Some((lo, hi)) = range.split_once('-') {
        if let (Ok(lo), Ok(7)) = (lo.parse::<u8>(), hi.parse::<u8>()) {
            if lo == 0 && step.is_none() {
                return "*".to_string();
            }
            if lo == 7 {
                return "1".to_string();
            }
            let mut out = format!("{}-7", lo + 1);
            if let Some(step) = step {
                out.push('/');
                out.push_str(step);
            }
            let step_hits_sunday = match step.map(str::parse::<u8>) {
                None => true,
                Some(Ok(n)) if n > 0 => (7 - lo) % n == 0,
                Some(_) => false,
            };
            if lo > 0 && step_hits_sunday {
                out.push_str(",1");
            }
            return out;
        }
    }

    let shifted: Vec<String> = range
        .split('-')
        .map(|token| match token.parse::<u8>() {
            Ok(7) => "1".to_string(),
            Ok(n) if n <= 6 => (n + 1).to_string(),
            _ => token.to_string(),
        })
        .collect();
    let mut out = shifted.join("-");
    if let Some(step) = step {
        out.push('/');
        out.push_str(step);
    }
    out
}
