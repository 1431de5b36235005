//! Daily trigger
//!
//! Fires at midnight in a configured zone. Missed days are not replayed: the
//! next wait is always computed from the current instant.

use chrono::{DateTime, Duration as ChronoDuration, LocalResult, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct DailySchedule {
    tz: Tz,
}

impl DailySchedule {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Time left until the next trigger
    pub fn duration_until_next_run(&self) -> Duration {
        self.duration_until_next_run_from(Utc::now())
    }

    pub fn duration_until_next_run_from(&self, now: DateTime<Utc>) -> Duration {
        (self.next_run_after(now) - now)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    /// First local midnight strictly after `now`
    pub fn next_run_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let local_today = now.with_timezone(&self.tz).date_naive();
        let mut day = local_today + ChronoDuration::days(1);

        loop {
            let midnight = day.and_time(NaiveTime::MIN);
            match self.tz.from_local_datetime(&midnight) {
                LocalResult::Single(t) | LocalResult::Ambiguous(t, _) => {
                    return t.with_timezone(&Utc);
                }
                // midnight skipped by a DST jump; the day starts an hour later
                LocalResult::None => {
                    if let LocalResult::Single(t) | LocalResult::Ambiguous(t, _) = self
                        .tz
                        .from_local_datetime(&(midnight + ChronoDuration::hours(1)))
                    {
                        return t.with_timezone(&Utc);
                    }
                    day += ChronoDuration::days(1);
                }
            }
        }
    }
}
