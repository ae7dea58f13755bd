//! The local calendar day used to scope an aggregation run.
//!
//! "Today" is the host's local day. Both ends of the window are inclusive:
//! `00:00:00` and `23:59:59.999999999` local time belong to the day, so
//! consecutive days tile the timeline with no gap.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub date: NaiveDate,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayWindow {
    /// Window for the current local day.
    pub fn today() -> Self {
        Self::for_date(Local::now().date_naive())
    }

    /// Window for `date` in host local time.
    pub fn for_date(date: NaiveDate) -> Self {
        Self::for_date_in(&Local, date)
    }

    /// Window for `date` in an arbitrary timezone.
    ///
    /// Ambiguous wall-clock times (DST fall-back) resolve to the widest window.
    /// A start that falls in a DST gap moves to the first valid instant after it.
    pub fn for_date_in<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Self {
        let first = date.and_time(NaiveTime::MIN);
        let last = date.and_time(NaiveTime::MIN) + Duration::days(1) - Duration::nanoseconds(1);

        let start = resolve(tz, first, true);
        let end = resolve(tz, last, false);

        Self { date, start, end }
    }

    /// Inclusive on both ends.
    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        *instant >= self.start && *instant <= self.end
    }
}

fn resolve<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime, earliest: bool) -> DateTime<Utc> {
    let mapped = tz.from_local_datetime(&naive);
    let picked = if earliest {
        mapped.earliest()
    } else {
        mapped.latest()
    };
    if let Some(dt) = picked {
        return dt.with_timezone(&Utc);
    }

    // Skipped by a DST jump: walk forward (start) or backward (end) in small steps
    let step = if earliest {
        Duration::minutes(15)
    } else {
        Duration::minutes(-15)
    };
    let mut probe = naive;
    for _ in 0..16 {
        probe += step;
        let mapped = tz.from_local_datetime(&probe);
        if let Some(dt) = mapped.earliest() {
            return dt.with_timezone(&Utc);
        }
    }
    Utc.from_utc_datetime(&naive)
}
