//! Time utilities: one reference timezone for the whole process.
//!
//! Every date comparison in the core takes an explicit `today`. Callers read it
//! once per logical operation from a [`Clock`] so a single response is never
//! split across a midnight boundary.

use anyhow::Result;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

pub const DEFAULT_TIMEZONE: &str = "Asia/Tbilisi";

/// Source of "now" plus the zone used to turn it into a calendar date.
pub trait Clock {
    fn now_utc(&self) -> DateTime<Utc>;

    fn timezone(&self) -> Tz;

    /// Calendar date in the reference timezone, not the host's local zone.
    fn today(&self) -> NaiveDate {
        self.now_utc().with_timezone(&self.timezone()).date_naive()
    }
}

/// Wall clock pinned to a configured IANA zone.
#[derive(Debug, Clone, Copy)]
pub struct ZonedClock {
    tz: Tz,
}

impl ZonedClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        Ok(Self::new(parse_timezone(name)?))
    }
}

impl Default for ZonedClock {
    fn default() -> Self {
        Self::new(chrono_tz::Asia::Tbilisi)
    }
}

impl Clock for ZonedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn timezone(&self) -> Tz {
        self.tz
    }
}

/// Frozen clock for tests and replays.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Utc>,
    tz: Tz,
}

impl FixedClock {
    pub fn at(now: DateTime<Utc>, tz: Tz) -> Self {
        Self { now, tz }
    }

    /// Midnight UTC on `date`, evaluated in UTC, so `today()` is `date`.
    pub fn on_date(date: NaiveDate) -> Self {
        Self {
            now: date.and_time(NaiveTime::MIN).and_utc(),
            tz: Tz::UTC,
        }
    }
}

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.now
    }

    fn timezone(&self) -> Tz {
        self.tz
    }
}

pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse()
        .map_err(|_| anyhow::anyhow!("invalid timezone: {name}"))
}

/// Parse a daily trigger time like "08:00".
pub fn parse_daily_time(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .map_err(|e| anyhow::anyhow!("invalid time of day '{s}' (expected HH:MM): {e}"))
}

/// Next instant strictly after `now` at which the local wall clock in `tz` reads `at`.
///
/// Days where `at` does not exist locally (DST gap) are skipped.
pub fn next_fire_after(now: DateTime<Utc>, at: NaiveTime, tz: Tz) -> DateTime<Utc> {
    let mut day = now.with_timezone(&tz).date_naive();

    for _ in 0..3 {
        if let Some(local) = tz.from_local_datetime(&day.and_time(at)).earliest() {
            let fire = local.with_timezone(&Utc);
            if fire > now {
                return fire;
            }
        }
        day += Duration::days(1);
    }

    now + Duration::days(1)
}
