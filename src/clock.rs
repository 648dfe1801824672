use chrono::{DateTime, Local, TimeZone, Timelike};

pub fn now() -> DateTime<Local> {
    Local::now()
}

pub fn seconds_since_midnight<Tz: TimeZone>(now: &DateTime<Tz>) -> f64 {
    f64::from(now.num_seconds_from_midnight())
}

/// Unix timestamp of the most recent local midnight.
pub fn day_origin<Tz: TimeZone>(now: &DateTime<Tz>) -> i64 {
    now.timestamp() - i64::from(now.num_seconds_from_midnight())
}

/// Formats seconds since midnight as `HH:MM`.
pub fn format_time_of_day(seconds: f64) -> String {
    let total = seconds.floor() as i64;
    let hour = total.div_euclid(3_600);
    let minute = total.div_euclid(60).rem_euclid(60);
    format!("{hour:02}:{minute:02}")
}
