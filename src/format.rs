//! Fixed-width text output.
//!
//! Every timestamp is shown as `HH:MM ABBR` twice: once in the zone the value carries and once
//! converted to UTC. Naive timestamps carry no zone; they are read as UTC instants.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, TimeZone, Utc};

use crate::config::DISPLAY_FORMAT;
use crate::models::TimestampRow;

const MISSING: &str = "-";

/// `UTC` for a zero offset, otherwise `+05`, `-03` or `+05:30`
pub fn zone_abbreviation(offset: &FixedOffset) -> String {
    let seconds = offset.local_minus_utc();
    if seconds == 0 {
        return "UTC".to_string();
    }

    let sign = if seconds < 0 { '-' } else { '+' };
    let minutes = seconds.abs() / 60;
    let (hours, minutes) = (minutes / 60, minutes % 60);

    if minutes == 0 {
        format!("{}{:02}", sign, hours)
    } else {
        format!("{}{:02}:{:02}", sign, hours, minutes)
    }
}

pub fn clock(dt: &DateTime<FixedOffset>) -> String {
    format!("{} {}", dt.format(DISPLAY_FORMAT), zone_abbreviation(dt.offset()))
}

pub fn clock_utc(dt: &DateTime<FixedOffset>) -> String {
    clock(&dt.with_timezone(&Utc.fix()))
}

fn naive_as_utc(ts: &NaiveDateTime) -> DateTime<FixedOffset> {
    Utc.fix().from_utc_datetime(ts)
}

/// Header printed before anything touches the database
pub fn now_line(now: &DateTime<FixedOffset>) -> String {
    format!("Time right now: {:>12}{:>12}", clock(now), clock_utc(now))
}

pub fn row_line(row: &TimestampRow, with_tstz: bool) -> String {
    let ts = row.ts.as_ref().map(naive_as_utc);
    let (ts_local, ts_utc) = render_pair(ts.as_ref());

    let mut line = format!("{:>5}     {:<35}{:>12}{:>12}", row.n, row.name, ts_local, ts_utc);

    if with_tstz {
        let (tstz_local, tstz_utc) = render_pair(row.tstz.as_ref());
        line.push_str(&format!("          {:>12}{:>12}", tstz_local, tstz_utc));
    }

    line
}

fn render_pair(dt: Option<&DateTime<FixedOffset>>) -> (String, String) {
    match dt {
        Some(dt) => (clock(dt), clock_utc(dt)),
        None => (MISSING.to_string(), MISSING.to_string()),
    }
}
