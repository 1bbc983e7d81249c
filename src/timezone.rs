//! Session timezone values.
//!
//! PostgreSQL does not accept a bind parameter in `SET timezone TO ...`, so the value has to be
//! spliced into the statement text. That is unsafe construction for arbitrary input. It is kept
//! behind [`SessionTimezone`], which only admits names shaped like IANA zone paths (segments of
//! `[A-Za-z0-9_+-]` joined by `/`), and [`SessionTimezone::set_statement`] is the only place that
//! builds the SQL. Whether the name is a zone PostgreSQL knows is left to the server.

use std::fmt;

use rand::Rng;

use crate::errors::{DemoError, Result};

/// Longest name accepted; the IANA database stays well below this
const MAX_NAME_LEN: usize = 64;

/// Largest offset PostgreSQL ships as an `Etc/GMT` zone
const MAX_ETC_OFFSET_HOURS: i32 = 14;

/// Range drawn from by [`SessionTimezone::random`]
pub const RANDOM_OFFSET_HOURS: std::ops::RangeInclusive<i32> = 1..=12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTimezone(String);

impl SessionTimezone {
    pub fn utc() -> Self {
        Self("UTC".to_string())
    }

    /// `Etc/GMT+N` with N uniform in 1..=12.
    ///
    /// The name reads "+N" but the `Etc` zones use the POSIX sign convention, so the session ends
    /// up N hours *west* of UTC (`Etc/GMT+5` is UTC-5). [`Self::utc_offset_seconds`] reports the
    /// real, east-positive offset.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let hours = rng.gen_range(RANDOM_OFFSET_HOURS);
        Self(format!("Etc/GMT+{}", hours))
    }

    pub fn parse(value: &str) -> Result<Self> {
        if is_zone_name(value) {
            Ok(Self(value.to_string()))
        } else {
            Err(DemoError::InvalidTimezone(value.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Offset from UTC in seconds, east positive. Known only for `UTC` and `Etc/GMT±N`; named
    /// regional zones depend on the date and the server's tz database.
    pub fn utc_offset_seconds(&self) -> Option<i32> {
        if self.0 == "UTC" {
            return Some(0);
        }
        parse_etc_hours(&self.0).map(|hours| -hours * 3600)
    }

    /// Builds `SET timezone TO '<value>'` by interpolation. Only sound because the value passed
    /// validation; never call with an unchecked string.
    pub fn set_statement(&self) -> String {
        format!("SET timezone TO '{}'", self.0)
    }
}

impl fmt::Display for SessionTimezone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_zone_name(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_NAME_LEN
        && value.split('/').all(|segment| {
            !segment.is_empty()
                && segment
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'+' | b'-'))
        })
}

/// Signed hour count of an `Etc/GMT±N` name as written (POSIX sign)
fn parse_etc_hours(value: &str) -> Option<i32> {
    let rest = value.strip_prefix("Etc/GMT")?;
    let (sign, digits) = match rest.as_bytes().first()? {
        b'+' => (1, &rest[1..]),
        b'-' => (-1, &rest[1..]),
        _ => return None,
    };

    if digits.is_empty()
        || digits.len() > 2
        || !digits.bytes().all(|b| b.is_ascii_digit())
        || (digits.len() == 2 && digits.starts_with('0'))
    {
        return None;
    }

    let hours: i32 = digits.parse().ok()?;
    (hours <= MAX_ETC_OFFSET_HOURS).then_some(sign * hours)
}
