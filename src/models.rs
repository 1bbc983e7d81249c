use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, Utc};
use sqlx::FromRow;

/// Row as read from the working table.
///
/// `tstz_offset` is the session offset PostgreSQL applied to `tstz` when it was read
/// (`EXTRACT(TIMEZONE FROM tstz)`), so the value can be shown in the zone it nominally carries.
#[derive(Debug, Clone, FromRow)]
pub struct StoredRow {
    pub n: i32,
    pub name: String,
    pub ts: Option<NaiveDateTime>,
    pub tstz: Option<DateTime<Utc>>,
    pub tstz_offset: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampRow {
    pub n: i32,
    pub name: String,
    pub ts: Option<NaiveDateTime>,
    pub tstz: Option<DateTime<FixedOffset>>,
}

impl From<StoredRow> for TimestampRow {
    fn from(row: StoredRow) -> Self {
        let offset = row
            .tstz_offset
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix());

        Self {
            n: row.n,
            name: row.name,
            ts: row.ts,
            tstz: row.tstz.map(|t| t.with_timezone(&offset)),
        }
    }
}
