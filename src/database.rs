use sqlx::{
    postgres::{PgConnectOptions, PgConnection},
    Connection,
};
use std::str::FromStr;

use crate::config::TABLE_NAME;
use crate::errors::Result;
use crate::models::{StoredRow, TimestampRow};

/// Opens the single connection the demo runs on.
///
/// A pool would hand out different sessions, and `SET timezone` only affects the session that
/// issued it, so everything goes through one `PgConnection`.
pub async fn connect(database_url: &str) -> Result<PgConnection> {
    let options = PgConnectOptions::from_str(database_url)?
        .application_name("tz-session-demo");

    let conn = PgConnection::connect_with(&options).await?;
    Ok(conn)
}

pub async fn ensure_schema(conn: &mut PgConnection) -> Result<()> {
    let sql = format!(
        "CREATE TABLE IF NOT EXISTS {} (
            n SERIAL PRIMARY KEY,
            name TEXT NOT NULL,
            ts TIMESTAMP DEFAULT now(),
            tstz TIMESTAMPTZ DEFAULT now()
        )",
        TABLE_NAME
    );
    sqlx::query(&sql).execute(&mut *conn).await?;
    Ok(())
}

pub async fn current_timezone(conn: &mut PgConnection) -> Result<String> {
    let tz: (String,) = sqlx::query_as("SELECT current_setting('TIMEZONE')")
        .fetch_one(&mut *conn)
        .await?;
    Ok(tz.0)
}

/// Offset the session currently applies, in seconds east of UTC
pub async fn current_offset_seconds(conn: &mut PgConnection) -> Result<i32> {
    let offset: (i32,) = sqlx::query_as("SELECT EXTRACT(TIMEZONE FROM now())::int4")
        .fetch_one(&mut *conn)
        .await?;
    Ok(offset.0)
}

pub async fn count_rows(conn: &mut PgConnection) -> Result<i64> {
    let count: (i64,) = sqlx::query_as(&format!("SELECT count(*) FROM {}", TABLE_NAME))
        .fetch_one(&mut *conn)
        .await?;
    Ok(count.0)
}

/// All rows ordered by name, then sequence number
pub async fn select_all(conn: &mut PgConnection, with_tstz: bool) -> Result<Vec<TimestampRow>> {
    let tstz_columns = if with_tstz {
        "tstz, EXTRACT(TIMEZONE FROM tstz)::int4 AS tstz_offset"
    } else {
        "NULL::timestamptz AS tstz, NULL::int4 AS tstz_offset"
    };
    let sql = format!(
        "SELECT n, name, ts, {} FROM {} ORDER BY name, n",
        tstz_columns, TABLE_NAME
    );

    let rows = sqlx::query_as::<_, StoredRow>(&sql)
        .fetch_all(&mut *conn)
        .await?;

    Ok(rows.into_iter().map(TimestampRow::from).collect())
}
