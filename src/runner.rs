//! The demo itself: switch session timezones between writes and reads and print what comes back.

use std::io::Write;

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, Utc};
use rand::rngs::StdRng;
use sqlx::PgConnection;
use tracing::{debug, info, warn};

use crate::config::{ClientTimestamp, Profile, TABLE_NAME};
use crate::database;
use crate::errors::Result;
use crate::format::{now_line, row_line};
use crate::models::TimestampRow;
use crate::timezone::SessionTimezone;

pub struct Runner<W: Write> {
    conn: PgConnection,
    profile: Profile,
    rng: StdRng,
    out: W,
}

impl<W: Write> Runner<W> {
    pub fn new(conn: PgConnection, profile: Profile, rng: StdRng, out: W) -> Self {
        Self {
            conn,
            profile,
            rng,
            out,
        }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Full sequence; returns the rows of the final dump under UTC
    pub async fn run(&mut self) -> Result<Vec<TimestampRow>> {
        info!("▶️ Running profile '{}'", self.profile.name);

        let now = Local::now().fixed_offset();
        writeln!(self.out, "{}", now_line(&now))?;
        writeln!(self.out)?;

        self.clear_table().await?;

        let default_tz = self.session_timezone().await?;
        writeln!(self.out, "Using default timezone from DB ({})", default_tz)?;
        self.insert_data().await?;

        for _ in 0..self.profile.insert_rounds {
            self.set_random_timezone().await?;
            self.insert_data().await?;
        }

        for _ in 0..self.profile.dump_rounds {
            self.set_random_timezone().await?;
            self.dump_all().await?;
        }

        self.set_timezone("UTC").await?;
        let rows = self.dump_all().await?;

        info!("✅ Profile '{}' finished with {} rows", self.profile.name, rows.len());
        Ok(rows)
    }

    pub async fn clear_table(&mut self) -> Result<()> {
        let result = sqlx::query(&format!("DELETE FROM {}", TABLE_NAME))
            .execute(&mut self.conn)
            .await?;
        debug!("Cleared {} rows from {}", result.rows_affected(), TABLE_NAME);
        Ok(())
    }

    /// Applies `tz` to the session. Names not shaped like a zone path are rejected before reaching
    /// the database, since the statement is built by interpolation; unknown zones fail server-side.
    pub async fn set_timezone(&mut self, tz: &str) -> Result<()> {
        let tz = SessionTimezone::parse(tz)?;
        self.apply_timezone(&tz).await
    }

    pub async fn set_random_timezone(&mut self) -> Result<SessionTimezone> {
        let tz = SessionTimezone::random(&mut self.rng);
        self.apply_timezone(&tz).await?;
        Ok(tz)
    }

    async fn apply_timezone(&mut self, tz: &SessionTimezone) -> Result<()> {
        writeln!(self.out, "Setting timezone to {}", tz)?;
        sqlx::query(&tz.set_statement())
            .execute(&mut self.conn)
            .await?;

        let offset = self.session_offset_seconds().await?;
        match tz.utc_offset_seconds() {
            Some(expected) if expected != offset => {
                warn!("⚠️ {} should be {}s from UTC, server reports {}s", tz, expected, offset);
            }
            _ => info!("🕒 Session timezone is now {} ({:+}s from UTC)", tz, offset),
        }
        Ok(())
    }

    /// One row per insertion path: column default, server clock, client clock
    pub async fn insert_data(&mut self) -> Result<()> {
        let labels = self.profile.labels();

        writeln!(self.out, "Inserting data with now()")?;

        sqlx::query(&format!("INSERT INTO {} (name) VALUES ($1)", TABLE_NAME))
            .bind(labels[0])
            .execute(&mut self.conn)
            .await?;

        let expr = self.profile.server_ts_expr;
        let server_sql = if self.profile.with_tstz {
            format!(
                "INSERT INTO {} (name, ts, tstz) VALUES ($1, {}, {})",
                TABLE_NAME, expr, expr
            )
        } else {
            format!("INSERT INTO {} (name, ts) VALUES ($1, {})", TABLE_NAME, expr)
        };
        sqlx::query(&server_sql)
            .bind(labels[1])
            .execute(&mut self.conn)
            .await?;

        let now = Local::now().fixed_offset();
        writeln!(self.out, "Inserting data with {}", now)?;
        let (ts, tstz) = client_values(&now, self.profile.client_ts);

        if self.profile.with_tstz {
            sqlx::query(&format!(
                "INSERT INTO {} (name, ts, tstz) VALUES ($1, $2, $3)",
                TABLE_NAME
            ))
            .bind(labels[2])
            .bind(ts)
            .bind(tstz)
            .execute(&mut self.conn)
            .await?;
        } else {
            sqlx::query(&format!("INSERT INTO {} (name, ts) VALUES ($1, $2)", TABLE_NAME))
                .bind(labels[2])
                .bind(ts)
                .execute(&mut self.conn)
                .await?;
        }

        debug!("Inserted 3 rows at client time {}", now);
        Ok(())
    }

    pub async fn dump_all(&mut self) -> Result<Vec<TimestampRow>> {
        let rows = database::select_all(&mut self.conn, self.profile.with_tstz).await?;
        for row in &rows {
            writeln!(self.out, "{}", row_line(row, self.profile.with_tstz))?;
        }
        self.out.flush()?;
        Ok(rows)
    }

    pub async fn session_timezone(&mut self) -> Result<String> {
        database::current_timezone(&mut self.conn).await
    }

    pub async fn session_offset_seconds(&mut self) -> Result<i32> {
        database::current_offset_seconds(&mut self.conn).await
    }

    pub async fn count_rows(&mut self) -> Result<i64> {
        database::count_rows(&mut self.conn).await
    }
}

/// Values bound for `ts` and `tstz` on the client-time path
fn client_values(
    now: &DateTime<FixedOffset>,
    mode: ClientTimestamp,
) -> (NaiveDateTime, DateTime<FixedOffset>) {
    match mode {
        ClientTimestamp::LocalWallClock => (now.naive_local(), *now),
        ClientTimestamp::ConvertedToUtc => {
            let utc = now.with_timezone(&Utc);
            (utc.naive_utc(), utc.fixed_offset())
        }
    }
}
