//! Fixed parameters of the demo and the two run profiles.

/// Connection string used when `DATABASE_URL` is not set
pub const DEFAULT_DATABASE_URL: &str = "postgres://postgres:@localhost:5433/postgres?sslmode=disable";

/// Working table shared by both profiles
pub const TABLE_NAME: &str = "test";

/// Clock part of the display format; the zone abbreviation is appended separately
pub const DISPLAY_FORMAT: &str = "%H:%M";

/// Insert rounds after the initial one, per profile
pub const TWO_COLUMN_INSERT_ROUNDS: usize = 5;
pub const NAIVE_UTC_INSERT_ROUNDS: usize = 3;

/// Dumps under a random timezone before the final UTC dump
pub const RANDOM_DUMP_ROUNDS: usize = 2;

/// How the client-captured wall clock is bound on the client-time insert path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientTimestamp {
    /// Local wall-clock reading, zone kept for `tstz` and dropped for `ts`
    LocalWallClock,
    /// Converted to UTC before binding
    ConvertedToUtc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub name: &'static str,
    pub with_tstz: bool,
    pub insert_rounds: usize,
    pub dump_rounds: usize,
    /// SQL expression used for every timestamp column on the server-time path
    pub server_ts_expr: &'static str,
    pub client_ts: ClientTimestamp,
    pub default_label: &'static str,
    pub server_label: &'static str,
    pub client_label: &'static str,
}

impl Profile {
    /// Naive `ts` plus aware `tstz`, client time stored with its own zone
    pub fn two_column() -> Self {
        Self {
            name: "two-column",
            with_tstz: true,
            insert_rounds: TWO_COLUMN_INSERT_ROUNDS,
            dump_rounds: RANDOM_DUMP_ROUNDS,
            server_ts_expr: "now()",
            client_ts: ClientTimestamp::LocalWallClock,
            default_label: "from default now()",
            server_label: "from now()",
            client_label: "from client wall-clock",
        }
    }

    /// Naive `ts` only. The server-time and client-time paths store UTC wall clock; the
    /// column-default path still stores the session-local `now()`.
    pub fn naive_utc() -> Self {
        Self {
            name: "naive-utc",
            with_tstz: false,
            insert_rounds: NAIVE_UTC_INSERT_ROUNDS,
            dump_rounds: RANDOM_DUMP_ROUNDS,
            server_ts_expr: "now() AT TIME ZONE 'UTC'",
            client_ts: ClientTimestamp::ConvertedToUtc,
            default_label: "from default now()",
            server_label: "from now() at UTC",
            client_label: "from client wall-clock as UTC",
        }
    }

    pub fn labels(&self) -> [&'static str; 3] {
        [self.default_label, self.server_label, self.client_label]
    }

    /// Rows present after a complete run starting from an empty table
    pub fn expected_total_rows(&self) -> usize {
        (1 + self.insert_rounds) * self.labels().len()
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub profile: Profile,
}

impl Settings {
    pub fn from_env(profile: Profile) -> Self {
        dotenvy::dotenv().ok();

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        Self {
            database_url,
            profile,
        }
    }
}
