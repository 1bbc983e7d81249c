//! Runs against a live PostgreSQL. Point `DATABASE_URL` at a scratch database and run with
//! `cargo test -- --ignored`.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serial_test::serial;

use tz_session_demo::config::{Profile, Settings};
use tz_session_demo::database;
use tz_session_demo::errors::DemoError;
use tz_session_demo::runner::Runner;

async fn runner(profile: Profile) -> Runner<Vec<u8>> {
    let settings = Settings::from_env(profile);
    let mut conn = database::connect(&settings.database_url)
        .await
        .expect("database must be reachable");
    database::ensure_schema(&mut conn).await.unwrap();

    Runner::new(conn, settings.profile, StdRng::seed_from_u64(11), Vec::new())
}

fn row_lines(output: Vec<u8>, profile: &Profile) -> Vec<String> {
    String::from_utf8(output)
        .unwrap()
        .lines()
        .filter(|line| profile.labels().iter().any(|label| line.contains(label)))
        .map(str::to_owned)
        .collect()
}

#[tokio::test]
#[serial]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn clear_table_leaves_no_rows() {
    let mut runner = runner(Profile::two_column()).await;
    runner.insert_data().await.unwrap();
    runner.clear_table().await.unwrap();

    assert_eq!(runner.count_rows().await.unwrap(), 0);
}

#[tokio::test]
#[serial]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn insert_data_adds_one_row_per_path() {
    let mut runner = runner(Profile::two_column()).await;
    runner.clear_table().await.unwrap();
    runner.insert_data().await.unwrap();

    assert_eq!(runner.count_rows().await.unwrap(), 3);

    let rows = runner.dump_all().await.unwrap();
    let mut names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
    names.sort();
    let mut labels = runner.profile().labels().to_vec();
    labels.sort();
    assert_eq!(names, labels);

    let mut sequence: Vec<_> = rows.iter().map(|r| r.n).collect();
    sequence.sort();
    sequence.dedup();
    assert_eq!(sequence.len(), 3);
    assert!(rows.iter().all(|r| r.ts.is_some() && r.tstz.is_some()));
}

#[tokio::test]
#[serial]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn dump_is_ordered_by_name_then_sequence() {
    let mut runner = runner(Profile::two_column()).await;
    runner.clear_table().await.unwrap();
    for _ in 0..3 {
        runner.set_random_timezone().await.unwrap();
        runner.insert_data().await.unwrap();
    }

    let rows = runner.dump_all().await.unwrap();
    assert_eq!(rows.len(), 9);
    for pair in rows.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(a.name <= b.name, "{} before {}", a.name, b.name);
        if a.name == b.name {
            assert!(a.n < b.n);
        }
    }
}

#[tokio::test]
#[serial]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn utc_session_renders_every_column_in_utc() {
    let profile = Profile::two_column();
    let mut runner = runner(profile.clone()).await;
    runner.clear_table().await.unwrap();
    runner.insert_data().await.unwrap();
    runner.set_timezone("UTC").await.unwrap();
    runner.dump_all().await.unwrap();

    let lines = row_lines(runner.into_output(), &profile);
    assert_eq!(lines.len(), 3);
    for label in profile.labels() {
        assert!(lines.iter().any(|line| line.contains(label)));
    }
    for line in &lines {
        assert_eq!(line.matches(" UTC").count(), 4, "{}", line);
    }
}

#[tokio::test]
#[serial]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn random_timezone_reaches_the_session() {
    let mut runner = runner(Profile::two_column()).await;
    let tz = runner.set_random_timezone().await.unwrap();

    assert_eq!(runner.session_timezone().await.unwrap(), tz.as_str());
    assert_eq!(
        Some(runner.session_offset_seconds().await.unwrap()),
        tz.utc_offset_seconds()
    );
    assert!(tz.utc_offset_seconds().unwrap() < 0);
}

#[tokio::test]
#[serial]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn regional_zone_reaches_the_session() {
    let mut runner = runner(Profile::two_column()).await;
    runner.set_timezone("Europe/Berlin").await.unwrap();

    assert_eq!(runner.session_timezone().await.unwrap(), "Europe/Berlin");
    let offset = runner.session_offset_seconds().await.unwrap();
    assert!(offset == 3600 || offset == 7200, "Berlin is {}s from UTC", offset);
}

#[tokio::test]
#[serial]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn unknown_zone_is_rejected_by_the_server() {
    let mut runner = runner(Profile::two_column()).await;
    runner.set_timezone("UTC").await.unwrap();

    let err = runner.set_timezone("Mars/Olympus_Mons").await.unwrap_err();
    assert!(matches!(err, DemoError::Database(_)));
    assert_eq!(runner.session_timezone().await.unwrap(), "UTC");
}

#[tokio::test]
#[serial]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn invalid_timezone_never_reaches_the_session() {
    let mut runner = runner(Profile::two_column()).await;
    runner.set_timezone("UTC").await.unwrap();

    let err = runner
        .set_timezone("UTC'; DELETE FROM test; --")
        .await
        .unwrap_err();
    assert!(matches!(err, DemoError::InvalidTimezone(_)));
    assert_eq!(runner.session_timezone().await.unwrap(), "UTC");
}

#[tokio::test]
#[serial]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn naive_profile_stores_utc_wall_clock() {
    let mut runner = runner(Profile::naive_utc()).await;
    runner.clear_table().await.unwrap();
    runner.set_timezone("Etc/GMT+7").await.unwrap();
    runner.insert_data().await.unwrap();

    let now = Utc::now().naive_utc();
    let profile = runner.profile().clone();
    let rows = runner.dump_all().await.unwrap();

    let default_row = rows.iter().find(|r| r.name == profile.default_label).unwrap();
    let local_drift = (now - default_row.ts.unwrap()).num_seconds();
    assert!(
        (7 * 3600 - 120..7 * 3600 + 120).contains(&local_drift),
        "column default should hold session-local time, got {}s behind UTC",
        local_drift
    );

    for row in rows.iter().filter(|r| r.name != profile.default_label) {
        let ts = row.ts.expect("timestamp stored");
        let drift = (now - ts).num_seconds().abs();
        assert!(drift < 120, "{} stored {} ({}s from UTC now)", row.name, ts, drift);
        assert!(row.tstz.is_none());
    }
}

#[tokio::test]
#[serial]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn full_run_prints_every_row_in_every_dump() {
    for profile in [Profile::two_column(), Profile::naive_utc()] {
        let mut runner = runner(profile.clone()).await;
        let rows = runner.run().await.unwrap();
        assert_eq!(rows.len(), profile.expected_total_rows());

        let lines = row_lines(runner.into_output(), &profile);
        assert_eq!(
            lines.len(),
            profile.expected_total_rows() * (profile.dump_rounds + 1)
        );
    }
}
