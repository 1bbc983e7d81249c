use tz_session_demo::config::Profile;

// Same sequence as the main binary, without `tstz` and with every timestamp stored as UTC
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tz_session_demo::init_tracing();
    tz_session_demo::run_profile(Profile::naive_utc()).await
}
