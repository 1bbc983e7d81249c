use tz_session_demo::config::Profile;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tz_session_demo::init_tracing();
    tz_session_demo::run_profile(Profile::two_column()).await
}
