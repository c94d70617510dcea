use std::process::ExitCode;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt().init();
    let config = kanban_server::config::Config::from_env()?;
    let shutdown = kanban_server::web::start_web_server(config).await?;
    Ok(shutdown.map_or(ExitCode::SUCCESS, |signal| {
        ExitCode::from(signal.exit_code())
    }))
}
