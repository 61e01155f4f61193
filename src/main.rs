use anyhow::Context;
use credit_reset_worker::{
    config, routes, scheduler, shutdown::shutdown_signal, CreditResetInvoker, CredentialSource,
    Lifecycle,
};
use std::net::SocketAddr;
use tokio::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    credit_reset_worker::init_tracing();

    let invoker = CreditResetInvoker::new(
        config::RESET_API_BASE_URL.as_str(),
        *config::RESET_REQUEST_TIMEOUT,
    )
    .context("failed to build reset API client")?;
    let lifecycle = Lifecycle::new();

    let interval = Duration::from_secs(*config::RESET_INTERVAL_SECS);
    let timer = scheduler::spawn(
        invoker.clone(),
        CredentialSource::Environment,
        lifecycle.clone(),
        interval,
        *config::RESET_ON_STARTUP,
    );
    tracing::info!(
        interval_secs = interval.as_secs(),
        run_on_start = *config::RESET_ON_STARTUP,
        "credit reset timer started"
    );

    let app = routes::router(invoker, CredentialSource::Environment);
    let addr: SocketAddr = format!("{}:{}", config::BIND_ADDRESS.as_str(), *config::BIND_PORT)
        .parse()
        .context("invalid BIND_ADDRESS/BIND_PORT")?;
    tracing::info!(%addr, "Listening for incoming connections");
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    timer.abort();
    tracing::info!(pending = lifecycle.pending(), "waiting for in-flight resets");
    lifecycle.drain().await;
    tracing::info!("credit reset worker stopped");

    Ok(())
}
