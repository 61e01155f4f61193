use anyhow::Context;
use credit_reset_worker::{config, CreditResetInvoker, ResetCredentials};

/// Runs a single credit reset and exits. Meant for an external cron.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    credit_reset_worker::init_tracing();

    let invoker = CreditResetInvoker::new(
        config::RESET_API_BASE_URL.as_str(),
        *config::RESET_REQUEST_TIMEOUT,
    )
    .context("failed to build reset API client")?;

    invoker
        .invoke(&ResetCredentials::from_env())
        .await
        .context("credit reset failed")?;
    Ok(())
}
