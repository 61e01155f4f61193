use axum::{extract::Extension, routing::post, Json, Router};
use serde::Serialize;

use crate::config::CredentialSource;
use crate::error::ResetResult;
use crate::invoker::CreditResetInvoker;

pub const STATUS_MESSAGE: &str = "Subscription Reset Worker is active. Scheduled handler is configured. Use /manual-reset POST to trigger manually.";

#[derive(Debug, Serialize)]
pub struct ResetReport {
    pub status: &'static str,
    pub message: &'static str,
}

/// HTTP entry point: `POST /manual-reset` runs a reset, everything else gets the
/// status message.
pub fn router(invoker: CreditResetInvoker, source: CredentialSource) -> Router {
    Router::new()
        .route(
            "/manual-reset",
            post(manual_reset).fallback(service_status),
        )
        .fallback(service_status)
        .layer(Extension(invoker))
        .layer(Extension(source))
}

pub async fn manual_reset(
    Extension(invoker): Extension<CreditResetInvoker>,
    Extension(source): Extension<CredentialSource>,
) -> ResetResult<Json<ResetReport>> {
    invoker.invoke(&source.load()).await?;
    Ok(Json(ResetReport {
        status: "success",
        message: "Credits manually reset successfully.",
    }))
}

pub async fn service_status() -> &'static str {
    STATUS_MESSAGE
}
