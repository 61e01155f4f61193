use reqwest::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::Client;
use std::time::Duration;
use tracing::{error, info};

use crate::config::ResetCredentials;
use crate::error::{ResetError, ResetResult};

/// User agent presented to the reset API.
pub const RESET_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

const ACCEPT_HEADER_VALUE: &str = "application/json, text/plain, */*";

/// The API expects a JSON `null` document rather than an empty body.
const RESET_BODY: &str = "null";

/// Maximum number of characters of an error body carried in [`ResetError::Api`].
pub const BODY_PREVIEW_CHARS: usize = 100;

/// Performs the credit reset call against the subscription API.
///
/// Every call to [`CreditResetInvoker::invoke`] is exactly one attempt. Retrying is
/// left to whoever triggered the call.
#[derive(Clone, Debug)]
pub struct CreditResetInvoker {
    client: Client,
    base_url: String,
}

impl CreditResetInvoker {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self, subscription_id: &str) -> String {
        format!("{}/api/reset-credits/{}", self.base_url, subscription_id)
    }

    pub async fn invoke(&self, credentials: &ResetCredentials) -> ResetResult<()> {
        if !credentials.is_complete() {
            let err = ResetError::Configuration;
            error!(error = %err, "credit reset skipped: missing credentials");
            return Err(err);
        }

        info!("Attempting to reset subscription credits");

        let response = self
            .client
            .post(self.endpoint(&credentials.subscription_id))
            .header(ACCEPT, ACCEPT_HEADER_VALUE)
            .bearer_auth(&credentials.auth_token)
            .header(CONTENT_TYPE, "application/json")
            .header(USER_AGENT, RESET_USER_AGENT)
            .body(RESET_BODY)
            .send()
            .await
            .map_err(|err| {
                // the URL carries the subscription id
                let err = err.without_url();
                error!(error = %err, "credit reset request failed before a response arrived");
                ResetError::Transport(err)
            })?;

        let status = response.status();
        if status.is_success() {
            info!(status = status.as_u16(), "Subscription credits reset successfully");
            return Ok(());
        }

        // A body that cannot be read is reported as empty.
        let body = response.text().await.unwrap_or_default();
        error!(status = status.as_u16(), %body, "credit reset API call failed");
        Err(ResetError::Api {
            status: status.as_u16(),
            body_preview: body_preview(&body),
        })
    }
}

pub fn body_preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}
