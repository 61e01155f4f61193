use std::io::Write;
use std::panic::{catch_unwind, resume_unwind, AssertUnwindSafe};
use std::sync::Mutex;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use credit_reset_worker::routes::router;
use credit_reset_worker::{CreditResetInvoker, CredentialSource, ResetCredentials};
use once_cell::sync::Lazy;
use serde_json::Value;
use tower::ServiceExt;

static ENV_GUARD: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

const SECRET_VARS: [&str; 4] = ["MY_AUTH_TOKEN", "MY_AUTH_TOKEN_FILE", "SUB_ID", "SUB_ID_FILE"];

fn with_env<T>(vars: &[(&str, Option<&str>)], f: impl FnOnce() -> T) -> T {
    let guard = ENV_GUARD.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let mut previous = Vec::with_capacity(vars.len());
    for (key, value) in vars {
        previous.push(((*key).to_string(), std::env::var(key).ok()));
        match value {
            Some(val) => std::env::set_var(key, val),
            None => std::env::remove_var(key),
        }
    }

    let result = catch_unwind(AssertUnwindSafe(f));

    for (key, old) in previous.into_iter() {
        if let Some(val) = old {
            std::env::set_var(&key, val);
        } else {
            std::env::remove_var(&key);
        }
    }

    drop(guard);

    match result {
        Ok(value) => value,
        Err(panic) => resume_unwind(panic),
    }
}

fn cleared_with(
    overrides: &[(&'static str, Option<&'static str>)],
) -> Vec<(&'static str, Option<&'static str>)> {
    let mut vars: Vec<_> = SECRET_VARS.iter().map(|key| (*key, None)).collect();
    vars.extend_from_slice(overrides);
    vars
}

#[test]
fn reads_secrets_from_environment() {
    let vars = cleared_with(&[("MY_AUTH_TOKEN", Some(" abc ")), ("SUB_ID", Some("123"))]);
    let credentials = with_env(&vars, ResetCredentials::from_env);
    assert_eq!(credentials, ResetCredentials::new("abc", "123"));
    assert!(credentials.is_complete());
}

#[test]
fn secret_files_take_precedence() {
    let mut token_file = tempfile::NamedTempFile::new().unwrap();
    writeln!(token_file, "from-file").unwrap();
    let token_path = token_file.path().to_str().unwrap().to_string();

    let vars = [
        ("MY_AUTH_TOKEN_FILE", Some(token_path.as_str())),
        ("MY_AUTH_TOKEN", Some("from-env")),
        ("SUB_ID_FILE", None),
        ("SUB_ID", Some("123")),
    ];
    let credentials = with_env(&vars, ResetCredentials::from_env);

    assert_eq!(credentials.auth_token, "from-file");
    assert_eq!(credentials.subscription_id, "123");
}

#[test]
fn unreadable_secret_file_falls_back_to_value() {
    let vars = cleared_with(&[
        ("MY_AUTH_TOKEN_FILE", Some("/nonexistent/credit-reset/token")),
        ("MY_AUTH_TOKEN", Some("abc")),
        ("SUB_ID", Some("123")),
    ]);
    let credentials = with_env(&vars, ResetCredentials::from_env);
    assert_eq!(credentials.auth_token, "abc");
}

#[test]
fn missing_secrets_load_as_incomplete() {
    let vars = cleared_with(&[]);
    let credentials = with_env(&vars, || CredentialSource::Environment.load());
    assert!(!credentials.is_complete());
}

#[test]
fn manual_reset_with_missing_environment_returns_500() {
    let invoker = CreditResetInvoker::new("http://127.0.0.1:1", None).unwrap();
    let app = router(invoker, CredentialSource::Environment);
    let request = Request::builder()
        .method(Method::POST)
        .uri("/manual-reset")
        .body(Body::empty())
        .unwrap();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    // credentials are read while the request is handled, so it runs with the env cleared
    let vars = cleared_with(&[]);
    let (status, body) = with_env(&vars, || {
        runtime.block_on(async {
            let response = app.oneshot(request).await.unwrap();
            let status = response.status();
            let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
            (status, body)
        })
    });

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["status"], "error");
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("environment variable is not set."));
}
