pub mod config;
pub mod error;
pub mod invoker;
pub mod lifecycle;
pub mod routes;
pub mod scheduler;
pub mod shutdown;

pub use config::{CredentialSource, ResetCredentials};
pub use error::{ResetError, ResetResult};
pub use invoker::CreditResetInvoker;
pub use lifecycle::Lifecycle;

/// Installs the JSON log subscriber used by the binaries. Filtering follows `RUST_LOG`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .json()
        .init();
}
