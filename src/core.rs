// core.rs
//
// Core types for the crate: the connect seam, its closure adapter, and the
// error taxonomy shared by every module.

use std::future::Future;

use async_trait::async_trait;

use crate::config::ConnectTarget;

/// Result alias for acquire operations
pub type AcquireResult<T> = Result<T, AcquireError>;

/// Result alias for the underlying connect operation
pub type ConnectResult<T> = Result<T, ConnectError>;

/// Failure reported by the underlying connect operation.
///
/// The message travels verbatim to every caller awaiting the attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ConnectError(pub String);

impl From<String> for ConnectError {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ConnectError {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Error type for acquiring a shared resource.
///
/// `Clone` because a single in-flight outcome is broadcast to every waiter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AcquireError {
    /// Missing or invalid connection target. Fatal; never retried
    /// automatically.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The underlying connect operation failed. The in-flight marker is
    /// cleared so the next acquire retries from scratch.
    #[error("initialization failed: {0}")]
    Initialization(#[from] ConnectError),

    /// The connect attempt exceeded the configured deadline. Recoverable,
    /// like `Initialization`.
    #[error("initialization timed out after {0}ms")]
    Timeout(u64),
}

/// The externally supplied connect operation.
///
/// Implementations may be slow and may fail. The cell guarantees at most one
/// invocation per initialization cycle; implementations must tolerate being
/// invoked again on a later cycle after a failure or a reset.
#[async_trait]
pub trait Connect: Send + Sync + 'static {
    type Resource: Send + Sync + 'static;

    async fn connect(&self, target: &ConnectTarget) -> ConnectResult<Self::Resource>;
}

/// Adapter turning an async closure into a [`Connect`] implementation.
pub struct ConnectFn<F> {
    f: F,
}

impl<F> ConnectFn<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut, R> Connect for ConnectFn<F>
where
    F: Fn(ConnectTarget) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ConnectResult<R>> + Send + 'static,
    R: Send + Sync + 'static,
{
    type Resource = R;

    async fn connect(&self, target: &ConnectTarget) -> ConnectResult<R> {
        (self.f)(target.clone()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_error_from_str_and_string() {
        assert_eq!(ConnectError::from("refused"), ConnectError::from("refused".to_string()));
        assert_eq!(format!("{}", ConnectError::from("refused")), "refused");
    }

    #[test]
    fn acquire_error_display_formats() {
        let err = AcquireError::Configuration("MONGO_URI is not set".to_string());
        assert_eq!(format!("{err}"), "configuration error: MONGO_URI is not set");

        let err = AcquireError::from(ConnectError::from("connection refused"));
        assert_eq!(format!("{err}"), "initialization failed: connection refused");

        let err = AcquireError::Timeout(250);
        assert_eq!(format!("{err}"), "initialization timed out after 250ms");
    }

    #[tokio::test]
    async fn connect_fn_passes_target_through() {
        let connector = ConnectFn::new(|target: ConnectTarget| async move {
            Ok::<_, ConnectError>(format!("connected to {}", target.as_str()))
        });
        let target = ConnectTarget::parse("redis://localhost:6379").unwrap();
        let resource = connector
            .connect(&target)
            .await
            .expect("closure connector should succeed");
        assert_eq!(resource, "connected to redis://localhost:6379");
    }

    #[tokio::test]
    async fn connect_fn_propagates_errors() {
        let connector = ConnectFn::new(|_target: ConnectTarget| async move {
            Err::<(), _>(ConnectError::from("connection refused"))
        });
        let target = ConnectTarget::parse("redis://localhost:6379").unwrap();
        let err = connector
            .connect(&target)
            .await
            .expect_err("closure connector should fail");
        assert_eq!(err, ConnectError::from("connection refused"));
    }
}
