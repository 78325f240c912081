//! No-I/O connector.
//!
//! Yields a preconstructed resource without touching any backend. Useful
//! when the real backend is disabled and in embedding-application tests.

use async_trait::async_trait;

use crate::{
    config::ConnectTarget,
    core::{Connect, ConnectResult},
};

/// Connector that clones out a preconstructed resource and never fails.
#[derive(Debug, Clone)]
pub struct NoopConnect<R> {
    resource: R,
}

impl<R> NoopConnect<R> {
    pub fn new(resource: R) -> Self {
        Self { resource }
    }
}

#[async_trait]
impl<R> Connect for NoopConnect<R>
where
    R: Clone + Send + Sync + 'static,
{
    type Resource = R;

    async fn connect(&self, _target: &ConnectTarget) -> ConnectResult<R> {
        Ok(self.resource.clone())
    }
}
