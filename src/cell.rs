//! Shared resource cell.
//!
//! A [`ResourceCell`] establishes its resource on first use, hands every
//! caller the same `Arc`, and collapses concurrent first callers onto a
//! single connect attempt. A failed attempt is never cached; the next
//! caller retries from scratch.

use std::{sync::Arc, time::Duration};

use futures::{
    future::{BoxFuture, Shared},
    FutureExt,
};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::{
    config::ConnectTarget,
    core::{AcquireError, AcquireResult, Connect},
};

/// One initialization attempt, shared by every caller that arrives while it
/// is outstanding.
type InitFuture<R> = Shared<BoxFuture<'static, AcquireResult<Arc<R>>>>;

enum State<R> {
    Uninitialized,
    Initializing(InitFuture<R>),
    Ready(Arc<R>),
}

/// Lazily initialized shared resource with in-flight deduplication.
///
/// The cell moves `Uninitialized -> Initializing -> Ready`, falling back to
/// `Uninitialized` when an attempt fails so a later call can retry. `Ready`
/// is the steady state; once reached, [`acquire`](ResourceCell::acquire)
/// returns without suspending.
pub struct ResourceCell<C: Connect> {
    connector: Arc<C>,
    target: ConnectTarget,
    connect_timeout: Option<Duration>,
    state: Mutex<State<C::Resource>>,
}

impl<C: Connect> ResourceCell<C> {
    pub fn new(connector: Arc<C>, target: ConnectTarget) -> Self {
        Self {
            connector,
            target,
            connect_timeout: None,
            state: Mutex::new(State::Uninitialized),
        }
    }

    /// Bound every connect attempt by `timeout`. An attempt that exceeds it
    /// fails with [`AcquireError::Timeout`] and the next call retries.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn target(&self) -> &ConnectTarget {
        &self.target
    }

    /// Return the shared resource, connecting on first use.
    ///
    /// Callers that arrive while an attempt is outstanding await that same
    /// attempt and share its outcome; at most one connect is ever in flight.
    /// A caller cancelled while waiting leaves the attempt intact for the
    /// remaining and future callers. Waiters are resumed in no particular
    /// order.
    pub async fn acquire(&self) -> AcquireResult<Arc<C::Resource>> {
        let pending = {
            let mut state = self.state.lock();
            match &*state {
                State::Ready(resource) => return Ok(Arc::clone(resource)),
                State::Initializing(pending) => {
                    debug!("joining in-flight initialization of {}", self.target);
                    pending.clone()
                }
                State::Uninitialized => {
                    let pending = self.start_attempt();
                    *state = State::Initializing(pending.clone());
                    pending
                }
            }
        };

        let outcome = pending.clone().await;
        self.settle(&pending, &outcome);
        outcome
    }

    /// The cached resource, if initialization has completed. Never suspends.
    pub fn get(&self) -> Option<Arc<C::Resource>> {
        match &*self.state.lock() {
            State::Ready(resource) => Some(Arc::clone(resource)),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(*self.state.lock(), State::Ready(_))
    }

    /// Clear the cell back to uninitialized, for test teardown and hot
    /// reload. Callers awaiting an attempt in flight at reset time still
    /// receive that attempt's outcome, but the cell no longer adopts it.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        if !matches!(*state, State::Uninitialized) {
            debug!("reset {} to uninitialized", self.target);
            *state = State::Uninitialized;
        }
    }

    fn start_attempt(&self) -> InitFuture<C::Resource> {
        let connector = Arc::clone(&self.connector);
        let target = self.target.clone();
        let connect_timeout = self.connect_timeout;

        async move {
            let attempt = connector.connect(&target);
            let outcome = match connect_timeout {
                Some(deadline) => match tokio::time::timeout(deadline, attempt).await {
                    Ok(outcome) => outcome,
                    Err(_) => {
                        let ms = deadline.as_millis() as u64;
                        warn!("initialization of {} timed out after {}ms", target, ms);
                        return Err(AcquireError::Timeout(ms));
                    }
                },
                None => attempt.await,
            };

            match outcome {
                Ok(resource) => {
                    info!("connected to {}", target);
                    Ok(Arc::new(resource))
                }
                Err(err) => {
                    warn!("initialization of {} failed: {}", target, err);
                    Err(AcquireError::from(err))
                }
            }
        }
        .boxed()
        .shared()
    }

    // Every waiter settles the attempt it awaited; the pointer check keeps
    // a stale attempt (superseded by a reset) from clobbering current state.
    fn settle(&self, pending: &InitFuture<C::Resource>, outcome: &AcquireResult<Arc<C::Resource>>) {
        let mut state = self.state.lock();
        if let State::Initializing(current) = &*state {
            if current.ptr_eq(pending) {
                *state = match outcome {
                    Ok(resource) => State::Ready(Arc::clone(resource)),
                    Err(_) => State::Uninitialized,
                };
            }
        }
    }
}
