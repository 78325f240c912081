//! Lazily initialized shared connections with in-flight deduplication.
//!
//! Provides:
//! - A connection target read from the environment and validated up front
//! - A cell that establishes a shared resource at most once per
//!   initialization cycle, whatever the number of concurrent callers
//! - A registry keying such cells by connection target
//!
//! The underlying connect operation is supplied by the caller through the
//! [`Connect`] trait; this crate never talks to a concrete backend itself.

pub mod config;
mod core;

mod cell;
mod noop;
mod registry;

// Re-export config types
pub use config::ConnectTarget;
// Re-export core types and traits
pub use core::{AcquireError, AcquireResult, Connect, ConnectError, ConnectFn, ConnectResult};

pub use cell::ResourceCell;
pub use noop::NoopConnect;
pub use registry::ResourceRegistry;
