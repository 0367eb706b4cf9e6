//! System wiring and observability setup.
//!
//! This module contains the infrastructure a caller needs before talking to
//! the invoicing API:
//!
//! - **Client wiring**: one shared connection behind every typed client
//! - **Observability setup**: Initializing tracing and logging
//!
//! # Main Components
//!
//! - [`BillingSystem`] - Builds every typed client over a single [`ApiConnection`](crate::transport::ApiConnection)
//! - [`setup_tracing`] - Initializes the tracing/logging infrastructure

pub mod billing_system;
pub mod tracing;

pub use billing_system::*;
pub use tracing::*;
