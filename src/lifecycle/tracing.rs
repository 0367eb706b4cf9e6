//! # Observability & Tracing
//!
//! The [`setup_tracing`] function initializes structured logging with the
//! `tracing` crate. Every client method opens a span, and the mapper logs
//! each round trip inside it.
//!
//! ## Configuration
//!
//! The compact format hides the crate/module prefix (`with_target(false)`).
//! Log levels come from the `RUST_LOG` environment variable.
//!
//! ## What Gets Traced
//!
//! - **Requests**: `debug!` with the resource name and request path
//! - **Results**: `info!` with `resource`, `id` and item counts
//! - **Anomalies**: `warn!` for short or oversized pages and rejected deletes
//! - **Gateway**: job ids and function results of processing requests
//!
//! ## Usage Examples
//!
//! ```bash
//! # Results only
//! RUST_LOG=info cargo test
//!
//! # Every request path and response size
//! RUST_LOG=debug cargo test
//!
//! # Mapper only
//! RUST_LOG=billing_gateway::framework=debug cargo test
//! ```
//!
//! ## Output Example
//!
//! **With `RUST_LOG=debug`**:
//!
//! ```text
//! DEBUG find_all: Sending request
//! DEBUG find_all: Find all resource="invoices" page=1
//! DEBUG find_all:send: Response received status=200 bytes=5321
//! INFO find_all: Listed resource="invoices" count=42 pages=1
//! ```
//!
//! API keys never appear in logs: [`ApiConfig`](crate::config::ApiConfig)
//! redacts its key in `Debug` output.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // resource names are logged as fields
        .compact()
        .init();
}
