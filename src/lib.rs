//! # Billing Gateway
//!
//! > **Typed async clients for an XML invoicing API, plus a card payment gateway.**
//!
//! This crate maps the invoicing service's REST resources (invoices, offers,
//! clients, articles...) onto plain Rust structs, and talks to a card
//! processing gateway and its hosted payment page.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### One engine, many resources
//!
//! Every resource is a struct with a static field table. The generic
//! [`ResourceMapper<T>`](framework::ResourceMapper) reads those tables to
//! serialize, parse, page and gate requests, so adding a resource means
//! declaring its fields and registering it, never writing another request
//! loop.
//!
//! ### Typed tables instead of reflection
//!
//! A [`FieldDescriptor<T>`](framework::FieldDescriptor) pairs a wire name with
//! a getter and a setter for one struct member. The wire type follows from the
//! member's Rust type, so a table cannot declare a field as an integer and
//! store a string in it.
//!
//! ## 🚀 Core Concepts
//!
//! ### Generics: The Power of `T`
//! You'll see `ResourceMapper<T: Resource>` everywhere. The paging loop, the
//! permission gate and the create write-back are written **once** and work for
//! every type that implements [`Resource`](framework::Resource).
//!
//! ### Mocking: Testing without a Server
//! Every request goes through the [`Transport`](transport::Transport) trait.
//! Tests plug in [`MockTransport`](framework::mock::MockTransport) and assert
//! on the recorded requests. See the [`framework::mock`] module.
//!
//! ## 👩‍💻 Architecture Notes
//!
//! ### 1. Type-Safe Error Handling
//! [`framework::Error`] has one variant per failure kind (configuration,
//! permissions, codec, authorization, not found, request failure), and
//! [`Error::kind`](framework::Error::kind) gives a flat enum for branching.
//! The gateway has its own [`GatewayError`](gateway::GatewayError), which
//! wraps transport failures via `#[from]`.
//!
//! ### 2. Validation Before the Wire
//! Credentials are checked when they are assigned. Permissions and mandatory
//! fields are checked before a request is built, so a refused operation never
//! reaches the server.
//!
//! ### 3. Concurrency Model
//! All operations are `async` on tokio. Clients share one
//! [`ApiConnection`](transport::ApiConnection) behind an `Arc` and hold no
//! mutable state, so they can be cloned into as many tasks as needed.
//!
//! ### 4. Observability
//! We use `tracing` everywhere with structured fields. Client methods open a
//! span; the mapper logs each request and result inside it.
//! See the [`lifecycle::tracing`] module for details.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Engine ([`framework`])
//! Codec, field descriptors, registry and the generic CRUD mapper.
//! - **Key items**: [`Resource`](framework::Resource), [`ResourceMapper`](framework::ResourceMapper), [`Registry`](framework::Registry).
//!
//! ### 2. The Resources ([`model`])
//! One struct per remote resource, with its field table and create checks.
//! - **Key items**: [`Invoice`](model::Invoice), [`Customer`](model::Customer), [`REGISTRY`](model::REGISTRY).
//!
//! ### 3. The Interface ([`clients`])
//! Typed clients with filters and document actions (PDF, complete, e-mail).
//! - **Key items**: [`ResourceClient`](clients::ResourceClient), [`InvoiceClient`](clients::InvoiceClient).
//!
//! ### 4. The Wiring ([`lifecycle`], [`config`], [`transport`])
//! Account settings, the HTTP seam and the object that builds every client.
//! - **Key items**: [`ApiConfig`](config::ApiConfig), [`BillingSystem`](lifecycle::BillingSystem).
//!
//! ### 5. Payments ([`gateway`])
//! Processing jobs, response parsing, QPay checkout and fingerprints.
//!
//! ## 🚀 Quick Start
//!
//! ```ignore
//! let config = ApiConfig::new("mycompany", "0123456789abcdef0123456789abcdef")?;
//! let system = BillingSystem::new(config)?;
//!
//! let open = system
//!     .invoices
//!     .find_all(&InvoiceFilter::default().status(InvoiceStatus::Open))
//!     .await?;
//! ```
//!
//! ### Running Tests
//!
//! ```bash
//! cargo test
//! ```

pub mod clients;
pub mod config;
pub mod framework;
pub mod gateway;
pub mod lifecycle;
pub mod model;
pub mod transport;
pub mod xml;
