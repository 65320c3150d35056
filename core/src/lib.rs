//! Core of a small end-to-end harness for REST APIs.
//!
//! # Overview
//! Three pieces that scenarios combine:
//! - [`ConfigStore`]: base URL, timeout and default headers from a layered
//!   properties source.
//! - [`ApiClient`]: sends one request per call, overlays caller headers on the
//!   defaults, logs the exchange and returns an [`ApiResponse`].
//! - [`FixtureStore`]: resolves symbolic endpoint/status keys and loads JSON
//!   payloads.
//!
//! # Design
//! - Everything is blocking and single-call; scenarios may run in parallel,
//!   so the shared config and fixture catalog initialize exactly once.
//! - The network step sits behind [`Transport`], so the client can be driven
//!   by canned responses in tests.
//! - `ConfigError` (harness cannot run) is kept apart from `FixtureError` and
//!   `TransportError` (one scenario fails).

pub mod client;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod http;
pub mod logging;
pub mod properties;
pub mod transport;
pub mod types;

pub use client::{ApiClient, ApiResponse};
pub use config::{ConfigStore, Headers};
pub use error::{ConfigError, FixtureError, TransportError};
pub use fixtures::{item, Dataset, FixtureStore, Operation, Resource, Validity};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{Transport, UreqTransport};
pub use types::{Post, Todo, User};
