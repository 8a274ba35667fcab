//! Synchronous client for the RecomPI analytics/recommendation service.
//!
//! # Overview
//! Formats user-behavior events (`push`) and recommendation queries
//! (`recom`) into JSON-over-HTTPS requests and parses the responses into
//! typed results. There is deliberately no engine here: no cache, no queue,
//! no retries. One outbound POST per call, everything else lives on the
//! service side.
//!
//! # Design
//! - `RecomClient` is stateless: it holds only the immutable campaign
//!   configuration (base URL, API key, API version, optional hash salt).
//! - Each operation is split into `build_*` (produces an `HttpRequest`) and
//!   `parse_*` (consumes an `HttpResponse`), so the I/O boundary is explicit
//!   and the core stays deterministic and testable.
//! - `api::RecomPi` is the blocking facade that runs the round-trip with
//!   ureq for callers that don't bring their own transport.
//! - Profile attributes are a tagged union: `Plain` sends identifiers in the
//!   clear, `Hashed` replaces them with a salted SHA-256 digest.

pub mod api;
pub mod client;
pub mod error;
pub mod hash;
pub mod http;
pub mod types;

pub use api::RecomPi;
pub use client::{RecomClient, BASE_URL};
pub use error::RecomError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{Geo, Location, ProfileAttribute, ProfileKind, Recommendations, Tag};
