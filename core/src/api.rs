//! Blocking facade that executes RecomPI calls end-to-end.
//!
//! # Design
//! `RecomPi` owns a `RecomClient` and a ureq agent; each operation is one
//! build → POST → parse round-trip, blocking the caller until the response
//! arrives or the transport times out. The agent disables
//! `http_status_as_error` so non-2xx responses come back as data and status
//! interpretation stays in the parse layer. No retries happen here; a
//! transient failure surfaces directly as `RecomError::Transport`. Timeouts
//! are whatever the agent is configured with; this layer adds none.

use tracing::debug;

use crate::client::RecomClient;
use crate::error::RecomError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Geo, Location, ProfileAttribute, Recommendations, Tag};

/// Blocking RecomPI client: `push`, `recom`, and `verify` as single
/// synchronous calls.
pub struct RecomPi {
    client: RecomClient,
    agent: ureq::Agent,
}

impl RecomPi {
    /// Facade for the production endpoint.
    pub fn new(api_key: &str) -> Result<Self, RecomError> {
        Ok(Self::with_client(RecomClient::new(api_key)?))
    }

    /// Facade around an already-configured `RecomClient` (custom base URL,
    /// hash salt, or API version).
    pub fn with_client(client: RecomClient) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { client, agent }
    }

    /// Record one user-interaction event.
    pub fn push(
        &self,
        label: &str,
        tags: &[Tag],
        profiles: &[ProfileAttribute],
        location: Option<&Location>,
        geo: Option<&Geo>,
    ) -> Result<(), RecomError> {
        let request = self
            .client
            .build_push(label, tags, profiles, location, geo)?;
        let response = self.execute(request)?;
        self.client.parse_push(response)
    }

    /// Query relevance scores for `labels`.
    pub fn recom(
        &self,
        labels: &[&str],
        profiles: &[ProfileAttribute],
        geo: Option<&Geo>,
    ) -> Result<Recommendations, RecomError> {
        let request = self.client.build_recom(labels, profiles, geo)?;
        let response = self.execute(request)?;
        self.client.parse_recom(response)
    }

    /// Check connectivity and credentials.
    pub fn verify(&self) -> Result<(), RecomError> {
        let request = self.client.build_verify()?;
        let response = self.execute(request)?;
        self.client.parse_verify(response)
    }

    /// Execute one request. Only the endpoint and status are logged; request
    /// bodies (and with them the hash salt's output) stay out of the logs.
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, RecomError> {
        debug!(endpoint = %request.path, "dispatching request");
        let mut response = match (&request.method, &request.body) {
            (HttpMethod::Get, _) => self.agent.get(&request.path).call(),
            (HttpMethod::Post, Some(body)) => self
                .agent
                .post(&request.path)
                .content_type("application/json")
                .send(body.as_bytes()),
            (HttpMethod::Post, None) => self.agent.post(&request.path).send_empty(),
        }
        .map_err(|e| RecomError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| RecomError::Transport(e.to_string()))?;
        debug!(status, "response received");

        Ok(HttpResponse {
            status,
            headers: Vec::new(),
            body,
        })
    }
}
