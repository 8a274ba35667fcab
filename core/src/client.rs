//! Stateless HTTP request builder and response parser for the RecomPI API.
//!
//! # Design
//! `RecomClient` holds only immutable campaign configuration (base URL, API
//! key, API version, optional hash salt) and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The executor performs the actual HTTP round-trip, keeping this layer
//! deterministic and free of I/O dependencies.
//!
//! Validation happens entirely inside `build_*`: an invalid input fails fast
//! with `RecomError::InvalidField` before any request value exists.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::RecomError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Geo, Location, ProfileAttribute, Recommendations, Tag};

/// Production endpoint of the RecomPI service.
pub const BASE_URL: &str = "https://api.recompi.com";

const DEFAULT_VERSION: u32 = 2;

/// Synchronous, stateless client for the RecomPI API.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network. The `api::RecomPi` facade (or any caller bringing
/// its own transport) executes the HTTP round-trip between `build_*` and
/// `parse_*`.
#[derive(Debug, Clone)]
pub struct RecomClient {
    base_url: String,
    api_key: String,
    version: u32,
    hash_salt: Option<String>,
}

/// Body of a push call. The profiles of one event are merged into a single
/// mapping, one key per attribute dimension.
#[derive(Serialize)]
struct PushEnvelope<'a> {
    label: &'a str,
    tags: Vec<Value>,
    profiles: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    geo: Option<Value>,
    api_key: &'a str,
}

/// Body of a recom call: a list of labels instead of a single label, no tags.
#[derive(Serialize)]
struct RecomEnvelope<'a> {
    labels: &'a [&'a str],
    #[serde(skip_serializing_if = "Option::is_none")]
    profiles: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    geo: Option<Value>,
    api_key: &'a str,
}

#[derive(Serialize)]
struct VerifyEnvelope<'a> {
    api_key: &'a str,
}

impl RecomClient {
    /// Client for the production endpoint. `api_key` identifies the campaign.
    pub fn new(api_key: &str) -> Result<Self, RecomError> {
        Self::with_base_url(BASE_URL, api_key)
    }

    pub fn with_base_url(base_url: &str, api_key: &str) -> Result<Self, RecomError> {
        if api_key.is_empty() {
            return Err(RecomError::invalid_field(
                "RecomClient::new",
                "api_key",
                "must be a non-empty string",
            ));
        }
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            version: DEFAULT_VERSION,
            hash_salt: None,
        })
    }

    /// Salt applied when hashed profile attributes are serialized. The same
    /// salt must be used across push and recom calls for one campaign.
    pub fn hash_salt(mut self, salt: &str) -> Self {
        self.hash_salt = Some(salt.to_string());
        self
    }

    /// Override the API version segment of the endpoint paths (default: 2).
    pub fn api_version(mut self, version: u32) -> Result<Self, RecomError> {
        if version == 0 {
            return Err(RecomError::invalid_field(
                "RecomClient::api_version",
                "version",
                "must be greater than zero",
            ));
        }
        self.version = version;
        Ok(self)
    }

    /// Build the request recording one user-interaction event.
    ///
    /// `tags` may be empty; at least one profile is required and all profiles
    /// must share the same variant (plain or hashed).
    pub fn build_push(
        &self,
        label: &str,
        tags: &[Tag],
        profiles: &[ProfileAttribute],
        location: Option<&Location>,
        geo: Option<&Geo>,
    ) -> Result<HttpRequest, RecomError> {
        if label.is_empty() {
            return Err(RecomError::invalid_field(
                "push",
                "label",
                "must be a non-empty string",
            ));
        }
        if profiles.is_empty() {
            return Err(RecomError::invalid_field(
                "push",
                "profiles",
                "at least one profile must be provided",
            ));
        }
        check_uniform_kind("push", profiles)?;

        let envelope = PushEnvelope {
            label,
            tags: tags.iter().map(Tag::to_json).collect(),
            profiles: self.merge_profiles(profiles),
            location: location.map(Location::to_json),
            geo: geo.map(Geo::to_json),
            api_key: &self.api_key,
        };
        self.post_json("push", &envelope)
    }

    /// Build the request querying relevance scores for `labels`.
    ///
    /// Profiles are optional, but at least one of profiles or geo must be
    /// supplied; an unscoped query has nothing to personalize on.
    pub fn build_recom(
        &self,
        labels: &[&str],
        profiles: &[ProfileAttribute],
        geo: Option<&Geo>,
    ) -> Result<HttpRequest, RecomError> {
        if labels.is_empty() {
            return Err(RecomError::invalid_field(
                "recom",
                "labels",
                "at least one label must be provided",
            ));
        }
        if let Some(index) = labels.iter().position(|label| label.is_empty()) {
            return Err(RecomError::invalid_field(
                "recom",
                format!("labels[{index}]"),
                "must be a non-empty string",
            ));
        }
        if profiles.is_empty() && geo.is_none() {
            return Err(RecomError::invalid_field(
                "recom",
                "profiles",
                "at least one of profiles or geo must be provided",
            ));
        }
        check_uniform_kind("recom", profiles)?;

        let envelope = RecomEnvelope {
            labels,
            profiles: (!profiles.is_empty()).then(|| self.merge_profiles(profiles)),
            geo: geo.map(Geo::to_json),
            api_key: &self.api_key,
        };
        self.post_json("recom", &envelope)
    }

    /// Build the connectivity/credential check request. The body carries
    /// only the API key.
    pub fn build_verify(&self) -> Result<HttpRequest, RecomError> {
        self.post_json(
            "verify",
            &VerifyEnvelope {
                api_key: &self.api_key,
            },
        )
    }

    /// Interpret a push response. Success carries no payload.
    pub fn parse_push(&self, response: HttpResponse) -> Result<(), RecomError> {
        decode_envelope(response)?;
        Ok(())
    }

    /// Interpret a recom response: every top-level key besides the envelope
    /// fields is a label mapped to `{item_id: score}`.
    pub fn parse_recom(&self, response: HttpResponse) -> Result<Recommendations, RecomError> {
        let envelope = decode_envelope(response)?;
        let mut recommendations = Recommendations::default();
        for (key, value) in &envelope {
            if key == "success" || key == "message" {
                continue;
            }
            let entries = value.as_object().ok_or_else(|| {
                RecomError::MalformedResponse(format!(
                    "scores for label `{key}` are not a JSON object"
                ))
            })?;
            let mut scores = BTreeMap::new();
            for (item, score) in entries {
                let score = score.as_f64().ok_or_else(|| {
                    RecomError::MalformedResponse(format!(
                        "score for `{key}`/`{item}` is not a number"
                    ))
                })?;
                scores.insert(item.clone(), score);
            }
            recommendations.scores.insert(key.clone(), scores);
        }
        Ok(recommendations)
    }

    /// Interpret a verify response: only the success flag and optional
    /// message, never scores.
    pub fn parse_verify(&self, response: HttpResponse) -> Result<(), RecomError> {
        decode_envelope(response)?;
        Ok(())
    }

    fn endpoint(&self, op: &str) -> String {
        format!("{}/{op}/v{}", self.base_url, self.version)
    }

    /// Merge single-key profile mappings into one object, one attribute
    /// dimension per key.
    fn merge_profiles(&self, profiles: &[ProfileAttribute]) -> Value {
        let mut merged = Map::new();
        for profile in profiles {
            if let Value::Object(map) = profile.to_json(self.hash_salt.as_deref()) {
                merged.extend(map);
            }
        }
        Value::Object(merged)
    }

    fn post_json(&self, op: &str, envelope: &impl Serialize) -> Result<HttpRequest, RecomError> {
        let body = serde_json::to_string(envelope)
            .map_err(|e| RecomError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: self.endpoint(op),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }
}

/// All profiles of one call must share the same variant tag.
fn check_uniform_kind(
    op: &'static str,
    profiles: &[ProfileAttribute],
) -> Result<(), RecomError> {
    let Some(first) = profiles.first() else {
        return Ok(());
    };
    if let Some(index) = profiles.iter().position(|p| p.kind() != first.kind()) {
        return Err(RecomError::invalid_field(
            op,
            format!("profiles[{index}]"),
            "profiles must be all plain or all hashed",
        ));
    }
    Ok(())
}

/// Check the HTTP status, decode the body, and unwrap the `success` /
/// `message` envelope. Returns the full top-level object on success.
fn decode_envelope(response: HttpResponse) -> Result<Map<String, Value>, RecomError> {
    if !(200..300).contains(&response.status) {
        return Err(RecomError::Http {
            status: response.status,
            body: response.body,
        });
    }
    let value: Value = serde_json::from_str(&response.body)
        .map_err(|e| RecomError::MalformedResponse(e.to_string()))?;
    let Value::Object(envelope) = value else {
        return Err(RecomError::MalformedResponse(
            "response body is not a JSON object".to_string(),
        ));
    };
    match envelope.get("success") {
        Some(Value::Bool(true)) => Ok(envelope),
        Some(Value::Bool(false)) => Err(RecomError::Service {
            message: envelope
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("service reported failure without a message")
                .to_string(),
        }),
        _ => Err(RecomError::MalformedResponse(
            "missing or non-boolean `success` key".to_string(),
        )),
    }
}
