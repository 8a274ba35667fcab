//! In-memory stand-in for the RecomPI service, used by integration tests.
//!
//! Accepts the same JSON envelopes the real service does: push events are
//! recorded per campaign, recom answers with count-based relevance scores
//! computed from previously pushed events, and verify checks the API key.
//! Responses always carry the `success` flag; failures add a `message`.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TagBody {
    pub id: String,
    pub name: String,
    pub desc: String,
}

#[derive(Deserialize)]
pub struct PushBody {
    pub api_key: String,
    pub label: String,
    #[serde(default)]
    pub tags: Vec<TagBody>,
    pub profiles: HashMap<String, String>,
    #[serde(default)]
    pub location: Option<Value>,
    #[serde(default)]
    pub geo: Option<Value>,
}

#[derive(Deserialize)]
pub struct RecomBody {
    pub api_key: String,
    pub labels: Vec<String>,
    #[serde(default)]
    pub profiles: Option<HashMap<String, String>>,
    #[serde(default)]
    pub geo: Option<Value>,
}

#[derive(Deserialize)]
pub struct VerifyBody {
    pub api_key: String,
}

/// One recorded push event.
#[derive(Clone, Debug, Serialize)]
pub struct RecordedEvent {
    pub id: Uuid,
    pub label: String,
    pub tags: Vec<TagBody>,
    pub profiles: HashMap<String, String>,
}

/// A single campaign: the accepted API key plus its recorded events.
pub struct Campaign {
    api_key: String,
    events: RwLock<Vec<RecordedEvent>>,
}

pub type Db = Arc<Campaign>;

pub fn app(api_key: &str) -> Router {
    let db: Db = Arc::new(Campaign {
        api_key: api_key.to_string(),
        events: RwLock::new(Vec::new()),
    });
    Router::new()
        .route("/push/{version}", post(push_event))
        .route("/recom/{version}", post(recom))
        .route("/verify/{version}", post(verify))
        .with_state(db)
}

pub async fn run(listener: TcpListener, api_key: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app(api_key)).await
}

fn failure(message: &str) -> Json<Value> {
    Json(json!({ "success": false, "message": message }))
}

async fn push_event(
    State(db): State<Db>,
    Path(_version): Path<String>,
    Json(body): Json<PushBody>,
) -> Json<Value> {
    if body.api_key != db.api_key {
        return failure("invalid api key");
    }
    db.events.write().await.push(RecordedEvent {
        id: Uuid::new_v4(),
        label: body.label,
        tags: body.tags,
        profiles: body.profiles,
    });
    Json(json!({ "success": true }))
}

/// Scores are event counts normalized per label: for each requested label,
/// each tag id scores `count / total` over the matching events. A label with
/// no matching events answers with an empty mapping.
async fn recom(
    State(db): State<Db>,
    Path(_version): Path<String>,
    Json(body): Json<RecomBody>,
) -> Json<Value> {
    if body.api_key != db.api_key {
        return failure("invalid api key");
    }
    let events = db.events.read().await;
    let mut response = Map::new();
    response.insert("success".to_string(), Value::Bool(true));
    for label in &body.labels {
        let mut counts: HashMap<String, u64> = HashMap::new();
        for event in events.iter().filter(|e| &e.label == label) {
            if let Some(profiles) = &body.profiles {
                let overlaps = event
                    .profiles
                    .iter()
                    .any(|(name, id)| profiles.get(name) == Some(id));
                if !overlaps {
                    continue;
                }
            }
            for tag in &event.tags {
                *counts.entry(tag.id.clone()).or_insert(0) += 1;
            }
        }
        let total: u64 = counts.values().sum();
        let scores: Map<String, Value> = counts
            .into_iter()
            .map(|(id, count)| (id, json!(count as f64 / total as f64)))
            .collect();
        response.insert(label.clone(), Value::Object(scores));
    }
    Json(Value::Object(response))
}

async fn verify(
    State(db): State<Db>,
    Path(_version): Path<String>,
    Json(body): Json<VerifyBody>,
) -> Json<Value> {
    if body.api_key != db.api_key {
        return failure("invalid api key");
    }
    Json(json!({ "success": true }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_body_roundtrips_through_json() {
        let tag = TagBody {
            id: "18".to_string(),
            name: "shirt".to_string(),
            desc: "blue shirt".to_string(),
        };
        let json = serde_json::to_string(&tag).unwrap();
        let back: TagBody = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, tag.id);
        assert_eq!(back.name, tag.name);
        assert_eq!(back.desc, tag.desc);
    }

    #[test]
    fn push_body_defaults_tags_to_empty() {
        let body: PushBody = serde_json::from_str(
            r#"{"api_key":"k","label":"click","profiles":{"user_id":"42"}}"#,
        )
        .unwrap();
        assert!(body.tags.is_empty());
        assert!(body.location.is_none());
        assert!(body.geo.is_none());
    }

    #[test]
    fn push_body_rejects_missing_label() {
        let result: Result<PushBody, _> =
            serde_json::from_str(r#"{"api_key":"k","profiles":{"user_id":"42"}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn recom_body_profiles_are_optional() {
        let body: RecomBody =
            serde_json::from_str(r#"{"api_key":"k","labels":["click"]}"#).unwrap();
        assert!(body.profiles.is_none());
        assert_eq!(body.labels, vec!["click"]);
    }
}
