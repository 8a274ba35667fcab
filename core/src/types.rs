//! Value objects for the RecomPI wire format.
//!
//! # Design
//! Each object validates its required fields at construction, so no value in
//! an invalid state can reach the request builder. Serialization is a pure
//! `to_json` producing the exact mapping the service expects; absent optional
//! fields are omitted from the mapping rather than sent as empty strings.
//! Profile attributes are a two-variant tagged union (`Plain` / `Hashed`)
//! instead of a subtype pair, so the builder's uniform-kind rule reduces to
//! comparing variant tags.

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};

use crate::error::RecomError;
use crate::hash;

/// A tag attached to a push event, naming the interacted item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    id: String,
    name: String,
    desc: String,
}

impl Tag {
    /// Create a tag whose description defaults to its name.
    pub fn new(id: &str, name: &str) -> Result<Self, RecomError> {
        Self::with_desc(id, name, name)
    }

    pub fn with_desc(id: &str, name: &str, desc: &str) -> Result<Self, RecomError> {
        if id.is_empty() {
            return Err(RecomError::invalid_field(
                "Tag::new",
                "id",
                "must be a non-empty string",
            ));
        }
        if name.is_empty() {
            return Err(RecomError::invalid_field(
                "Tag::new",
                "name",
                "must be a non-empty string",
            ));
        }
        Ok(Self {
            id: id.to_string(),
            name: name.to_string(),
            desc: desc.to_string(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn desc(&self) -> &str {
        &self.desc
    }

    /// Serialize to the 3-key mapping the service expects.
    pub fn to_json(&self) -> Value {
        json!({ "id": self.id, "name": self.name, "desc": self.desc })
    }
}

/// Variant tag of a [`ProfileAttribute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileKind {
    Plain,
    Hashed,
}

/// A named attribute identifying the subject of an event, e.g.
/// `("user_id", "42")`.
///
/// `Plain` sends the identifier in the clear. `Hashed` replaces it with a
/// salted one-way digest at serialization time; the raw identifier never
/// appears in output for that variant, even when no salt is configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileAttribute {
    Plain { name: String, id: String },
    Hashed { name: String, id: String },
}

impl ProfileAttribute {
    pub fn plain(name: &str, id: &str) -> Result<Self, RecomError> {
        validate_profile_fields(name, id)?;
        Ok(ProfileAttribute::Plain {
            name: name.to_string(),
            id: id.to_string(),
        })
    }

    pub fn hashed(name: &str, id: &str) -> Result<Self, RecomError> {
        validate_profile_fields(name, id)?;
        Ok(ProfileAttribute::Hashed {
            name: name.to_string(),
            id: id.to_string(),
        })
    }

    pub fn kind(&self) -> ProfileKind {
        match self {
            ProfileAttribute::Plain { .. } => ProfileKind::Plain,
            ProfileAttribute::Hashed { .. } => ProfileKind::Hashed,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ProfileAttribute::Plain { name, .. } | ProfileAttribute::Hashed { name, .. } => name,
        }
    }

    /// Serialize to the single-key `{name: value}` mapping.
    ///
    /// For `Hashed`, the value is the salted digest of the identifier; a
    /// missing salt hashes with the empty salt. The same `(id, salt)` pair
    /// always yields the same digest, so hashed lookups stay consistent
    /// across push and recom calls.
    pub fn to_json(&self, hash_salt: Option<&str>) -> Value {
        let mut map = Map::new();
        match self {
            ProfileAttribute::Plain { name, id } => {
                map.insert(name.clone(), Value::String(id.clone()));
            }
            ProfileAttribute::Hashed { name, id } => {
                let digest = hash::hex_digest(id, hash_salt.unwrap_or(""));
                map.insert(name.clone(), Value::String(digest));
            }
        }
        Value::Object(map)
    }
}

fn validate_profile_fields(name: &str, id: &str) -> Result<(), RecomError> {
    if name.is_empty() {
        return Err(RecomError::invalid_field(
            "ProfileAttribute::new",
            "name",
            "must be a non-empty string",
        ));
    }
    if id.is_empty() {
        return Err(RecomError::invalid_field(
            "ProfileAttribute::new",
            "id",
            "must be a non-empty string",
        ));
    }
    Ok(())
}

/// Context of a tracked interaction: the page URL plus optional request
/// metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    url: String,
    ip: Option<String>,
    referer: Option<String>,
    useragent: Option<String>,
}

impl Location {
    pub fn new(url: &str) -> Result<Self, RecomError> {
        if url.is_empty() {
            return Err(RecomError::invalid_field(
                "Location::new",
                "url",
                "must be a non-empty string",
            ));
        }
        Ok(Self {
            url: url.to_string(),
            ip: None,
            referer: None,
            useragent: None,
        })
    }

    pub fn ip(mut self, ip: &str) -> Self {
        self.ip = Some(ip.to_string());
        self
    }

    pub fn referer(mut self, referer: &str) -> Self {
        self.referer = Some(referer.to_string());
        self
    }

    pub fn useragent(mut self, useragent: &str) -> Self {
        self.useragent = Some(useragent.to_string());
        self
    }

    /// Serialize to a mapping; absent optional fields are omitted entirely.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("url".to_string(), Value::String(self.url.clone()));
        if let Some(ip) = &self.ip {
            map.insert("ip".to_string(), Value::String(ip.clone()));
        }
        if let Some(referer) = &self.referer {
            map.insert("referer".to_string(), Value::String(referer.clone()));
        }
        if let Some(useragent) = &self.useragent {
            map.insert("useragent".to_string(), Value::String(useragent.clone()));
        }
        Value::Object(map)
    }
}

/// Geographic scope of an event or query. Country may be a two-letter code
/// or a service-defined country identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Geo {
    country: Option<String>,
    province: Option<String>,
}

impl Geo {
    /// At least one of the two fields must be supplied.
    pub fn new(country: Option<&str>, province: Option<&str>) -> Result<Self, RecomError> {
        if country.is_none() && province.is_none() {
            return Err(RecomError::invalid_field(
                "Geo::new",
                "country",
                "at least one of the geo fields must be provided",
            ));
        }
        Ok(Self {
            country: country.map(str::to_string),
            province: province.map(str::to_string),
        })
    }

    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        if let Some(country) = &self.country {
            map.insert("country".to_string(), Value::String(country.clone()));
        }
        if let Some(province) = &self.province {
            map.insert("province".to_string(), Value::String(province.clone()));
        }
        Value::Object(map)
    }
}

/// Parsed recommendation scores: label → item id → relevance score in [0, 1].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recommendations {
    pub scores: BTreeMap<String, BTreeMap<String, f64>>,
}

impl Recommendations {
    /// Scores for one label, if the response carried that label.
    pub fn scores_for(&self, label: &str) -> Option<&BTreeMap<String, f64>> {
        self.scores.get(label)
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}
