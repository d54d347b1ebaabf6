//! Uniform content records
//!
//! Every extractor's [`RawPost`] is normalized into an [`InternetContent`] with
//! a stable id, so the store never has to know which site a record came from
//! beyond its [`SourceId`].

use crate::extract::{RawPost, SourceId};
use blake3::Hasher;
use chrono::{DateTime, SubsecRound, Utc};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A single source-specific attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(v) => write!(f, "{}", v),
            FieldValue::Integer(v) => write!(f, "{}", v),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Timestamp(v) => write!(f, "{}", v.to_rfc3339()),
        }
    }
}

/// Ordered key/value attributes; serializes as a JSON object in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtraFields(Vec<(String, FieldValue)>);

impl ExtraFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, replacing an existing value in place
    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) {
        let key = key.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> Vec<&str> {
        self.0.iter().map(|(k, _)| k.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for ExtraFields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ExtraFields {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FieldsVisitor;

        impl<'de> Visitor<'de> for FieldsVisitor {
            type Value = ExtraFields;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of tagged field values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut fields = ExtraFields::new();
                while let Some((key, value)) = access.next_entry::<String, FieldValue>()? {
                    fields.insert(key, value);
                }
                Ok(fields)
            }
        }

        deserializer.deserialize_map(FieldsVisitor)
    }
}

/// A normalized post, ready to be stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InternetContent {
    /// Stable id derived from the link
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub title: String,
    pub url: String,
    pub source: SourceId,
    pub extra_fields: ExtraFields,
}

/// Compute the stable content id for a link
pub fn content_id(link: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(link.as_bytes());
    hasher.finalize().to_hex().to_string()
}

/// Wrap a raw post into a uniform record
///
/// Posts without a publication time are stamped with `observed_at`.
pub fn normalize(source: SourceId, raw: RawPost, observed_at: DateTime<Utc>) -> InternetContent {
    let mut extra_fields = ExtraFields::new();
    extra_fields.insert("upvotes", FieldValue::Integer(raw.upvotes.into()));
    extra_fields.insert("comments", FieldValue::Integer(raw.comments.into()));
    if let Some(published) = raw.published {
        extra_fields.insert("published", FieldValue::Timestamp(published));
    }

    InternetContent {
        id: content_id(&raw.link),
        timestamp: raw.published.unwrap_or(observed_at).trunc_subsecs(0),
        title: raw.title,
        url: raw.link,
        source,
        extra_fields,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn raw(link: &str, published: Option<DateTime<Utc>>) -> RawPost {
        RawPost {
            title: "A post".to_string(),
            link: link.to_string(),
            upvotes: 95,
            comments: 71,
            published,
        }
    }

    #[test]
    fn test_id_is_stable_per_link() {
        let now = Utc::now();
        let a = normalize(SourceId::HackerNewsNews, raw("https://example.com/a", None), now);
        let again = normalize(SourceId::HackerNewsNews, raw("https://example.com/a", None), now);
        let b = normalize(SourceId::HackerNewsNews, raw("https://example.com/b", None), now);

        assert_eq!(a.id, again.id);
        assert_ne!(a.id, b.id);
        assert_eq!(a.id.len(), 64);
    }

    #[test]
    fn test_extra_fields_order_and_values() {
        let published = Utc.with_ymd_and_hms(2022, 4, 27, 9, 28, 57).unwrap();
        let record = normalize(
            SourceId::HackerNewsNews,
            raw("https://example.com/a", Some(published)),
            Utc::now(),
        );

        assert_eq!(record.timestamp, published);
        assert_eq!(record.extra_fields.keys(), vec!["upvotes", "comments", "published"]);
        assert_eq!(record.extra_fields.get("upvotes").and_then(|v| v.as_integer()), Some(95));
        assert_eq!(record.extra_fields.get("comments").and_then(|v| v.as_integer()), Some(71));
    }

    #[test]
    fn test_observed_time_used_without_publication() {
        let observed = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
            + chrono::Duration::milliseconds(750);
        let record = normalize(
            SourceId::IndieHackersPopular,
            raw("https://example.com/a", None),
            observed,
        );

        assert_eq!(record.timestamp, Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap());
        assert_eq!(record.extra_fields.keys(), vec!["upvotes", "comments"]);
    }

    #[test]
    fn test_extra_fields_json_preserves_order_and_kind() {
        let mut fields = ExtraFields::new();
        fields.insert("zeta", FieldValue::Integer(1));
        fields.insert("alpha", FieldValue::Text("x".to_string()));
        fields.insert("ratio", FieldValue::Float(0.5));
        fields.insert(
            "seen",
            FieldValue::Timestamp(Utc.with_ymd_and_hms(2022, 4, 27, 9, 28, 57).unwrap()),
        );

        let json = serde_json::to_string(&fields).unwrap();
        assert!(json.starts_with(r#"{"zeta":{"type":"integer","value":1},"alpha""#));

        let decoded: ExtraFields = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, fields);
        assert_eq!(decoded.keys(), vec!["zeta", "alpha", "ratio", "seen"]);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut fields = ExtraFields::new();
        fields.insert("upvotes", FieldValue::Integer(1));
        fields.insert("comments", FieldValue::Integer(2));
        fields.insert("upvotes", FieldValue::Integer(3));

        assert_eq!(fields.len(), 2);
        assert_eq!(fields.keys(), vec!["upvotes", "comments"]);
        assert_eq!(fields.get("upvotes"), Some(&FieldValue::Integer(3)));
    }
}
