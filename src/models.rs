//! Timeline item model.
//!
//! An [`Item`] is one timeline entry (post, notification, message)
//! abstracted from its presentation. The engine never interprets the
//! payload; it only orders, deduplicates and windows items by id.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

/// Identifier of a timeline item. Numeric-comparable, unique per feed.
pub type ItemId = String;

/// Helper to deserialize an id as either a string or an integer.
///
/// Backends are inconsistent about whether ids arrive as JSON strings or
/// numbers; both map to the canonical string form.
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct IdVisitor;

    impl<'de> Visitor<'de> for IdVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or integer")
        }

        fn visit_str<E>(self, value: &str) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_string<E>(self, value: String) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(value)
        }

        fn visit_i64<E>(self, value: i64) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_u64<E>(self, value: u64) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }
    }

    deserializer.deserialize_any(IdVisitor)
}

/// Variant of [`deserialize_id`] for optional ids.
fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "deserialize_id")] String);

    let opt = Option::<Wrapper>::deserialize(deserializer)?;
    Ok(opt.map(|w| w.0))
}

/// Derive the numeric sort key from an id.
///
/// Non-numeric ids derive 0 and sort last, matching the lenient integer
/// coercion feed backends rely on.
pub fn sort_key_of(id: &str) -> u64 {
    id.parse::<u64>().unwrap_or(0)
}

/// A single timeline entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    /// Unique identifier (can arrive as string or integer)
    #[serde(deserialize_with = "deserialize_id")]
    pub id: ItemId,
    /// Id of a referenced item, if this entry points at another
    /// (e.g. a repost pointing at its original)
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub reference_id: Option<ItemId>,
    /// Opaque domain data, not interpreted by the engine
    #[serde(default)]
    pub payload: Value,
}

impl Item {
    /// Create an item with no reference.
    pub fn new(id: impl Into<ItemId>, payload: Value) -> Self {
        Self {
            id: id.into(),
            reference_id: None,
            payload,
        }
    }

    /// Create an item that references another item.
    pub fn with_reference(
        id: impl Into<ItemId>,
        reference_id: impl Into<ItemId>,
        payload: Value,
    ) -> Self {
        Self {
            id: id.into(),
            reference_id: Some(reference_id.into()),
            payload,
        }
    }

    /// Numeric sort key derived from the id. Higher is newer.
    pub fn sort_key(&self) -> u64 {
        sort_key_of(&self.id)
    }

    /// Sort key used for older-direction paging boundaries.
    ///
    /// When the item references another (repost), paging continues past
    /// the referenced original rather than the wrapper id.
    pub fn boundary_key(&self) -> u64 {
        match &self.reference_id {
            Some(reference_id) => sort_key_of(reference_id),
            None => self.sort_key(),
        }
    }

    /// Timeline ordering: descending sort key (newest first), id as a
    /// deterministic tiebreaker.
    pub fn timeline_cmp(&self, other: &Item) -> Ordering {
        other
            .sort_key()
            .cmp(&self.sort_key())
            .then_with(|| other.id.cmp(&self.id))
    }
}

/// Sort a batch into timeline order (newest first).
pub fn sort_timeline(items: &mut [Item]) {
    items.sort_by(|a, b| a.timeline_cmp(b));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sort_key_from_numeric_id() {
        let item = Item::new("1234", Value::Null);
        assert_eq!(item.sort_key(), 1234);
    }

    #[test]
    fn test_sort_key_from_non_numeric_id_is_zero() {
        let item = Item::new("not-a-number", Value::Null);
        assert_eq!(item.sort_key(), 0);
    }

    #[test]
    fn test_boundary_key_prefers_reference() {
        let item = Item::with_reference("100", "42", Value::Null);
        assert_eq!(item.sort_key(), 100);
        assert_eq!(item.boundary_key(), 42);
    }

    #[test]
    fn test_boundary_key_without_reference() {
        let item = Item::new("100", Value::Null);
        assert_eq!(item.boundary_key(), 100);
    }

    #[test]
    fn test_sort_timeline_newest_first() {
        let mut items = vec![
            Item::new("3", Value::Null),
            Item::new("10", Value::Null),
            Item::new("7", Value::Null),
        ];
        sort_timeline(&mut items);
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["10", "7", "3"]);
    }

    #[test]
    fn test_sort_timeline_tie_broken_by_id() {
        // Both derive sort key 0; ordering must still be deterministic.
        let mut items = vec![
            Item::new("abc", Value::Null),
            Item::new("xyz", Value::Null),
        ];
        sort_timeline(&mut items);
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["xyz", "abc"]);
    }

    #[test]
    fn test_deserialize_integer_id() {
        let item: Item = serde_json::from_value(json!({
            "id": 12345,
            "reference_id": 678,
            "payload": {"text": "hello"}
        }))
        .unwrap();
        assert_eq!(item.id, "12345");
        assert_eq!(item.reference_id.as_deref(), Some("678"));
        assert_eq!(item.payload["text"], "hello");
    }

    #[test]
    fn test_deserialize_string_id_without_reference() {
        let item: Item = serde_json::from_value(json!({"id": "99"})).unwrap();
        assert_eq!(item.id, "99");
        assert_eq!(item.reference_id, None);
        assert_eq!(item.payload, Value::Null);
    }

    #[test]
    fn test_serde_round_trip() {
        let item = Item::with_reference("55", "44", json!({"kind": "repost"}));
        let encoded = serde_json::to_string(&item).unwrap();
        let decoded: Item = serde_json::from_str(&encoded).unwrap();
        assert_eq!(item, decoded);
    }
}
