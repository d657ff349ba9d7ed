use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Known section content shapes, keyed by the array field each one owns.
///
/// Section content is an ad-hoc JSON document edited by non-technical
/// operators; the kind tells the cleanup sweep which embedded array may
/// carry references to a deletable entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Reviews,
    Cards,
    Videos,
}

impl ContentKind {
    pub fn field(self) -> &'static str {
        match self {
            ContentKind::Reviews => "reviews",
            ContentKind::Cards => "cards",
            ContentKind::Videos => "videos",
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.field())
    }
}

/// The entity whose embedded copies must be scrubbed out of section content.
#[derive(Debug, Clone)]
pub struct DeletedEntity {
    pub id: String,
    pub image_url: Option<String>,
    pub name: Option<String>,
}

impl DeletedEntity {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), image_url: None, name: None }
    }

    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// One embedded reference object inside a content array.
///
/// Every field is optional and loosely typed: stored ids drift between
/// numbers and strings, and operators copy-paste entries between sections,
/// so nothing about the shape can be trusted beyond "it is an object".
/// Unknown fields are preserved through `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContentEntry {
    /// Parse a raw array element; non-objects yield `None`.
    pub fn parse(value: &Value) -> Option<Self> {
        value.as_object()?;
        serde_json::from_value(value.clone()).ok()
    }

    /// Identity field for matching: `id` first, then `tempId`, whichever is
    /// non-null first.
    pub fn identity(&self) -> Option<&Value> {
        self.id
            .as_ref()
            .filter(|v| !v.is_null())
            .or_else(|| self.temp_id.as_ref().filter(|v| !v.is_null()))
    }

    /// Image URL for asset matching: `image` first, then `imageUrl`.
    pub fn image_str(&self) -> Option<&str> {
        self.image
            .as_ref()
            .and_then(Value::as_str)
            .or_else(|| self.image_url.as_ref().and_then(Value::as_str))
    }

    /// Human name for fallback matching: `name` first, then `clientName`.
    pub fn name_str(&self) -> Option<&str> {
        self.name
            .as_ref()
            .and_then(Value::as_str)
            .or_else(|| self.client_name.as_ref().and_then(Value::as_str))
    }
}

/// A content document classified against an expected kind.
///
/// Documents that do not carry the kind's array (or carry a non-array under
/// that field) are opaque: legacy or foreign shapes the cleanup sweep must
/// skip rather than guess at.
#[derive(Debug, Clone)]
pub enum SectionContent {
    Typed { kind: ContentKind, entries: Vec<Value>, rest: Map<String, Value> },
    Opaque(Value),
}

impl SectionContent {
    pub fn classify(value: Value, kind: ContentKind) -> Self {
        let Value::Object(mut map) = value else {
            return SectionContent::Opaque(value);
        };

        match map.remove(kind.field()) {
            Some(Value::Array(entries)) => SectionContent::Typed { kind, entries, rest: map },
            Some(other) => {
                // Field exists but is not an array: put it back, stay opaque
                map.insert(kind.field().to_string(), other);
                SectionContent::Opaque(Value::Object(map))
            }
            None => SectionContent::Opaque(Value::Object(map)),
        }
    }

    /// Reassemble the document, preserving every sibling field untouched.
    pub fn into_value(self) -> Value {
        match self {
            SectionContent::Typed { kind, entries, mut rest } => {
                rest.insert(kind.field().to_string(), Value::Array(entries));
                Value::Object(rest)
            }
            SectionContent::Opaque(value) => value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classify_finds_the_kind_array() {
        let doc = json!({"title": "Home", "reviews": [{"id": 1}]});
        match SectionContent::classify(doc, ContentKind::Reviews) {
            SectionContent::Typed { entries, rest, .. } => {
                assert_eq!(entries.len(), 1);
                assert_eq!(rest["title"], "Home");
            }
            SectionContent::Opaque(_) => panic!("expected typed content"),
        }
    }

    #[test]
    fn classify_treats_missing_or_non_array_field_as_opaque() {
        let missing = json!({"cards": []});
        assert!(matches!(
            SectionContent::classify(missing.clone(), ContentKind::Reviews),
            SectionContent::Opaque(v) if v == missing
        ));

        let non_array = json!({"reviews": "oops"});
        assert!(matches!(
            SectionContent::classify(non_array.clone(), ContentKind::Reviews),
            SectionContent::Opaque(v) if v == non_array
        ));
    }

    #[test]
    fn into_value_preserves_sibling_fields() {
        let doc = json!({"heading": "What clients say", "reviews": [{"id": 7}], "order": 3});
        let content = SectionContent::classify(doc.clone(), ContentKind::Reviews);
        assert_eq!(content.into_value(), doc);
    }

    #[test]
    fn entry_identity_prefers_id_over_temp_id() {
        let entry = ContentEntry::parse(&json!({"id": 5, "tempId": "x"})).unwrap();
        assert_eq!(entry.identity(), Some(&json!(5)));

        let entry = ContentEntry::parse(&json!({"id": null, "tempId": "x"})).unwrap();
        assert_eq!(entry.identity(), Some(&json!("x")));
    }

    #[test]
    fn entry_accessors_skip_non_string_values() {
        let entry = ContentEntry::parse(&json!({"image": 42, "imageUrl": "https://a/b.png"})).unwrap();
        assert_eq!(entry.image_str(), Some("https://a/b.png"));
    }
}
