// Plant record model and the lenient decoder for persisted collections

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{PLACEHOLDER_DESCRIPTION, PLACEHOLDER_NAME};

/// A saved plant photo with its user-facing text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantRecord {
    pub id: String,
    pub uri: String,
    pub name: String,
    pub description: String,
    #[serde(flatten)]
    pub metadata: PlantMetadata,
}

/// Identification details carried over from Pl@ntNet. Empty for manual captures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    /// Confidence in [0, 1]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
}

impl PlantMetadata {
    pub fn is_empty(&self) -> bool {
        self.family.is_none() && self.probability.is_none()
    }
}

impl PlantRecord {
    /// Case-insensitive substring match on name or description.
    /// `needle` must already be lowercased.
    pub(crate) fn matches(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.name.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
    }
}

/// Use `value` unless it is blank.
pub(crate) fn or_placeholder(value: &str, placeholder: &str) -> String {
    if value.trim().is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    }
}

/// On-disk shape tolerated on read. Older app versions wrote records without
/// ids, with empty families and with probabilities like "85.12%".
#[derive(Debug, Deserialize)]
struct StoredPlant {
    #[serde(default)]
    id: Option<Value>,
    uri: String,
    #[serde(default)]
    name: Option<Value>,
    #[serde(default)]
    description: Option<Value>,
    #[serde(default)]
    family: Option<Value>,
    #[serde(default)]
    probability: Option<Value>,
}

/// A persisted record before id backfill.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DecodedPlant {
    pub id: Option<String>,
    pub uri: String,
    pub name: String,
    pub description: String,
    pub metadata: PlantMetadata,
}

impl DecodedPlant {
    pub fn into_record(self, id: String) -> PlantRecord {
        PlantRecord {
            id,
            uri: self.uri,
            name: self.name,
            description: self.description,
            metadata: self.metadata,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct DecodedCollection {
    pub plants: Vec<DecodedPlant>,
    /// (array index, reason) for elements that could not be read
    pub skipped: Vec<(usize, String)>,
}

/// Decode a persisted blob. Fails only when the blob is not a JSON array
/// (or null/empty); individual bad elements are skipped.
pub(crate) fn decode_plants(json: &str) -> serde_json::Result<DecodedCollection> {
    if json.trim().is_empty() {
        return Ok(DecodedCollection::default());
    }

    let items = match serde_json::from_str::<Value>(json)? {
        Value::Null => return Ok(DecodedCollection::default()),
        Value::Array(items) => items,
        other => {
            return Err(serde::de::Error::custom(format!(
                "expected an array of plants, found {}",
                json_type_name(&other)
            )))
        }
    };

    let mut decoded = DecodedCollection::default();
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<StoredPlant>(item) {
            Ok(stored) => decoded.plants.push(decode_one(stored)),
            Err(e) => decoded.skipped.push((index, e.to_string())),
        }
    }
    Ok(decoded)
}

fn decode_one(stored: StoredPlant) -> DecodedPlant {
    let id = match stored.id {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    let family = match stored.family {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        _ => None,
    };

    DecodedPlant {
        id,
        uri: stored.uri,
        name: text_or_placeholder(stored.name.as_ref(), PLACEHOLDER_NAME),
        description: text_or_placeholder(stored.description.as_ref(), PLACEHOLDER_DESCRIPTION),
        metadata: PlantMetadata {
            family,
            probability: stored.probability.as_ref().and_then(parse_probability),
        },
    }
}

/// Non-string and blank values fall back to the placeholder.
fn text_or_placeholder(value: Option<&Value>, placeholder: &str) -> String {
    match value {
        Some(Value::String(s)) => or_placeholder(s, placeholder),
        _ => placeholder.to_string(),
    }
}

/// Accepts 0.8512 or the legacy display form "85.12%". Anything else is absent.
pub(crate) fn parse_probability(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            match s.strip_suffix('%') {
                Some(percent) => percent.trim().parse::<f64>().ok().map(|p| p / 100.0),
                None => s.parse::<f64>().ok(),
            }
        }
        _ => None,
    };

    parsed.filter(|p| p.is_finite() && (0.0..=1.0).contains(p))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
