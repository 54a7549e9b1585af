// Plant identification
// The store only consumes identification results as optional metadata.
// Any field missing from the provider's answer is simply absent.

pub mod plantnet;

pub use plantnet::PlantNetClient;

use std::path::Path;
use serde_json::Value;

use crate::constants::{IDENTIFIED_DESCRIPTION, PLACEHOLDER_NAME};
use crate::error::Result;
use crate::plants::{PlantMetadata, PlantRecord, PlantRecordStore};

/// Best-effort species guess for one photo.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Identification {
    pub common_name: Option<String>,
    pub scientific_name: Option<String>,
    pub family: Option<String>,
    /// Confidence in [0, 1]
    pub score: Option<f64>,
}

impl Identification {
    /// Name for a saved record: scientific name, then common name, then placeholder.
    pub fn display_name(&self) -> String {
        self.scientific_name
            .clone()
            .or_else(|| self.common_name.clone())
            .unwrap_or_else(|| PLACEHOLDER_NAME.to_string())
    }

    pub fn metadata(&self) -> PlantMetadata {
        PlantMetadata {
            family: self.family.clone(),
            probability: self.score,
        }
    }
}

pub trait PlantIdentifier {
    /// `Ok(None)` when the provider had no usable match.
    fn identify(&self, image: &Path) -> Result<Option<Identification>>;
}

/// Read the top result from a Pl@ntNet `/v2/identify` response.
pub fn parse_identification(response: &Value) -> Option<Identification> {
    let best = response.get("results")?.as_array()?.first()?;
    let species = best.get("species");

    let text = |value: Option<&Value>| {
        value
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let identification = Identification {
        common_name: text(
            species
                .and_then(|s| s.get("commonNames"))
                .and_then(Value::as_array)
                .and_then(|names| names.first()),
        ),
        scientific_name: text(species.and_then(|s| s.get("scientificName"))),
        family: text(
            species
                .and_then(|s| s.get("family"))
                .and_then(|f| f.get("scientificNameWithoutAuthor")),
        ),
        score: best
            .get("score")
            .and_then(Value::as_f64)
            .filter(|s| s.is_finite() && (0.0..=1.0).contains(s)),
    };

    if identification == Identification::default() {
        None
    } else {
        Some(identification)
    }
}

/// Save an identified photo to the gallery.
pub fn save_identified(
    store: &PlantRecordStore,
    uri: &str,
    identification: &Identification,
) -> Result<PlantRecord> {
    store.add(
        uri,
        &identification.display_name(),
        IDENTIFIED_DESCRIPTION,
        Some(identification.metadata()),
    )
}
