// Leafeon - Library Entry Point

pub mod constants;
pub mod error;
pub mod config;
pub mod kv;
pub mod ids;
pub mod plants;
pub mod identify;
pub mod photos;

pub use config::LeafeonConfig;
pub use error::{LeafeonError, Result};
pub use plants::{LoadReport, LoadWarning, PlantMetadata, PlantRecord, PlantRecordStore};
