// Plant records: model, persisted store, search

pub mod model;
pub mod store;


pub use model::{PlantMetadata, PlantRecord};
pub use store::{LoadReport, LoadWarning, PlantRecordStore};
