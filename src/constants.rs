// Leafeon Constants

// Persistence
pub const PLANTS_KEY: &str = "plants";
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

// Paths
pub const APP_DATA_DIR: &str = ".leafeon";
pub const DB_FILENAME: &str = "leafeon.db";
pub const PHOTOS_FOLDER: &str = "photos";
pub const PHOTO_PREFIX: &str = "plant_";
pub const DEFAULT_PHOTO_EXTENSION: &str = "jpg";

// Env overrides
pub const ENV_DATA_DIR: &str = "LEAFEON_DATA_DIR";
pub const ENV_PLANTNET_API_KEY: &str = "LEAFEON_PLANTNET_API_KEY";
pub const ENV_PLANTNET_LANG: &str = "LEAFEON_PLANTNET_LANG";
pub const ENV_DB_BUSY_TIMEOUT_MS: &str = "LEAFEON_DB_BUSY_TIMEOUT_MS";

// Record placeholders
pub const PLACEHOLDER_NAME: &str = "Unnamed plant";
pub const PLACEHOLDER_DESCRIPTION: &str = "No description";
pub const IDENTIFIED_DESCRIPTION: &str = "Identified via Pl@ntNet";

// Id generation
pub const ID_RANDOM_SUFFIX_LEN: usize = 9;
pub const ID_MAX_ATTEMPTS: usize = 8;

// Pl@ntNet
pub const PLANTNET_API_URL: &str = "https://my-api.plantnet.org/v2/identify/all";
pub const PLANTNET_DEFAULT_LANG: &str = "en";
pub const PLANTNET_DEFAULT_ORGAN: &str = "flower";
pub const PLANTNET_TIMEOUT_SECS: u64 = 30;
pub const PLANTNET_IMAGE_MIME: &str = "image/jpeg";
