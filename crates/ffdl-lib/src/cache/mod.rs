mod model;
mod store;

pub use model::{FingerprintCache, FingerprintRecord};
pub use store::{FingerprintStore, StoreOrigin};

pub const DEFAULT_CACHE_FILE_NAME: &str = "cache.json";
