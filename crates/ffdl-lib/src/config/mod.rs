mod loader;
mod model;

pub use loader::load_config;
pub use model::{ChannelDef, Config};
pub(crate) use model::is_plain_file_name;
