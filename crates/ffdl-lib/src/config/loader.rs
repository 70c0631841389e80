use super::Config;
use crate::error::FfdlError;
use config::Config as ConfigBuilder;
use std::path::{Path, PathBuf};

/// Loads channel definitions from `config_path`.
///
/// A directory is treated as a collection of per-OS configs, and the file named
/// after the running OS (`linux`, `macos`, `windows`, ...) is loaded from it.
/// Any format the `config` crate recognises by extension works.
pub fn load_config(config_path: &Path) -> Result<Config, FfdlError> {
    let source_path = resolve_config_source(config_path);
    tracing::debug!("Reading channel config from {}", source_path.display());

    let config_builder = ConfigBuilder::builder()
        .add_source(config::File::from(source_path.as_path()))
        .build()?;

    config_builder.try_deserialize().map_err(Into::into)
}

fn resolve_config_source(config_path: &Path) -> PathBuf {
    if config_path.is_dir() {
        config_path.join(std::env::consts::OS)
    } else {
        config_path.to_path_buf()
    }
}
