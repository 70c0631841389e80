use ffdl_lib::cache::FingerprintCache;
use ffdl_lib::cli::{Command, DownloadParams, resolve_command};
use eyre::Result;
use std::path::{Path, PathBuf};

/// A channel entry for a generated config: `(name, url, filename)`.
pub type ChannelSpec<'a> = (&'a str, &'a str, &'a str);

/// Writes an INI channel config into `dir` and returns its path.
pub fn write_channel_config(dir: &Path, channels: &[ChannelSpec]) -> Result<PathBuf> {
    let mut content = String::new();
    for (name, url, filename) in channels {
        content.push_str(&format!(
            "[{}]\nDOWNLOAD_URL = {}\nDOWNLOAD_FILENAME = {}\n\n",
            name, url, filename
        ));
    }

    let config_path = dir.join("channels.ini");
    std::fs::write(&config_path, content)?;
    Ok(config_path)
}

/// Resolves download parameters the same way the CLI does.
pub fn download_params(config_path: &Path, output_dir: &Path, clean: bool) -> DownloadParams {
    let command = Command {
        config_path: config_path.to_string_lossy().into_owned(),
        output_dir: output_dir.to_string_lossy().into_owned(),
        clean,
        channels: vec![],
        timeout_secs: 10,
        cache_file: "cache.json".to_string(),
    };
    resolve_command(command).expect("Failed to resolve download command")
}

pub fn read_cache(output_dir: &Path) -> Result<FingerprintCache> {
    let content = std::fs::read_to_string(output_dir.join("cache.json"))?;
    Ok(serde_json::from_str(&content)?)
}

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter("ffdl_lib=debug,ffdl_e2e_tests=debug")
        .with_test_writer()
        .try_init()
        .ok();
}
