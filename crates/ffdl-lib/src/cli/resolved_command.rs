use crate::cli::args::Command;
use crate::cli::params::DownloadParams;
use crate::config::{is_plain_file_name, load_config};
use crate::download::{Channel, DownloadOptions};
use crate::error::FfdlError;
use itertools::Itertools;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub fn resolve_command(command: Command) -> Result<DownloadParams, FfdlError> {
    let Command {
        config_path,
        output_dir,
        clean,
        channels: channel_filter,
        timeout_secs,
        cache_file,
    } = command;

    if timeout_secs == 0 {
        return Err(FfdlError::CliArgumentValidation {
            details: "timeout must be greater than 0.".to_string(),
        });
    }
    if !is_plain_file_name(&cache_file) {
        return Err(FfdlError::CliArgumentValidation {
            details: format!("cache-file must be a plain file name, got {:?}.", cache_file),
        });
    }

    tracing::info!("Loading configuration from {}", config_path);
    let app_config = load_config(Path::new(&config_path))?;
    app_config.validate(&cache_file)?;

    let channels = select_channels(app_config.channels(), &channel_filter)?;

    let output_dir = PathBuf::from(output_dir);
    Ok(DownloadParams {
        channels,
        cache_path: output_dir.join(&cache_file),
        output_dir,
        clean,
        options: DownloadOptions {
            timeout: Duration::from_secs(timeout_secs),
            ..DownloadOptions::default()
        },
    })
}

/// Keeps the channels named in `filter`, in config order. An empty filter keeps all.
fn select_channels(channels: Vec<Channel>, filter: &[String]) -> Result<Vec<Channel>, FfdlError> {
    if filter.is_empty() {
        return Ok(channels);
    }

    let unknown = filter
        .iter()
        .filter(|name| !channels.iter().any(|c| &c.name == *name))
        .unique()
        .collect_vec();
    if !unknown.is_empty() {
        return Err(FfdlError::CliArgumentValidation {
            details: format!(
                "Unknown channels: {}. Configured channels: {}.",
                unknown.iter().join(", "),
                channels.iter().map(|c| &c.name).join(", ")
            ),
        });
    }

    Ok(channels
        .into_iter()
        .filter(|c| filter.contains(&c.name))
        .collect())
}
