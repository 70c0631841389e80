use crate::download::Channel;
use crate::error::FfdlError;
use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Download location of a single release channel.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ChannelDef {
    #[serde(rename = "DOWNLOAD_URL", alias = "download_url")]
    pub download_url: String,
    #[serde(rename = "DOWNLOAD_FILENAME", alias = "download_filename")]
    pub download_filename: String,
}

/// Channel definitions keyed by channel name, in the order the config source lists them.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Config {
    pub channels: IndexMap<String, ChannelDef>,
}

impl Config {
    /// Resolves every configured channel, keeping config order.
    pub fn channels(&self) -> Vec<Channel> {
        self.channels
            .iter()
            .map(|(name, def)| Channel {
                name: name.clone(),
                download_url: def.download_url.clone(),
                output_filename: def.download_filename.clone(),
            })
            .collect()
    }

    /// Checks that every channel can be downloaded into the output directory
    /// without clobbering the ETag cache or another channel's file.
    pub fn validate(&self, cache_file_name: &str) -> Result<(), FfdlError> {
        if self.channels.is_empty() {
            return Err(FfdlError::ConfigValidation {
                details: "No channels defined in config".to_string(),
            });
        }

        for (name, def) in &self.channels {
            let url = url::Url::parse(&def.download_url).map_err(|e| FfdlError::ConfigValidation {
                details: format!(
                    "Channel [{}] has an invalid DOWNLOAD_URL {:?}: {}",
                    name, def.download_url, e
                ),
            })?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(FfdlError::ConfigValidation {
                    details: format!(
                        "Channel [{}] DOWNLOAD_URL must use http or https, got {}",
                        name,
                        url.scheme()
                    ),
                });
            }

            if !is_plain_file_name(&def.download_filename) {
                return Err(FfdlError::ConfigValidation {
                    details: format!(
                        "Channel [{}] DOWNLOAD_FILENAME must be a plain file name, got {:?}",
                        name, def.download_filename
                    ),
                });
            }
            if def.download_filename == cache_file_name {
                return Err(FfdlError::ConfigValidation {
                    details: format!(
                        "Channel [{}] DOWNLOAD_FILENAME collides with the cache file {}",
                        name, cache_file_name
                    ),
                });
            }
        }

        let duplicates = self
            .channels
            .values()
            .map(|def| def.download_filename.as_str())
            .duplicates()
            .collect_vec();
        if !duplicates.is_empty() {
            return Err(FfdlError::ConfigValidation {
                details: format!(
                    "Several channels share the same DOWNLOAD_FILENAME: {}",
                    duplicates.iter().join(", ")
                ),
            });
        }

        Ok(())
    }
}

/// True if `name` is a single normal path component, e.g. `firefox-nightly.tar.bz2`.
pub(crate) fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && Path::new(name).file_name().and_then(|n| n.to_str()) == Some(name)
}
