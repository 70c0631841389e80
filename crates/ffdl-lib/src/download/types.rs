use std::time::Duration;

/// A release channel and where its latest build lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Channel {
    pub name: String,
    pub download_url: String,
    pub output_filename: String, // Relative to the output directory
}

/// Outcome of processing one channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadResult {
    pub channel: String,
    /// The ETag matched the cache and the body was not written
    pub skipped: bool,
    pub bytes_written: Option<u64>,
}

impl DownloadResult {
    pub fn skipped(channel: &str) -> Self {
        Self {
            channel: channel.to_string(),
            skipped: true,
            bytes_written: None,
        }
    }

    pub fn downloaded(channel: &str, bytes_written: u64) -> Self {
        Self {
            channel: channel.to_string(),
            skipped: false,
            bytes_written: Some(bytes_written),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct DownloadOptions {
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(600),
            connect_timeout: Duration::from_secs(30),
        }
    }
}
