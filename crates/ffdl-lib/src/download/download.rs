use super::types::{Channel, DownloadOptions, DownloadResult};
use crate::cache::FingerprintStore;
use crate::error::FfdlError;
use eyre::WrapErr;
use reqwest::header::ETAG;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::info;

/// Downloads each channel's latest build, skipping bodies whose ETag is
/// already in the cache.
///
/// Channels are processed one at a time and the cache is flushed after every
/// channel, so a fatal error never loses the fingerprints of channels that
/// already finished.
pub struct ChannelDownloader {
    client: reqwest::Client,
    store: FingerprintStore,
    output_dir: PathBuf,
}

fn build_http_client(options: &DownloadOptions) -> Result<reqwest::Client, FfdlError> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("ffdl/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(options.connect_timeout)
        .timeout(options.timeout)
        .build()
        .wrap_err("Failed to build HTTP client")?;
    Ok(client)
}

impl ChannelDownloader {
    pub fn new(
        store: FingerprintStore,
        output_dir: impl Into<PathBuf>,
        options: &DownloadOptions,
    ) -> Result<Self, FfdlError> {
        Ok(Self {
            client: build_http_client(options)?,
            store,
            output_dir: output_dir.into(),
        })
    }

    pub fn store(&self) -> &FingerprintStore {
        &self.store
    }

    /// Processes `channels` in order, stopping at the first error.
    pub async fn download_all(
        &mut self,
        channels: &[Channel],
    ) -> Result<Vec<DownloadResult>, FfdlError> {
        info!("DOWNLOADING FIREFOXES");

        let mut results = Vec::with_capacity(channels.len());
        for channel in channels {
            results.push(self.download_channel(channel).await?);
        }

        let skipped = results.iter().filter(|r| r.skipped).count();
        info!(
            downloaded = results.len() - skipped,
            skipped, "Processed {} channels",
            results.len()
        );
        Ok(results)
    }

    pub async fn download_channel(&mut self, channel: &Channel) -> Result<DownloadResult, FfdlError> {
        let output_path = self.output_dir.join(&channel.output_filename);
        self.download_file_from_url(&channel.download_url, &output_path, &channel.name)
            .await
    }

    /// Fetches `download_url` and writes its body to `output_path` unless the
    /// response ETag matches the one cached for `channel`.
    ///
    /// `output_path` is truncated before the request is sent, so after a cache
    /// hit (or a failed request) it is left empty.
    pub async fn download_file_from_url(
        &mut self,
        download_url: &str,
        output_path: &Path,
        channel: &str,
    ) -> Result<DownloadResult, FfdlError> {
        let file = tokio::fs::File::create(output_path)
            .await
            .map_err(|source| FfdlError::OutputFile {
                path: output_path.to_path_buf(),
                source,
            })?;

        let network_error = |source: reqwest::Error| FfdlError::Network {
            channel: channel.to_string(),
            url: download_url.to_string(),
            source,
        };

        tracing::debug!(channel, url = download_url, "Requesting");
        let response = self
            .client
            .get(download_url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(network_error)?;

        // A missing ETag is recorded as an empty fingerprint.
        let etag = response
            .headers()
            .get(ETAG)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
            .unwrap_or_default();

        let previous = match self.store.get_fingerprint(channel) {
            Ok(fingerprint) => Some(fingerprint),
            Err(FfdlError::FingerprintNotFound { .. }) => None,
            Err(err) => return Err(err),
        };
        let was_cached = previous == Some(etag.as_str());

        self.store.set(channel, etag.as_str(), was_cached);

        let result = if was_cached {
            info!(channel, etag = %etag, "[{}] etag was cached, skipping download.", channel);
            drop(file);
            DownloadResult::skipped(channel)
        } else {
            info!(channel, etag = %etag, "Downloading [{}] from {}", channel, download_url);
            let bytes_written = write_body(response, file, output_path)
                .await
                .map_err(|err| match err {
                    BodyError::Network(source) => network_error(source),
                    BodyError::Write(source) => FfdlError::OutputFile {
                        path: output_path.to_path_buf(),
                        source,
                    },
                })?;
            tracing::debug!(channel, bytes_written, output = %output_path.display(), "Downloaded");
            DownloadResult::downloaded(channel, bytes_written)
        };

        self.store.flush()?;
        Ok(result)
    }
}

enum BodyError {
    Network(reqwest::Error),
    Write(std::io::Error),
}

async fn write_body(
    mut response: reqwest::Response,
    file: tokio::fs::File,
    output_path: &Path,
) -> Result<u64, BodyError> {
    let mut writer = BufWriter::new(file);
    let mut bytes_written = 0u64;

    while let Some(chunk) = response.chunk().await.map_err(BodyError::Network)? {
        writer.write_all(&chunk).await.map_err(BodyError::Write)?;
        bytes_written += chunk.len() as u64;
        tracing::trace!(output = %output_path.display(), bytes_written, "Wrote chunk");
    }

    writer.flush().await.map_err(BodyError::Write)?;
    Ok(bytes_written)
}
