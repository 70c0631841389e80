use crate::cache::{FingerprintStore, StoreOrigin};
use crate::cli::DownloadParams;
use crate::download::{ChannelDownloader, DownloadResult};
use crate::error::FfdlError;
use tracing;

pub async fn run_download(params: DownloadParams) -> Result<Vec<DownloadResult>, FfdlError> {
    let DownloadParams {
        channels,
        output_dir,
        cache_path,
        clean,
        options,
    } = params;

    tracing::info!("Opening ETag cache at {}", cache_path.display());
    let store = FingerprintStore::open(&cache_path, clean)?;
    if store.origin() == StoreOrigin::Created {
        tracing::info!("Starting with an empty ETag cache, every channel will be downloaded");
    }

    let mut downloader = ChannelDownloader::new(store, &output_dir, &options)?;
    let results = downloader.download_all(&channels).await?;

    tracing::info!(
        "Download completed successfully into {}, {} channels in the ETag cache",
        output_dir.display(),
        downloader.store().cache().len()
    );
    Ok(results)
}
