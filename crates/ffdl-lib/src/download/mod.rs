#[allow(clippy::module_inception)]
mod download;
mod types;

pub use download::ChannelDownloader;
pub use types::{Channel, DownloadOptions, DownloadResult};
