use crate::download::{Channel, DownloadOptions};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct DownloadParams {
    pub channels: Vec<Channel>,
    pub output_dir: PathBuf,
    pub cache_path: PathBuf,
    pub clean: bool,
    pub options: DownloadOptions,
}
