pub mod cache;
pub mod cli;
pub mod config;
pub mod download;
pub mod error;

pub use cache::FingerprintStore;
pub use config::Config;
pub use download::ChannelDownloader;
pub use error::FfdlError;
