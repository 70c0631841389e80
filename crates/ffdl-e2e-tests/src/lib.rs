mod http_server;
mod test_utils;

pub use http_server::TestServer;
pub use test_utils::*;
