pub mod archive;
pub mod host;
pub mod http_server;
