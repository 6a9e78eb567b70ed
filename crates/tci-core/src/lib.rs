//! Versioned Apache Tomcat installer: resolve, fetch, verify and install one
//! Tomcat release per instance.

pub mod checksum;
pub mod config;
pub mod error;
pub mod fetch;
pub mod install;
pub mod jvm_registry;
pub mod locations;
pub mod logging;
pub mod pipeline;
pub mod request;
pub mod retry;
pub mod storage;
pub mod url_model;
pub mod verify;
pub mod version;

pub use error::{InstallError, Step};
pub use pipeline::{InstallSummary, Pipeline};
pub use request::InstallRequest;
