//! CLI command handlers, one file per command.

mod checksum;
mod docs;
mod fetch_checksum;
mod install;
mod jvm_options;
mod resolve;
mod verify;

pub use checksum::run_checksum;
pub use docs::{run_completions, run_man};
pub use fetch_checksum::run_fetch_checksum;
pub use install::run_install;
pub use jvm_options::{run_jvm_options, JvmOptionsArgs};
pub use resolve::run_resolve;
pub use verify::run_verify;
