use tci_core::logging;

mod cli;

use crate::cli::CliCommand;

fn main() {
    // Log to the state dir; a read-only home still gets stderr logging.
    if let Err(e) = logging::init_logging() {
        logging::init_logging_stderr();
        tracing::warn!("file logging unavailable, using stderr: {:#}", e);
    }

    if let Err(err) = CliCommand::run_from_args() {
        tracing::error!("{:#}", err);
        eprintln!("tci error: {:#}", err);
        std::process::exit(1);
    }
}
