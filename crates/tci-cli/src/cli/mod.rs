//! CLI for TCI, the versioned Apache Tomcat installer.

mod commands;

use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use tci_core::config::{self, TciConfig};

use commands::{
    run_checksum, run_completions, run_fetch_checksum, run_install, run_jvm_options, run_man,
    run_resolve, run_verify, JvmOptionsArgs,
};

/// Top-level CLI for TCI.
#[derive(Debug, Parser)]
#[command(name = "tci", version)]
#[command(about = "TCI: install checksum-verified Apache Tomcat releases side by side", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

/// Mirror overrides; unset values come from config.toml.
#[derive(Debug, Clone, Default, Args)]
pub struct MirrorArgs {
    /// Base URI the tarball path is appended to.
    #[arg(long, value_name = "URI")]
    pub tarball_base: Option<String>,
    /// Base URI the `.sha1` manifest path is appended to.
    #[arg(long, value_name = "URI")]
    pub checksum_base: Option<String>,
}

impl MirrorArgs {
    /// (tarball base, checksum base) with config fallbacks.
    pub fn bases(&self, cfg: &TciConfig) -> (String, String) {
        (
            self.tarball_base
                .clone()
                .unwrap_or_else(|| cfg.tarball_base.clone()),
            self.checksum_base
                .clone()
                .unwrap_or_else(|| cfg.checksum_base.clone()),
        )
    }
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download, verify and install a Tomcat version for an instance.
    Install {
        /// Instance name; owner is `tomcat_<instance>`.
        instance: String,
        /// Tomcat version in X.Y.Z format.
        version: String,
        /// Install directory (default /opt/tomcat_<instance>_<X_Y_Z>/).
        #[arg(long, value_name = "DIR")]
        path: Option<PathBuf>,
        #[command(flatten)]
        mirrors: MirrorArgs,
    },

    /// Print the URIs and paths an install would use, without touching anything.
    Resolve {
        instance: String,
        version: String,
        #[arg(long, value_name = "DIR")]
        path: Option<PathBuf>,
        #[command(flatten)]
        mirrors: MirrorArgs,
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Fetch and print the published SHA-1 for a version.
    FetchChecksum {
        version: String,
        #[arg(long, value_name = "URI")]
        checksum_base: Option<String>,
    },

    /// Verify a local tarball against the published SHA-1 (renames it to .bad on mismatch).
    Verify {
        /// Path to the tarball.
        file: PathBuf,
        version: String,
        #[arg(long, value_name = "URI")]
        checksum_base: Option<String>,
    },

    /// Compute the SHA-1 (or SHA-256) of a file.
    Checksum {
        /// Path to the file.
        path: PathBuf,
        #[arg(long)]
        sha256: bool,
    },

    /// Render Windows service JVM settings as a .reg file.
    JvmOptions(JvmOptionsArgs),

    /// Print shell completions.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Print the man page.
    Man,
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Install {
                instance,
                version,
                path,
                mirrors,
            } => run_install(&load_config()?, &instance, &version, path, &mirrors)?,
            CliCommand::Resolve {
                instance,
                version,
                path,
                mirrors,
                json,
            } => run_resolve(&load_config()?, &instance, &version, path, &mirrors, json)?,
            CliCommand::FetchChecksum {
                version,
                checksum_base,
            } => run_fetch_checksum(&load_config()?, &version, checksum_base)?,
            CliCommand::Verify {
                file,
                version,
                checksum_base,
            } => run_verify(&load_config()?, &file, &version, checksum_base)?,
            CliCommand::Checksum { path, sha256 } => run_checksum(&path, sha256)?,
            CliCommand::JvmOptions(args) => run_jvm_options(&args)?,
            CliCommand::Completions { shell } => run_completions(Cli::command(), shell)?,
            CliCommand::Man => run_man(Cli::command())?,
        }

        Ok(())
    }
}

fn load_config() -> Result<TciConfig> {
    let cfg = config::load_or_init()?;
    tracing::debug!("loaded config: {:?}", cfg);
    Ok(cfg)
}

#[cfg(test)]
mod tests;
