//! `tci jvm-options` – Windows service JVM settings as a `.reg` file.

use anyhow::{Context, Result};
use clap::Args;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tci_core::jvm_registry::{registry_values, JvmSettings, RegFileWriter, RegistryWriter};

#[derive(Debug, Clone, Args)]
pub struct JvmOptionsArgs {
    /// Registry key holding the service's Java parameters.
    #[arg(long)]
    pub key: String,
    /// CATALINA_BASE (also used as CATALINA_HOME).
    #[arg(long)]
    pub catalina_base: String,
    #[arg(long)]
    pub endorsed_dir: String,
    #[arg(long)]
    pub tmp_dir: String,
    /// Directory containing logging.properties.
    #[arg(long)]
    pub config_dir: String,
    /// Initial heap (JvmMs), MB.
    #[arg(long, value_name = "MB")]
    pub initial_heap: Option<u32>,
    /// Maximum heap (JvmMx), MB.
    #[arg(long, value_name = "MB")]
    pub maximum_heap: Option<u32>,
    /// Thread stack size (JvmSs), KB.
    #[arg(long, value_name = "KB")]
    pub thread_stack: Option<u32>,
    #[arg(long)]
    pub perm_size: Option<String>,
    #[arg(long)]
    pub max_perm_size: Option<String>,
    /// Extra JVM options, whitespace separated.
    #[arg(long, allow_hyphen_values = true)]
    pub java_options: Option<String>,
    /// Write to FILE instead of stdout.
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,
    /// Print the computed values as JSON instead of a .reg file.
    #[arg(long, conflicts_with = "out")]
    pub json: bool,
}

impl JvmOptionsArgs {
    pub fn settings(&self) -> JvmSettings {
        JvmSettings {
            key: self.key.clone(),
            catalina_base: self.catalina_base.clone(),
            endorsed_dir: self.endorsed_dir.clone(),
            tmp_dir: self.tmp_dir.clone(),
            config_dir: self.config_dir.clone(),
            initial_heap_mb: self.initial_heap,
            maximum_heap_mb: self.maximum_heap,
            thread_stack_kb: self.thread_stack,
            perm_size: self.perm_size.clone(),
            max_perm_size: self.max_perm_size.clone(),
            java_options: self.java_options.clone(),
        }
    }
}

pub fn run_jvm_options(args: &JvmOptionsArgs) -> Result<()> {
    let settings = args.settings();
    let values = registry_values(&settings);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&values)?);
        return Ok(());
    }

    let out: Box<dyn Write> = match &args.out {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("could not create {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    };
    let mut writer = RegFileWriter::new(out);
    writer.set_values(&settings.key, &values)?;

    if let Some(path) = &args.out {
        println!("Wrote {} values to {}", values.len(), path.display());
    }
    Ok(())
}
