// NOTE: Command Organization
//
// Actions (export, sync, list) are top-level and share one set of scope
// flags, since they are what users type most. Stored state is edited through
// namespaced subcommands (alias, remote).

mod commands;
mod scope;

pub use commands::*;
pub use scope::ScopeArgs;

use crate::types::{LogLevel, OutputFormat};
use clap::Parser;

#[derive(Parser)]
#[command(name = "agsync")]
#[command(about = "Collect AI assistant sessions across machines", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config root (default: AGSYNC_PATH, then the system config directory)
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    #[arg(long, default_value = "plain", global = true)]
    pub format: OutputFormat,

    #[arg(long, default_value = "warn", global = true)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Commands,
}
