use super::ScopeArgs;
use crate::types::StatsGroup;
use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Export sessions in scope to Markdown
    Export {
        #[command(flatten)]
        scope: ScopeArgs,

        /// Re-export sessions even if their output is up to date
        #[arg(long)]
        force: bool,

        /// Parallel workers (default: config default_jobs, else 1)
        #[arg(short = 'j', long)]
        jobs: Option<usize>,

        /// No per-session progress
        #[arg(short, long)]
        quiet: bool,

        /// Conversation text only: no header, timestamps or tool calls
        #[arg(long)]
        minimal: bool,

        /// Split output into files of at most N lines
        #[arg(long, value_name = "N")]
        split: Option<usize>,

        /// One directory for all files instead of one per workspace
        #[arg(long)]
        flat: bool,

        /// Output directory (default: config export_dir, else ./agsync-export)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Record per-session metrics in the metrics store
    Sync {
        #[command(flatten)]
        scope: ScopeArgs,

        /// Re-read sessions even if they are unchanged
        #[arg(long)]
        force: bool,

        #[arg(short = 'j', long)]
        jobs: Option<usize>,

        #[arg(short, long)]
        quiet: bool,
    },

    /// Show the workspaces (or sessions) a scope resolves to
    List {
        #[command(flatten)]
        scope: ScopeArgs,

        /// List sessions instead of workspaces
        #[arg(long)]
        sessions: bool,
    },

    /// Aggregate synced metrics
    Stats {
        #[arg(long, default_value = "workspace")]
        by: StatsGroup,

        /// Last activity on or after this day (YYYY-MM-DD)
        #[arg(long)]
        since: Option<String>,

        /// Last activity on or before this day (YYYY-MM-DD)
        #[arg(long)]
        until: Option<String>,

        /// Restrict to source keys such as `local` or `remote:vm01` (repeatable)
        #[arg(long)]
        source: Vec<String>,

        /// Write CSV to stdout
        #[arg(long)]
        csv: bool,
    },

    /// Manage aliases that group workspaces across sources
    Alias {
        #[command(subcommand)]
        command: AliasCommand,
    },

    /// Manage saved SSH hosts
    Remote {
        #[command(subcommand)]
        command: RemoteCommand,
    },
}

#[derive(Subcommand)]
pub enum AliasCommand {
    /// Create an empty alias
    Create { name: String },

    Delete { name: String },

    /// Add workspace patterns to an alias
    Add {
        name: String,

        #[arg(required = true)]
        patterns: Vec<String>,

        /// Source the patterns apply to: local, wsl:DISTRO, windows:USER, remote:HOST
        #[arg(long, default_value = "local", conflicts_with = "remote")]
        source: String,

        /// Shorthand for --source remote:HOST
        #[arg(short = 'r', long, value_name = "HOST")]
        remote: Option<String>,
    },

    /// Remove a member by pattern, encoded name, or HOST:PATTERN
    Remove { name: String, member: String },

    List,

    Show { name: String },

    /// Write all aliases as JSON
    Export {
        /// File to write (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Merge aliases from a JSON file written by `alias export`
    Import {
        file: PathBuf,

        /// Overwrite aliases that already exist
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum RemoteCommand {
    /// Save an SSH host (as used by `ssh HOST`)
    Add {
        host: String,

        #[arg(long)]
        label: Option<String>,
    },

    Remove { host: String },

    List,
}
