// NOTE: agsync layering
//
// args        clap definitions, translated into a ScopeRequest
// commands    dispatch plus process setup (logging, config root, migration)
// handlers    one module per command, calling into agsync-runtime
// presentation view models (serde) and their plain-text views
//
// Handlers never print directly; everything goes through ConsoleRenderer so
// `--format json` always yields a single JSON document on stdout.

mod args;
mod commands;
mod handlers;
mod logging;
pub mod presentation;
pub mod types;

pub use args::{AliasCommand, Cli, Commands, RemoteCommand, ScopeArgs};
pub use commands::run;
