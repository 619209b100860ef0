use super::args::{Cli, Commands};
use super::handlers;
use crate::logging;
use crate::presentation::ConsoleRenderer;
use agsync_core::{StateLayout, legacy_root, migrate_legacy_root, resolve_config_root};
use agsync_runtime::AgSync;
use anyhow::{Context, Result};

pub fn run(cli: Cli) -> Result<()> {
    logging::init(cli.log_level);

    let root = resolve_config_root(cli.data_dir.as_deref())?;
    let layout = StateLayout::new(root);
    migrate_legacy_state(&layout);

    let mut app = AgSync::open(layout).context("Failed to open agsync state")?;
    let renderer = ConsoleRenderer::new(cli.format);

    match cli.command {
        Commands::Export {
            scope,
            force,
            jobs,
            quiet,
            minimal,
            split,
            flat,
            output,
        } => handlers::export::handle(
            &app, &scope, force, jobs, quiet, minimal, split, flat, output, &renderer,
        ),

        Commands::Sync {
            scope,
            force,
            jobs,
            quiet,
        } => handlers::sync::handle(&app, &scope, force, jobs, quiet, &renderer),

        Commands::List { scope, sessions } => {
            handlers::list::handle(&app, &scope, sessions, &renderer)
        }

        Commands::Stats {
            by,
            since,
            until,
            source,
            csv,
        } => handlers::stats::handle(&app, by, since, until, source, csv, &renderer),

        Commands::Alias { command } => handlers::alias::handle(&mut app, command, &renderer),

        Commands::Remote { command } => handlers::remote::handle(&mut app, command, &renderer),
    }
}

/// Move state left in `~/.agsync` by older releases. Failures only warn.
fn migrate_legacy_state(layout: &StateLayout) {
    let Some(legacy) = legacy_root() else {
        return;
    };

    match migrate_legacy_root(&legacy, layout) {
        Ok(report) if !report.is_empty() => tracing::info!(
            moved = report.moved.len(),
            kept = report.kept.len(),
            legacy = %legacy.display(),
            "legacy state migrated"
        ),
        Ok(_) => {}
        Err(err) => tracing::warn!(error = %err, "legacy state migration failed"),
    }
}
