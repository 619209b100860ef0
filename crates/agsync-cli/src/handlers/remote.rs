use crate::args::RemoteCommand;
use crate::presentation::ConsoleRenderer;
use crate::presentation::view_models::{
    ChangeKind, RemoteChangeViewModel, RemoteListViewModel, RemoteViewModel,
};
use agsync_runtime::AgSync;
use anyhow::Result;

pub fn handle(app: &mut AgSync, command: RemoteCommand, renderer: &ConsoleRenderer) -> Result<()> {
    match command {
        RemoteCommand::Add { host, label } => {
            let remote = app.update_config(|config| config.add_remote(&host, label).cloned())?;
            tracing::info!(host = %remote.host, "saved remote");
            renderer.render(&RemoteChangeViewModel {
                change: ChangeKind::Added,
                remote: RemoteViewModel::from(&remote),
            })
        }
        RemoteCommand::Remove { host } => {
            let remote = app.update_config(|config| config.remove_remote(&host))?;
            renderer.render(&RemoteChangeViewModel {
                change: ChangeKind::Removed,
                remote: RemoteViewModel::from(&remote),
            })
        }
        RemoteCommand::List => renderer.render(&RemoteListViewModel {
            remotes: app
                .config()
                .remotes
                .iter()
                .map(RemoteViewModel::from)
                .collect(),
        }),
    }
}
