use crate::args::ScopeArgs;
use crate::presentation::ConsoleRenderer;
use crate::presentation::view_models::{
    SessionEntryViewModel, SessionListViewModel, WorkspaceListViewModel, present_warnings,
};
use agsync_runtime::AgSync;
use anyhow::Result;

pub fn handle(
    app: &AgSync,
    scope: &ScopeArgs,
    sessions: bool,
    renderer: &ConsoleRenderer,
) -> Result<()> {
    let resolution = app.resolve(&scope.to_request(false)?)?;

    if sessions {
        let view_model = SessionListViewModel {
            sessions: resolution
                .sessions
                .iter()
                .map(SessionEntryViewModel::from)
                .collect(),
            warnings: present_warnings(&resolution.warnings),
            no_sources_available: resolution.no_sources_available(),
            alias: resolution.alias.clone(),
        };
        return renderer.render(&view_model);
    }

    let view_model = WorkspaceListViewModel::new(
        resolution
            .workspaces
            .iter()
            .map(|w| (w, resolution.sessions_of(w).collect())),
        &resolution.warnings,
        resolution.no_sources_available(),
        resolution.alias.clone(),
    );
    renderer.render(&view_model)
}
