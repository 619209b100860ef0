use agsync_providers::{Adapter, AdapterEnv, SourceAdapter};
use agsync_types::{
    AgentKind, ALIAS_SIGIL, DisplayPath, ScopeRequest, Session, SessionKey, Source, SourceKind,
    Workspace, WorkspaceKey, WorkspacePattern,
};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::config::Config;
use crate::registry::AliasRegistry;
use crate::{Error, Result};

/// A source (or a class of sources) dropped from the run, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceWarning {
    /// Source key, or the kind when detection found nothing
    pub scope: String,
    pub reason: String,
}

impl std::fmt::Display for SourceWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.scope, self.reason)
    }
}

/// Output of one resolution pass.
pub struct Resolution {
    /// In-scope sources that answered, in scope order
    pub sources: Vec<Source>,
    /// Matched workspaces in first-matched order
    pub workspaces: Vec<Workspace>,
    /// Deduplicated sessions grouped by workspace, mtime ascending within each
    pub sessions: Vec<Session>,
    pub warnings: Vec<SourceWarning>,
    /// Alias that supplied the workspace scope, if any
    pub alias: Option<String>,
    adapters: Vec<Adapter>,
}

impl Resolution {
    pub fn adapter(&self, source: &Source) -> Option<&Adapter> {
        self.adapters.iter().find(|a| a.source() == source)
    }

    /// Every requested source failed.
    pub fn no_sources_available(&self) -> bool {
        self.sources.is_empty() && !self.warnings.is_empty()
    }

    pub fn sessions_of<'a>(&'a self, workspace: &'a Workspace) -> impl Iterator<Item = &'a Session> {
        let key = workspace.key();
        self.sessions
            .iter()
            .filter(move |s| s.workspace.key() == key)
    }
}

impl std::fmt::Debug for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolution")
            .field("sources", &self.sources)
            .field("workspaces", &self.workspaces.len())
            .field("sessions", &self.sessions.len())
            .field("warnings", &self.warnings)
            .field("alias", &self.alias)
            .finish_non_exhaustive()
    }
}

/// One workspace selector: a pattern, optionally bound to a single source.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Selector {
    source: Option<Source>,
    pattern: WorkspacePattern,
}

impl Selector {
    fn applies_to(&self, workspace: &Workspace) -> bool {
        self.source.as_ref().is_none_or(|s| *s == workspace.source) && self.pattern.matches(workspace)
    }
}

struct WorkspaceScope {
    selectors: Vec<Selector>,
    alias: Option<String>,
    /// Verbatim alias patterns, used as hash-index candidates
    alias_patterns: Vec<String>,
}

struct Listing {
    adapter: Adapter,
    workspaces: Vec<Workspace>,
}

/// Turns a [`ScopeRequest`] into an ordered, deduplicated session list.
pub struct ScopeResolver<'a> {
    env: &'a AdapterEnv,
    config: &'a Config,
    registry: &'a AliasRegistry,
}

impl<'a> ScopeResolver<'a> {
    pub fn new(env: &'a AdapterEnv, config: &'a Config, registry: &'a AliasRegistry) -> Self {
        Self {
            env,
            config,
            registry,
        }
    }

    pub fn resolve(&self, request: &ScopeRequest) -> Result<Resolution> {
        // Configuration errors surface before any source is touched.
        request.validate()?;
        if request.agents.is_empty() {
            return Err(Error::Config("no agent selected".to_string()));
        }

        let scope = self.workspace_scope(request)?;
        let strict = scope.alias.is_none()
            && !request.use_alias()
            && !request.source_flags.all_hosts
            && request.source_flags.explicit_count() == 1;

        let mut warnings = Vec::new();
        let sources = self.source_scope(request, &scope, strict, &mut warnings)?;
        tracing::debug!(
            sources = ?sources.iter().map(Source::key).collect::<Vec<_>>(),
            strict,
            "source scope"
        );

        let mut listings = Vec::new();
        for (source, result) in sources.iter().zip(self.list_all(&sources, &request.agents)) {
            match result {
                Ok(listing) => listings.push(listing),
                Err(err) => {
                    let err = Error::from_provider(err);
                    if strict {
                        return Err(err);
                    }
                    tracing::warn!(source = %source, error = %err, "skipping unavailable source");
                    warnings.push(SourceWarning {
                        scope: source.key(),
                        reason: unavailable_reason(&err),
                    });
                }
            }
        }

        if listings.is_empty() && !warnings.is_empty() {
            tracing::warn!(failed = warnings.len(), "no sources available");
        }

        self.learn_hashes(request, &scope, &mut listings);

        let workspaces = match_workspaces(&scope.selectors, &listings);
        let sessions = self.collect_sessions(&workspaces, &listings, request, strict, &mut warnings)?;

        Ok(Resolution {
            sources: listings.iter().map(|l| l.adapter.source().clone()).collect(),
            workspaces,
            sessions,
            warnings,
            alias: scope.alias,
            adapters: listings.into_iter().map(|l| l.adapter).collect(),
        })
    }

    fn workspace_scope(&self, request: &ScopeRequest) -> Result<WorkspaceScope> {
        let mut scope = WorkspaceScope {
            selectors: Vec::new(),
            alias: None,
            alias_patterns: Vec::new(),
        };

        if !request.workspace_patterns.is_empty() {
            for pattern in &request.workspace_patterns {
                if let Some(name) = pattern.strip_prefix(ALIAS_SIGIL) {
                    self.push_alias(&mut scope, name)?;
                } else {
                    scope.selectors.push(Selector {
                        source: None,
                        pattern: WorkspacePattern::Substring(pattern.clone()),
                    });
                }
            }
            return Ok(scope);
        }

        if request.all_workspaces {
            scope.selectors.push(Selector {
                source: None,
                pattern: WorkspacePattern::Everything,
            });
            return Ok(scope);
        }

        let current = request
            .current_dir
            .as_deref()
            .map(|p| p.to_string_lossy().to_string())
            .ok_or_else(|| {
                Error::Config("no workspace pattern given and no current directory".to_string())
            })?;

        if !request.this_only
            && let Some(alias) = self.registry.alias_for_workspace(&current)
        {
            tracing::info!(alias = %alias.name, cwd = %current, "using alias of current workspace");
            let name = alias.name.clone();
            self.push_alias(&mut scope, &name)?;
            return Ok(scope);
        }

        scope.selectors.push(Selector {
            source: None,
            pattern: WorkspacePattern::Exact(current),
        });
        Ok(scope)
    }

    fn push_alias(&self, scope: &mut WorkspaceScope, name: &str) -> Result<()> {
        let members = self.registry.resolve(name).map_err(|err| match err {
            Error::NotFound { .. } => Error::Config(format!("unknown alias '@{}'", name)),
            other => other,
        })?;

        scope.alias.get_or_insert_with(|| name.to_string());
        for member in members {
            scope.alias_patterns.push(member.pattern.clone());
            let selector = Selector {
                source: Some(member.source.clone()),
                pattern: WorkspacePattern::Substring(member.pattern.clone()),
            };
            if !scope.selectors.contains(&selector) {
                scope.selectors.push(selector);
            }
        }
        Ok(())
    }

    fn source_scope(
        &self,
        request: &ScopeRequest,
        scope: &WorkspaceScope,
        strict: bool,
        warnings: &mut Vec<SourceWarning>,
    ) -> Result<Vec<Source>> {
        let flags = &request.source_flags;
        let mut sources: Vec<Source> = Vec::new();

        if flags.is_default() {
            sources.push(Source::Local);
        }

        if flags.all_hosts {
            sources.push(Source::Local);
            sources.extend(self.env.detect_mounted());
            sources.extend(self.config.remote_sources());
        }

        let mounts = &self.env.mounts;
        match &flags.wsl {
            Some(Some(distro)) => sources.push(Source::subsystem(distro)),
            Some(None) => {
                let detected = mounts.detect_subsystems();
                if detected.is_empty() {
                    detection_failed(SourceKind::Subsystem, strict, warnings)?;
                }
                sources.extend(detected);
            }
            None => {}
        }
        match &flags.windows {
            Some(Some(user)) => sources.push(Source::host_mount(user)),
            Some(None) => {
                let detected = mounts.detect_host_mounts();
                if detected.is_empty() {
                    detection_failed(SourceKind::HostMount, strict, warnings)?;
                }
                sources.extend(detected);
            }
            None => {}
        }
        sources.extend(flags.remotes.iter().map(Source::remote));

        // Alias members bring their own sources.
        sources.extend(scope.selectors.iter().filter_map(|s| s.source.clone()));

        let mut seen = HashSet::new();
        sources.retain(|s| !flags.excludes(s.kind()) && seen.insert(s.clone()));
        Ok(sources)
    }

    /// List every source in parallel; results come back in scope order.
    fn list_all(
        &self,
        sources: &[Source],
        agents: &[AgentKind],
    ) -> Vec<std::result::Result<Listing, agsync_providers::Error>> {
        sources
            .par_iter()
            .map(|source| {
                let adapter = Adapter::connect(source, self.env)?;
                let workspaces = adapter.list_workspaces(agents)?;
                Ok(Listing {
                    adapter,
                    workspaces,
                })
            })
            .collect()
    }

    /// Bind unresolved hashes to paths seen during this pass, then re-resolve.
    fn learn_hashes(&self, request: &ScopeRequest, scope: &WorkspaceScope, listings: &mut [Listing]) {
        let mut shared: Vec<String> = Vec::new();
        if let Some(cwd) = &request.current_dir {
            shared.push(cwd.to_string_lossy().to_string());
        }
        shared.extend(
            scope
                .alias_patterns
                .iter()
                .filter(|p| looks_absolute(p))
                .cloned(),
        );

        for listing in listings.iter_mut() {
            let present: HashSet<String> = listing
                .workspaces
                .iter()
                .filter_map(|w| match &w.display_path {
                    DisplayPath::Unresolved { hash } => Some(hash.clone()),
                    DisplayPath::Resolved(_) => None,
                })
                .collect();
            if present.is_empty() {
                continue;
            }

            let claude_paths: Vec<String> = listing
                .workspaces
                .iter()
                .filter(|w| w.agent == AgentKind::Claude)
                .filter_map(|w| w.display_path.resolved().map(str::to_string))
                .collect();
            let candidates = shared.iter().chain(claude_paths.iter()).map(String::as_str);

            match self.env.hash_index.learn(&present, candidates) {
                Ok(0) => continue,
                Ok(learned) => {
                    tracing::info!(source = %listing.adapter.source(), learned, "learned project hashes")
                }
                Err(err) => {
                    tracing::warn!(error = %err, "could not record project hashes");
                }
            }

            for workspace in listing.workspaces.iter_mut() {
                if let DisplayPath::Unresolved { hash } = &workspace.display_path
                    && let Some(path) = self.env.hash_index.lookup(hash)
                {
                    workspace.display_path = DisplayPath::Resolved(path);
                }
            }
        }
    }

    fn collect_sessions(
        &self,
        workspaces: &[Workspace],
        listings: &[Listing],
        request: &ScopeRequest,
        strict: bool,
        warnings: &mut Vec<SourceWarning>,
    ) -> Result<Vec<Session>> {
        let adapters: HashMap<&Source, &Adapter> = listings
            .iter()
            .map(|l| (l.adapter.source(), &l.adapter))
            .collect();

        let listed: Vec<Result<Vec<Session>>> = workspaces
            .par_iter()
            .map(|workspace| {
                let adapter = adapters
                    .get(&workspace.source)
                    .ok_or_else(|| Error::unavailable(&workspace.source, "source was not listed"))?;
                adapter.list_sessions(workspace).map_err(Error::from_provider)
            })
            .collect();

        let mut seen: HashSet<SessionKey> = HashSet::new();
        let mut sessions = Vec::new();
        for (workspace, result) in workspaces.iter().zip(listed) {
            let mut batch = match result {
                Ok(batch) => batch,
                Err(err) if strict => return Err(err),
                Err(err) => {
                    tracing::warn!(workspace = %workspace.display_path, error = %err, "skipping workspace");
                    warnings.push(SourceWarning {
                        scope: format!("{} {}", workspace.source, workspace.display_path),
                        reason: unavailable_reason(&err),
                    });
                    continue;
                }
            };

            batch.retain(|s| request.date_range.contains(s.mtime) && seen.insert(s.key()));
            batch.sort_by(|a, b| a.mtime.cmp(&b.mtime).then_with(|| a.file_path.cmp(&b.file_path)));
            sessions.extend(batch);
        }

        tracing::debug!(
            workspaces = workspaces.len(),
            sessions = sessions.len(),
            "resolved sessions"
        );
        Ok(sessions)
    }
}

/// Workspaces matched by any selector, ordered by the first selector that
/// matched them and then by listing order.
fn match_workspaces(selectors: &[Selector], listings: &[Listing]) -> Vec<Workspace> {
    let mut seen: HashSet<WorkspaceKey> = HashSet::new();
    let mut matched = Vec::new();

    for selector in selectors {
        for workspace in listings.iter().flat_map(|l| l.workspaces.iter()) {
            if selector.applies_to(workspace) && seen.insert(workspace.key()) {
                matched.push(workspace.clone());
            }
        }
    }
    matched
}

fn detection_failed(
    kind: SourceKind,
    strict: bool,
    warnings: &mut Vec<SourceWarning>,
) -> Result<()> {
    let reason = format!("no {} source with agent logs detected", kind.as_str());
    if strict {
        return Err(Error::SourceUnavailable {
            scope: kind.as_str().to_string(),
            reason,
        });
    }
    tracing::warn!(kind = kind.as_str(), "nothing detected");
    warnings.push(SourceWarning {
        scope: kind.as_str().to_string(),
        reason,
    });
    Ok(())
}

fn unavailable_reason(err: &Error) -> String {
    match err {
        Error::SourceUnavailable { reason, .. } => reason.clone(),
        other => other.to_string(),
    }
}

fn looks_absolute(pattern: &str) -> bool {
    Path::new(pattern).is_absolute()
        || pattern.starts_with('/')
        || (pattern.len() > 2 && pattern.as_bytes()[1] == b':' && pattern.as_bytes()[0].is_ascii_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_looks_absolute() {
        assert!(looks_absolute("/home/me/proj"));
        assert!(looks_absolute(r"C:\Users\me\proj"));
        assert!(!looks_absolute("proj"));
        assert!(!looks_absolute("~/proj"));
    }

    #[test]
    fn test_selector_bound_to_source() {
        let workspace = Workspace {
            source: Source::remote("vm01"),
            agent: AgentKind::Claude,
            encoded_name: "-srv-proj".into(),
            display_path: DisplayPath::Resolved("/srv/proj".into()),
            root_dir: "/tmp".into(),
        };
        let local_only = Selector {
            source: Some(Source::Local),
            pattern: WorkspacePattern::Substring("proj".into()),
        };
        let any = Selector {
            source: None,
            pattern: WorkspacePattern::Substring("proj".into()),
        };
        assert!(!local_only.applies_to(&workspace));
        assert!(any.applies_to(&workspace));
    }
}
