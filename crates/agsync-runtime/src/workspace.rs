use agsync_core::{StateLayout, home_dir};
use agsync_index::{Database, GroupBy, MetricsSummary, SummaryFilter};
use agsync_providers::{AdapterEnv, HashIndex, SshTransport, Transport};
use agsync_types::ScopeRequest;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::ops::{ExportOptions, SyncOptions, export_sessions, sync_metrics};
use crate::registry::AliasRegistry;
use crate::resolver::{Resolution, ScopeResolver, SourceWarning};
use crate::runner::{ProgressEvent, RunSummary};
use crate::{Error, Result};

/// Outcome of an export or sync run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Sessions the scope resolved to
    pub matched: usize,
    pub warnings: Vec<SourceWarning>,
    /// Every source in scope failed
    pub no_sources_available: bool,
    pub alias: Option<String>,
    pub summary: RunSummary,
}

/// Entry point: persisted state plus everything needed to reach sources.
pub struct AgSync {
    layout: StateLayout,
    config: Config,
    registry: AliasRegistry,
    env: AdapterEnv,
}

impl AgSync {
    pub fn open(layout: StateLayout) -> Result<Self> {
        layout.ensure_root()?;

        let config = Config::load_from(&layout.config_json())?;
        let registry = AliasRegistry::load(&layout.aliases_json())?;
        let hash_index = HashIndex::open(&layout.hash_index())?;
        let local_home = home_dir()
            .ok_or_else(|| Error::Config("could not determine the home directory".to_string()))?;

        let env = AdapterEnv {
            local_home,
            mounts: config.mount_conventions(),
            transport: Arc::new(SshTransport::new()),
            hash_index: Arc::new(hash_index),
        };

        tracing::debug!(root = %layout.root().display(), "opened state");
        Ok(Self {
            layout,
            config,
            registry,
            env,
        })
    }

    /// Replace the SSH transport (tests use an in-process fake).
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.env.transport = transport;
        self
    }

    pub fn with_local_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.env.local_home = home.into();
        self
    }

    pub fn layout(&self) -> &StateLayout {
        &self.layout
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Apply `f` to the config and save it if it succeeds.
    pub fn update_config<T>(&mut self, f: impl FnOnce(&mut Config) -> Result<T>) -> Result<T> {
        let value = f(&mut self.config)?;
        self.config.save_to(&self.layout.config_json())?;
        self.env.mounts = self.config.mount_conventions();
        Ok(value)
    }

    pub fn registry(&self) -> &AliasRegistry {
        &self.registry
    }

    /// The registry saves itself after every mutation.
    pub fn registry_mut(&mut self) -> &mut AliasRegistry {
        &mut self.registry
    }

    pub fn env(&self) -> &AdapterEnv {
        &self.env
    }

    /// Where remote sessions are copied before parsing.
    pub fn cache_root(&self) -> &Path {
        &self.env.local_home
    }

    pub fn resolve(&self, request: &ScopeRequest) -> Result<Resolution> {
        ScopeResolver::new(&self.env, &self.config, &self.registry).resolve(request)
    }

    pub fn export<P>(
        &self,
        request: &ScopeRequest,
        options: &ExportOptions,
        progress: P,
    ) -> Result<RunReport>
    where
        P: Fn(ProgressEvent<'_>) + Sync,
    {
        let resolution = self.resolve(request)?;
        let summary = export_sessions(&resolution, options, self.cache_root(), progress)?;
        Ok(report(resolution, summary))
    }

    pub fn sync<P>(&self, request: &ScopeRequest, options: &SyncOptions, progress: P) -> Result<RunReport>
    where
        P: Fn(ProgressEvent<'_>) + Sync,
    {
        let resolution = self.resolve(request)?;
        let summary = sync_metrics(
            &self.layout.metrics_db(),
            &resolution,
            options,
            self.cache_root(),
            progress,
        )?;
        Ok(report(resolution, summary))
    }

    pub fn stats(&self, group_by: GroupBy, filter: &SummaryFilter) -> Result<Vec<MetricsSummary>> {
        let db = Database::open(&self.layout.metrics_db())?;
        Ok(db.summarize(group_by, filter)?)
    }
}

fn report(resolution: Resolution, summary: RunSummary) -> RunReport {
    RunReport {
        matched: resolution.sessions.len(),
        no_sources_available: resolution.no_sources_available(),
        warnings: resolution.warnings,
        alias: resolution.alias,
        summary,
    }
}
