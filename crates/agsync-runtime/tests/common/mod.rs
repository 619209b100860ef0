#![allow(dead_code)]

use agsync_core::StateLayout;
use agsync_runtime::{AgSync, Resolution};
use agsync_testing::{FakeTransport, TestWorld};
use agsync_types::{AgentKind, ScopeRequest, SessionKey};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

/// Open the runtime against a world, with remote hosts served by `transport`.
pub fn open(world: &TestWorld, transport: &Arc<FakeTransport>) -> AgSync {
    AgSync::open(StateLayout::new(world.data_dir()))
        .expect("open state")
        .with_local_home(world.home())
        .with_transport(transport.clone())
}

pub fn request(patterns: &[&str], cwd: &Path) -> ScopeRequest {
    ScopeRequest {
        workspace_patterns: patterns.iter().map(|p| p.to_string()).collect(),
        agents: AgentKind::ALL.to_vec(),
        current_dir: Some(cwd.to_path_buf()),
        ..Default::default()
    }
}

pub fn keys(resolution: &Resolution) -> BTreeSet<SessionKey> {
    resolution.sessions.iter().map(|s| s.key()).collect()
}

pub fn ids(resolution: &Resolution) -> Vec<String> {
    resolution
        .sessions
        .iter()
        .map(|s| s.session_id.clone())
        .collect()
}
