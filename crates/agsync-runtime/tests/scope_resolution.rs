mod common;

use agsync_runtime::{Error, SourceWarning};
use agsync_testing::{FakeTransport, TestWorld, day};
use agsync_types::{DateRange, Source, SourceKind};
use common::{ids, keys, open, request};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;

#[test]
fn test_pattern_union_keeps_every_match() {
    let world = TestWorld::new();
    world.add_claude_session("/work/alpha", "a1", day(2025, 11, 1));
    world.add_claude_session("/work/alpha", "a2", day(2025, 11, 2));
    world.add_claude_session("/work/beta", "b1", day(2025, 11, 3));
    world.add_claude_session("/work/gamma", "g1", day(2025, 11, 4));

    let transport = Arc::new(FakeTransport::new());
    let app = open(&world, &transport);
    let cwd = world.cwd();

    let alpha = keys(&app.resolve(&request(&["alpha"], cwd)).unwrap());
    let beta = keys(&app.resolve(&request(&["beta"], cwd)).unwrap());
    let both = keys(&app.resolve(&request(&["alpha", "beta"], cwd)).unwrap());

    assert_eq!(alpha.len(), 2);
    assert_eq!(beta.len(), 1);
    assert_eq!(both, alpha.union(&beta).cloned().collect());
}

#[test]
fn test_overlapping_patterns_yield_each_file_once() {
    let world = TestWorld::new();
    world.add_claude_session("/work/myproj", "s1", day(2025, 11, 1));
    world.add_claude_session("/work/myproj", "s2", day(2025, 11, 2));

    let transport = Arc::new(FakeTransport::new());
    let app = open(&world, &transport);

    let resolution = app
        .resolve(&request(&["proj", "myproj", "MYPROJ"], world.cwd()))
        .unwrap();
    assert_eq!(ids(&resolution), vec!["s1", "s2"]);
    assert_eq!(resolution.workspaces.len(), 1);
}

#[test]
fn test_inverted_date_range_fails_before_listing() {
    let world = TestWorld::new();
    let transport = Arc::new(FakeTransport::new().with_host("vm01", world.remote_home("vm01")));
    let app = open(&world, &transport);

    let mut req = request(&["proj"], world.cwd());
    req.source_flags.remotes = vec!["vm01".to_string()];
    req.date_range = DateRange {
        since: Some(day(2025, 12, 1).date_naive()),
        until: Some(day(2025, 11, 1).date_naive()),
    };

    let err = app.resolve(&req).unwrap_err();
    assert!(err.is_config());
    assert_eq!(transport.runs(), 0);
}

#[test]
fn test_date_window_is_inclusive() {
    let world = TestWorld::new();
    world.add_claude_session("/work/a", "nov01", day(2025, 11, 1));
    world.add_claude_session("/work/a", "nov15", day(2025, 11, 15));
    world.add_claude_session("/work/a", "dec01", day(2025, 12, 1));

    let transport = Arc::new(FakeTransport::new());
    let app = open(&world, &transport);

    let mut req = request(&["/work/a"], world.cwd());
    req.date_range = DateRange::parse(Some("2025-11-10"), Some("2025-11-30")).unwrap();
    assert_eq!(ids(&app.resolve(&req).unwrap()), vec!["nov15"]);

    req.date_range = DateRange::parse(Some("2025-11-15"), Some("2025-11-15")).unwrap();
    assert_eq!(ids(&app.resolve(&req).unwrap()), vec!["nov15"]);
}

#[test]
fn test_all_hosts_survives_offline_remote() {
    let world = TestWorld::new();
    world.add_claude_session("/work/proj", "local1", day(2025, 11, 1));
    world.add_claude_session_in(&world.remote_home("vm01"), "/srv/proj", "vm01-1", day(2025, 11, 2));
    world.write_config(&json!({
        "remotes": [
            {"host": "vm01", "added_at": "2025-11-01T00:00:00Z"},
            {"host": "vm02", "added_at": "2025-11-01T00:00:00Z"}
        ],
        "mounts": {"wsl_roots": [], "windows_users_root": null}
    }));

    let transport = Arc::new(
        FakeTransport::new()
            .with_host("vm01", world.remote_home("vm01"))
            .with_offline("vm02"),
    );
    let app = open(&world, &transport);

    let mut req = request(&["proj"], world.cwd());
    req.source_flags.all_hosts = true;
    let resolution = app.resolve(&req).unwrap();

    assert_eq!(ids(&resolution), vec!["local1", "vm01-1"]);
    assert_eq!(
        resolution.sources,
        vec![Source::Local, Source::remote("vm01")]
    );
    assert_eq!(resolution.warnings.len(), 1);
    assert_eq!(resolution.warnings[0].scope, "remote:vm02");
}

#[test]
fn test_negation_removes_kind_from_all_hosts() {
    let world = TestWorld::new();
    world.add_claude_session("/work/proj", "local1", day(2025, 11, 1));
    world.add_claude_session_in(&world.remote_home("vm01"), "/srv/proj", "vm01-1", day(2025, 11, 2));
    world.write_config(&json!({
        "remotes": [{"host": "vm01", "added_at": "2025-11-01T00:00:00Z"}],
        "mounts": {"wsl_roots": []}
    }));

    let transport = Arc::new(FakeTransport::new().with_host("vm01", world.remote_home("vm01")));
    let app = open(&world, &transport);

    let mut req = request(&["proj"], world.cwd());
    req.source_flags.all_hosts = true;
    req.source_flags.exclude = vec![SourceKind::Local];

    assert_eq!(ids(&app.resolve(&req).unwrap()), vec!["vm01-1"]);
}

#[test]
fn test_single_explicit_source_is_strict() {
    let world = TestWorld::new();
    let transport = Arc::new(FakeTransport::new().with_offline("vm02"));
    let app = open(&world, &transport);

    let mut req = request(&["proj"], world.cwd());
    req.source_flags.remotes = vec!["vm02".to_string()];

    match app.resolve(&req) {
        Err(Error::SourceUnavailable { scope, reason }) => {
            assert_eq!(scope, "remote:vm02");
            assert!(reason.contains("timed out"));
        }
        other => panic!("expected SourceUnavailable, got {:?}", other),
    }
}

#[test]
fn test_strict_detection_without_mounts_is_source_unavailable() {
    let world = TestWorld::new();
    world.write_config(&json!({
        "mounts": {"wsl_roots": [world.wsl_root()], "windows_users_root": world.temp_dir().join("Users")}
    }));

    let transport = Arc::new(FakeTransport::new());
    let app = open(&world, &transport);

    let mut req = request(&["proj"], world.cwd());
    req.source_flags.wsl = Some(None);
    match app.resolve(&req) {
        Err(Error::SourceUnavailable { scope, reason }) => {
            assert_eq!(scope, "wsl");
            assert!(reason.contains("no wsl source"));
        }
        other => panic!("expected SourceUnavailable, got {:?}", other),
    }

    req.source_flags.wsl = None;
    req.source_flags.windows = Some(None);
    match app.resolve(&req) {
        Err(Error::SourceUnavailable { scope, .. }) => assert_eq!(scope, "windows"),
        other => panic!("expected SourceUnavailable, got {:?}", other),
    }

    // Alongside another source the same miss is only a warning.
    req.source_flags.all_hosts = true;
    let resolution = app.resolve(&req).unwrap();
    assert_eq!(resolution.sources, vec![Source::Local]);
    assert_eq!(resolution.warnings[0].scope, "windows");
}

#[test]
fn test_all_sources_failing_is_empty_with_warnings() {
    let world = TestWorld::new();
    let transport = Arc::new(FakeTransport::new().with_offline("vm01").with_offline("vm02"));
    let app = open(&world, &transport);

    let mut req = request(&["proj"], world.cwd());
    req.source_flags.remotes = vec!["vm01".to_string(), "vm02".to_string()];

    let resolution = app.resolve(&req).unwrap();
    assert!(resolution.no_sources_available());
    assert!(resolution.sessions.is_empty());
    assert_eq!(
        resolution
            .warnings
            .iter()
            .map(|w| w.scope.as_str())
            .collect::<Vec<_>>(),
        vec!["remote:vm01", "remote:vm02"]
    );
}

#[test]
fn test_alias_of_current_workspace_spans_sources() {
    let world = TestWorld::new();
    world.add_claude_session("/work/myproject", "local1", day(2025, 11, 1));
    world.add_claude_session("/work/other", "other1", day(2025, 11, 1));
    world.add_claude_session_in(&world.remote_home("vm01"), "/srv/myproject", "vm01-1", day(2025, 11, 3));
    world.add_claude_session_in(&world.remote_home("vm01"), "/srv/unrelated", "vm01-2", day(2025, 11, 3));

    let transport = Arc::new(FakeTransport::new().with_host("vm01", world.remote_home("vm01")));
    let mut app = open(&world, &transport);
    let patterns = vec!["myproject".to_string()];
    let registry = app.registry_mut();
    registry.create("myproject").unwrap();
    registry.add_members("myproject", &Source::Local, &patterns).unwrap();
    registry
        .add_members("myproject", &Source::remote("vm01"), &patterns)
        .unwrap();

    let cwd = Path::new("/work/myproject");
    let resolution = app.resolve(&request(&[], cwd)).unwrap();
    assert_eq!(resolution.alias.as_deref(), Some("myproject"));
    assert_eq!(ids(&resolution), vec!["local1", "vm01-1"]);

    let mut this_only = request(&[], cwd);
    this_only.this_only = true;
    let resolution = app.resolve(&this_only).unwrap();
    assert_eq!(resolution.alias, None);
    assert_eq!(ids(&resolution), vec!["local1"]);

    let explicit = app.resolve(&request(&["@myproject"], world.cwd())).unwrap();
    assert_eq!(ids(&explicit), vec!["local1", "vm01-1"]);
}

#[test]
fn test_hyphenated_project_matches_on_every_source() {
    let world = TestWorld::new();
    world.add_claude_session("/work/agent-history", "local1", day(2025, 11, 1));
    world.add_claude_session_in(&world.remote_home("vm01"), "/work/agent-history", "vm01-1", day(2025, 11, 2));
    world.add_claude_session_in(&world.remote_home("vm01"), "/work/agent", "vm01-2", day(2025, 11, 2));

    let transport = Arc::new(FakeTransport::new().with_host("vm01", world.remote_home("vm01")));
    let mut app = open(&world, &transport);
    let patterns = vec!["agent-history".to_string()];
    app.registry_mut().create("ah").unwrap();
    app.registry_mut()
        .add_members("ah", &Source::Local, &patterns)
        .unwrap();
    app.registry_mut()
        .add_members("ah", &Source::remote("vm01"), &patterns)
        .unwrap();

    let via_alias = app.resolve(&request(&["@ah"], world.cwd())).unwrap();
    assert_eq!(ids(&via_alias), vec!["local1", "vm01-1"]);
    let display_paths: Vec<String> = via_alias
        .workspaces
        .iter()
        .map(|w| w.display_path.to_string())
        .collect();
    assert_eq!(display_paths, vec!["/work/agent-history", "/work/agent-history"]);

    let mut remote_only = request(&["agent-history"], world.cwd());
    remote_only.source_flags.remotes = vec!["vm01".to_string()];
    assert_eq!(ids(&app.resolve(&remote_only).unwrap()), vec!["vm01-1"]);

    let mut from_checkout = request(&[], Path::new("/work/agent-history"));
    from_checkout.source_flags.remotes = vec!["vm01".to_string()];
    from_checkout.this_only = true;
    assert_eq!(ids(&app.resolve(&from_checkout).unwrap()), vec!["vm01-1"]);
}

#[test]
fn test_alias_with_offline_member_is_lenient() {
    let world = TestWorld::new();
    world.add_claude_session("/work/myproject", "local1", day(2025, 11, 1));

    let transport = Arc::new(FakeTransport::new().with_offline("vm01"));
    let mut app = open(&world, &transport);
    let patterns = vec!["myproject".to_string()];
    app.registry_mut().create("p").unwrap();
    app.registry_mut()
        .add_members("p", &Source::remote("vm01"), &patterns)
        .unwrap();
    app.registry_mut()
        .add_members("p", &Source::Local, &patterns)
        .unwrap();

    let resolution = app.resolve(&request(&["@p"], world.cwd())).unwrap();
    assert_eq!(ids(&resolution), vec!["local1"]);
    assert_eq!(
        resolution.warnings,
        vec![SourceWarning {
            scope: "remote:vm01".to_string(),
            reason: "SSH connection failed: ssh: connect to host vm01 port 22: Connection timed out"
                .to_string(),
        }]
    );
}

#[test]
fn test_unknown_alias_is_config_error() {
    let world = TestWorld::new();
    let transport = Arc::new(FakeTransport::new());
    let app = open(&world, &transport);

    assert!(app.resolve(&request(&["@nope"], world.cwd())).unwrap_err().is_config());
}

#[test]
fn test_order_follows_patterns_then_mtime() {
    let world = TestWorld::new();
    world.add_claude_session("/work/beta", "b-late", day(2025, 11, 9));
    world.add_claude_session("/work/beta", "b-early", day(2025, 11, 2));
    world.add_claude_session("/work/alpha", "a-late", day(2025, 11, 8));
    world.add_claude_session("/work/alpha", "a-early", day(2025, 11, 1));

    let transport = Arc::new(FakeTransport::new());
    let app = open(&world, &transport);

    let resolution = app.resolve(&request(&["beta", "alpha"], world.cwd())).unwrap();
    assert_eq!(ids(&resolution), vec!["b-early", "b-late", "a-early", "a-late"]);

    let again = app.resolve(&request(&["beta", "alpha"], world.cwd())).unwrap();
    assert_eq!(ids(&again), ids(&resolution));
}

#[test]
fn test_default_scope_is_current_directory() {
    let world = TestWorld::new();
    world.add_claude_session("/work/proj", "mine", day(2025, 11, 1));
    world.add_claude_session("/work/proj-old", "sibling", day(2025, 11, 1));

    let transport = Arc::new(FakeTransport::new());
    let app = open(&world, &transport);

    let resolution = app.resolve(&request(&[], Path::new("/work/proj"))).unwrap();
    assert_eq!(ids(&resolution), vec!["mine"]);

    let mut everything = request(&[], Path::new("/work/proj"));
    everything.all_workspaces = true;
    assert_eq!(app.resolve(&everything).unwrap().sessions.len(), 2);
}

#[test]
fn test_gemini_hash_is_learned_from_current_directory() {
    let world = TestWorld::new();
    world.add_gemini_session("/work/gem", "g1", day(2025, 11, 1));

    let transport = Arc::new(FakeTransport::new());
    let app = open(&world, &transport);

    let mut everything = request(&[], Path::new("/elsewhere"));
    everything.all_workspaces = true;
    let before = app.resolve(&everything).unwrap();
    assert!(before.workspaces[0].display_path.to_string().starts_with("unresolved:"));
    assert!(app.resolve(&request(&["gem"], Path::new("/elsewhere"))).unwrap().sessions.is_empty());

    let here = app.resolve(&request(&[], Path::new("/work/gem"))).unwrap();
    assert_eq!(ids(&here), vec!["g1"]);
    assert_eq!(here.workspaces[0].display_path.to_string(), "/work/gem");

    // The binding is persisted for later runs.
    let reopened = open(&world, &transport);
    let later = reopened.resolve(&request(&["gem"], Path::new("/elsewhere"))).unwrap();
    assert_eq!(ids(&later), vec!["g1"]);
}

#[test]
fn test_subsystem_source_through_mount() {
    let world = TestWorld::new();
    let distro_home = world.distro_home("Ubuntu", "me");
    world.add_claude_session_in(&distro_home, "/home/me/proj", "wsl1", day(2025, 11, 1));
    world.write_config(&json!({
        "mounts": {"wsl_roots": [world.wsl_root()], "windows_users_root": null}
    }));

    let transport = Arc::new(FakeTransport::new());
    let app = open(&world, &transport);

    let mut req = request(&["proj"], world.cwd());
    req.source_flags.wsl = Some(Some("Ubuntu".to_string()));
    let resolution = app.resolve(&req).unwrap();
    assert_eq!(ids(&resolution), vec!["wsl1"]);
    assert_eq!(resolution.sessions[0].source(), &Source::subsystem("Ubuntu"));

    req.source_flags.wsl = Some(None);
    assert_eq!(ids(&app.resolve(&req).unwrap()), vec!["wsl1"]);

    req.source_flags.wsl = Some(Some("Debian".to_string()));
    assert!(matches!(
        app.resolve(&req),
        Err(Error::SourceUnavailable { .. })
    ));
}
