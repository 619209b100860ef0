use agsync_testing::{TestWorld, Turn, assertions, day};
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

fn world_with_two_projects() -> TestWorld {
    let world = TestWorld::new();
    world.add_claude_session("/work/proj", "s1", day(2025, 11, 14));
    world.add_claude_session("/work/proj", "s2", day(2025, 11, 15));
    world.add_claude_session("/work/other", "o1", day(2025, 11, 15));
    world
}

#[test]
fn test_export_writes_markdown_per_workspace() {
    // Given: two sessions in /work/proj and one elsewhere
    let world = world_with_two_projects();
    let out = world.temp_dir().join("out");
    let out_arg = out.to_string_lossy().to_string();

    // When: exporting the proj workspace
    let result = world
        .run(&["--format", "json", "export", "proj", "-o", &out_arg])
        .expect("Failed to run export");

    // Then: only matching sessions are written, under the workspace slug
    assert!(result.success(), "stderr: {}", result.stderr());
    let json = result.json().expect("Invalid JSON");
    assertions::assert_run_counts(&json, 2, 0, 0).unwrap();
    assert_eq!(json["matched"], 2);
    assert!(out.join("-work-proj/s1.md").exists());
    assert!(out.join("-work-proj/s2.md").exists());
    assert!(!out.join("-work-other").exists());
}

#[test]
fn test_export_twice_skips_unchanged_sessions() {
    let world = world_with_two_projects();
    let out = world.temp_dir().join("out");
    let out_arg = out.to_string_lossy().to_string();
    let args = ["--format", "json", "export", "proj", "-o", &out_arg];

    let first = world.run(&args).unwrap();
    assert!(first.success(), "stderr: {}", first.stderr());

    // When: running again without changes
    let second = world.run(&args).unwrap();

    // Then: nothing is rewritten
    let json = second.json().unwrap();
    assertions::assert_run_counts(&json, 0, 2, 0).unwrap();

    // And --force rewrites everything
    let forced = world
        .run(&["--format", "json", "export", "proj", "-o", &out_arg, "--force"])
        .unwrap();
    assertions::assert_run_counts(&forced.json().unwrap(), 2, 0, 0).unwrap();
}

#[test]
fn test_export_flat_and_minimal() {
    let world = TestWorld::new();
    world.add_claude_turns(
        "/work/proj",
        "s1",
        &[
            Turn::user("where is the config loaded?"),
            Turn::assistant("In config.rs.").with_tool("Read"),
        ],
        day(2025, 11, 15),
    );
    let out = world.temp_dir().join("flat");
    let out_arg = out.to_string_lossy().to_string();

    let result = world
        .run(&["export", "proj", "-o", &out_arg, "--flat", "--minimal", "-q"])
        .unwrap();
    assert!(result.success(), "stderr: {}", result.stderr());

    let entries: Vec<_> = std::fs::read_dir(&out)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(entries.len(), 1, "flat layout writes no subdirectories: {:?}", entries);

    let content = std::fs::read_to_string(out.join(&entries[0])).unwrap();
    assert!(content.contains("where is the config loaded?"));
    assert!(!content.contains("Read"), "minimal output drops tool calls:\n{}", content);
}

#[test]
fn test_export_plain_summary() {
    let world = world_with_two_projects();
    let out = world.temp_dir().join("out");

    let mut cmd = cargo_bin_cmd!("agsync");
    world
        .configure_command(&mut cmd)
        .arg("export")
        .arg("proj")
        .arg("-q")
        .arg("-o")
        .arg(&out);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Exported 2 sessions to"))
        .stdout(predicate::str::contains("(0 unchanged, 0 failed)"));
}

#[test]
fn test_inverted_date_range_fails_before_any_work() {
    let world = world_with_two_projects();
    let out = world.temp_dir().join("out");

    let mut cmd = cargo_bin_cmd!("agsync");
    world
        .configure_command(&mut cmd)
        .args(["export", "--aw", "--since", "2025-11-20", "--until", "2025-11-01", "-o"])
        .arg(&out);

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
    assert!(!out.exists());
}

#[test]
fn test_malformed_date_is_rejected() {
    let world = world_with_two_projects();

    let result = world.run(&["list", "--aw", "--since", "2025/11/01"]).unwrap();

    assert_eq!(result.code(), Some(1));
    assert!(result.stderr().contains("Error:"), "stderr: {}", result.stderr());
}

#[test]
fn test_unknown_strict_remote_fails() {
    // A single explicit remote is strict: its failure is fatal.
    let world = world_with_two_projects();

    let result = world
        .run(&["list", "--aw", "--no-local", "-r", "agsync-test.invalid"])
        .unwrap();

    assert_eq!(result.code(), Some(1), "stdout: {}", result.stdout());
    assert!(result.stderr().contains("agsync-test.invalid"), "stderr: {}", result.stderr());
}

#[test]
fn test_help_mentions_scope_flags() {
    let mut cmd = cargo_bin_cmd!("agsync");
    cmd.args(["export", "--help"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--ah"))
        .stdout(predicate::str::contains("--aw"))
        .stdout(predicate::str::contains("--wsl"))
        .stdout(predicate::str::contains("--force"));
}
