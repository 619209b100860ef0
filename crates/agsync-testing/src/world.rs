//! TestWorld pattern for declarative integration test setup.
//!
//! Every world owns a temp directory holding:
//! - `home/`: the HOME seen by the CLI (agent logs live here)
//! - `data/`: the agsync config root passed as `--data-dir`
//! - `remotes/<host>/`: homes served by [`FakeTransport`](crate::FakeTransport)
//! - `wsl/<distro>/home/<user>/`: a fake subsystem mount root

use anyhow::Result;
use assert_cmd::Command;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::fixtures::{self, Turn};

/// Declarative test environment builder.
///
/// # Example
/// ```no_run
/// use agsync_testing::{TestWorld, day};
///
/// let world = TestWorld::new();
/// world.add_claude_session("/work/proj", "s1", day(2025, 11, 15));
///
/// let result = world.run(&["list", "--aw"]).unwrap();
/// assert!(result.success());
/// ```
pub struct TestWorld {
    temp_dir: TempDir,
    home: PathBuf,
    data_dir: PathBuf,
    cwd: PathBuf,
    env_vars: HashMap<String, String>,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorld {
    /// Create a new isolated test environment.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let base = temp_dir.path().to_path_buf();
        let home = base.join("home");
        let data_dir = base.join("data");

        std::fs::create_dir_all(&home).expect("Failed to create home dir");
        std::fs::create_dir_all(&data_dir).expect("Failed to create data dir");

        Self {
            cwd: base,
            temp_dir,
            home,
            data_dir,
            env_vars: HashMap::new(),
        }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Home directory served for `host` by a `FakeTransport`.
    pub fn remote_home(&self, host: &str) -> PathBuf {
        self.temp_dir.path().join("remotes").join(host)
    }

    /// Root to use as a WSL mount convention (`<root>/<distro>/home/<user>`).
    pub fn wsl_root(&self) -> PathBuf {
        self.temp_dir.path().join("wsl")
    }

    pub fn distro_home(&self, distro: &str, user: &str) -> PathBuf {
        self.wsl_root().join(distro).join("home").join(user)
    }

    /// Change the working directory; relative paths are under the temp root.
    pub fn enter_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.set_cwd(path);
        self
    }

    pub fn set_cwd<P: AsRef<Path>>(&mut self, path: P) {
        let new_cwd = if path.as_ref().is_absolute() {
            path.as_ref().to_path_buf()
        } else {
            self.temp_dir.path().join(path)
        };

        std::fs::create_dir_all(&new_cwd).expect("Failed to create directory");
        self.cwd = new_cwd;
    }

    /// Set an environment variable for CLI execution.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.insert(key.into(), value.into());
        self
    }

    /// Write `config.json` into the data dir.
    pub fn write_config(&self, config: &serde_json::Value) {
        std::fs::write(
            self.data_dir.join("config.json"),
            serde_json::to_string_pretty(config).expect("Failed to serialize config"),
        )
        .expect("Failed to write config");
    }

    pub fn add_claude_session(&self, project_path: &str, session_id: &str, mtime: DateTime<Utc>) -> PathBuf {
        self.add_claude_session_in(&self.home, project_path, session_id, mtime)
    }

    pub fn add_claude_session_in(
        &self,
        home: &Path,
        project_path: &str,
        session_id: &str,
        mtime: DateTime<Utc>,
    ) -> PathBuf {
        fixtures::write_claude_session(home, project_path, session_id, &fixtures::default_turns(), mtime)
            .expect("Failed to write Claude session")
    }

    pub fn add_claude_turns(
        &self,
        project_path: &str,
        session_id: &str,
        turns: &[Turn],
        mtime: DateTime<Utc>,
    ) -> PathBuf {
        fixtures::write_claude_session(&self.home, project_path, session_id, turns, mtime)
            .expect("Failed to write Claude session")
    }

    pub fn add_gemini_session(&self, project_path: &str, session_id: &str, mtime: DateTime<Utc>) -> PathBuf {
        self.add_gemini_session_in(&self.home, project_path, session_id, mtime)
    }

    pub fn add_gemini_session_in(
        &self,
        home: &Path,
        project_path: &str,
        session_id: &str,
        mtime: DateTime<Utc>,
    ) -> PathBuf {
        fixtures::write_gemini_session(home, project_path, session_id, &fixtures::default_turns(), mtime)
            .expect("Failed to write Gemini session")
    }

    /// Configure a CLI command with this world's data dir, HOME and cwd.
    ///
    /// The caller provides the base command (e.g. from `cargo_bin_cmd!("agsync")`).
    pub fn configure_command<'a>(&self, cmd: &'a mut Command) -> &'a mut Command {
        cmd.arg("--data-dir").arg(self.data_dir());

        cmd.current_dir(&self.cwd)
            .env("HOME", &self.home)
            .env("USERPROFILE", &self.home)
            .env_remove("AGSYNC_PATH")
            .env_remove("RUST_LOG");

        for (key, value) in &self.env_vars {
            cmd.env(key, value);
        }

        cmd
    }

    /// Execute the agsync binary with `args` in this world.
    #[allow(deprecated)]
    pub fn run(&self, args: &[&str]) -> Result<CliResult> {
        let mut cmd = Command::cargo_bin("agsync")
            .map_err(|e| anyhow::anyhow!("Failed to find agsync binary: {}", e))?;

        self.configure_command(&mut cmd);
        cmd.args(args);

        let output = cmd.output()?;
        Ok(CliResult {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    /// Run in `dir` without changing the world's cwd.
    pub fn run_in_dir<P: AsRef<Path>>(&mut self, args: &[&str], dir: P) -> Result<CliResult> {
        let original_cwd = self.cwd.clone();
        self.set_cwd(dir);
        let result = self.run(args);
        self.cwd = original_cwd;
        result
    }
}

/// Result of a CLI command execution.
#[derive(Debug)]
pub struct CliResult {
    pub status: std::process::ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CliResult {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    pub fn code(&self) -> Option<i32> {
        self.status.code()
    }

    /// Parse stdout as JSON.
    pub fn json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_str(&self.stdout)?)
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }
}
