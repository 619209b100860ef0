use agsync_types::{DateRange, ScopeRequest, SourceFlags, SourceKind};
use anyhow::Result;
use clap::Args;

use crate::types::AgentSelector;

/// Which sessions a command works on.
#[derive(Debug, Clone, Default, Args)]
pub struct ScopeArgs {
    /// Workspace substrings or @alias (default: the current directory)
    pub patterns: Vec<String>,

    /// All hosts: local, detected mounts and saved remotes
    #[arg(long = "ah")]
    pub all_hosts: bool,

    /// All workspaces
    #[arg(long = "aw", conflicts_with_all = ["patterns", "this"])]
    pub all_workspaces: bool,

    /// Only the current workspace, even if an alias covers it
    #[arg(long, conflicts_with = "patterns")]
    pub this: bool,

    /// Add a remote host (repeatable)
    #[arg(short = 'r', long = "remote", value_name = "HOST")]
    pub remotes: Vec<String>,

    /// Add a Linux subsystem distro as --wsl=DISTRO (auto-detect when bare)
    #[arg(long, value_name = "DISTRO", num_args = 0..=1, require_equals = true)]
    pub wsl: Option<Option<String>>,

    /// Add a Windows user profile as --windows=USER (auto-detect when bare)
    #[arg(long, value_name = "USER", num_args = 0..=1, require_equals = true)]
    pub windows: Option<Option<String>>,

    #[arg(long)]
    pub no_local: bool,

    #[arg(long)]
    pub no_wsl: bool,

    #[arg(long)]
    pub no_windows: bool,

    #[arg(long)]
    pub no_remote: bool,

    /// Agent layouts to read
    #[arg(long, value_enum, default_value_t = AgentSelector::All)]
    pub agent: AgentSelector,

    /// Only sessions modified on or after this day (YYYY-MM-DD)
    #[arg(long)]
    pub since: Option<String>,

    /// Only sessions modified on or before this day (YYYY-MM-DD)
    #[arg(long)]
    pub until: Option<String>,
}

impl ScopeArgs {
    pub fn to_request(&self, force: bool) -> Result<ScopeRequest> {
        let mut exclude = Vec::new();
        for (flag, kind) in [
            (self.no_local, SourceKind::Local),
            (self.no_wsl, SourceKind::Subsystem),
            (self.no_windows, SourceKind::HostMount),
            (self.no_remote, SourceKind::Remote),
        ] {
            if flag {
                exclude.push(kind);
            }
        }

        Ok(ScopeRequest {
            workspace_patterns: self.patterns.clone(),
            source_flags: SourceFlags {
                all_hosts: self.all_hosts,
                wsl: self.wsl.clone(),
                windows: self.windows.clone(),
                remotes: self.remotes.clone(),
                exclude,
            },
            date_range: DateRange::parse(self.since.as_deref(), self.until.as_deref())?,
            force,
            this_only: self.this,
            all_workspaces: self.all_workspaces,
            agents: self.agent.agents(),
            current_dir: std::env::current_dir().ok(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agsync_types::AgentKind;
    use clap::Parser;

    #[derive(Debug, Parser)]
    struct Harness {
        #[command(flatten)]
        scope: ScopeArgs,
    }

    #[test]
    fn test_negations_map_to_kinds() {
        let args = ScopeArgs {
            all_hosts: true,
            no_local: true,
            no_remote: true,
            agent: AgentSelector::Claude,
            ..Default::default()
        };
        let request = args.to_request(false).unwrap();

        assert_eq!(
            request.source_flags.exclude,
            vec![SourceKind::Local, SourceKind::Remote]
        );
        assert_eq!(request.agents, vec![AgentKind::Claude]);
    }

    #[test]
    fn test_bad_date_is_rejected() {
        let args = ScopeArgs {
            since: Some("2025-13-01".into()),
            ..Default::default()
        };
        assert!(args.to_request(false).is_err());
    }

    #[test]
    fn test_bare_wsl_leaves_next_word_as_pattern() {
        let parsed = Harness::try_parse_from(["agsync", "--wsl", "myproject"]).unwrap();
        assert_eq!(parsed.scope.wsl, Some(None));
        assert_eq!(parsed.scope.patterns, vec!["myproject"]);

        let parsed = Harness::try_parse_from(["agsync", "--wsl=Ubuntu", "--windows", "myproject"]).unwrap();
        assert_eq!(parsed.scope.wsl, Some(Some("Ubuntu".to_string())));
        assert_eq!(parsed.scope.windows, Some(None));
        assert_eq!(parsed.scope.patterns, vec!["myproject"]);
    }

    #[test]
    fn test_agent_selector_is_validated_by_clap() {
        let parsed = Harness::try_parse_from(["agsync", "--agent", "gemini"]).unwrap();
        assert_eq!(parsed.scope.to_request(false).unwrap().agents, vec![AgentKind::Gemini]);

        let parsed = Harness::try_parse_from(["agsync"]).unwrap();
        assert_eq!(parsed.scope.agent, AgentSelector::All);
        assert_eq!(parsed.scope.to_request(false).unwrap().agents, AgentKind::ALL.to_vec());

        assert!(Harness::try_parse_from(["agsync", "--agent", "codex"]).is_err());
    }
}
