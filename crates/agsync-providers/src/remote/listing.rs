use agsync_types::AgentKind;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::layout;

/// One file reported by the remote `find`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    /// Path relative to the agent root, `/`-separated
    pub rel_path: String,
    pub mtime: DateTime<Utc>,
    pub size: u64,
}

impl RemoteEntry {
    pub fn workspace_name(&self) -> &str {
        self.rel_path.split('/').next().unwrap_or_default()
    }

    pub fn file_name(&self) -> &str {
        self.rel_path.rsplit('/').next().unwrap_or_default()
    }

    /// Whether the entry sits where the agent keeps session files.
    pub fn is_session(&self, agent: AgentKind) -> bool {
        let parts: Vec<&str> = self.rel_path.split('/').collect();
        let shape_ok = match (agent, parts.as_slice()) {
            (AgentKind::Claude, [_, _]) => true,
            (AgentKind::Gemini, [_, sub, _]) => Some(*sub) == layout::sessions_subdir(agent),
            _ => false,
        };
        shape_ok
            && layout::is_workspace_dir(agent, self.workspace_name())
            && layout::is_session_file(agent, self.file_name())
    }
}

/// Marker opening a `#cwd<TAB>dir<TAB>"cwd":"..."` line.
pub const CWD_MARKER: &str = "#cwd";

/// Parsed output of [`listing_command`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteListing {
    pub entries: Vec<RemoteEntry>,
    /// Claude project dir name to the `cwd` recorded in its first session file
    pub project_roots: HashMap<String, String>,
}

/// Shell command listing an agent's session files as `relpath<TAB>mtime<TAB>size`.
///
/// For Claude it also prints one `#cwd` line per project dir carrying the
/// `"cwd"` field of the first session file, since dir names lose `-`, `_`
/// and `.`. A missing root prints nothing and still exits 0, so only
/// transport failures surface as errors.
pub fn listing_command(agent: AgentKind) -> String {
    let root = agent.home_relative_root();
    let filter = match agent {
        AgentKind::Claude => "-mindepth 2 -maxdepth 2 -type f -name '*.jsonl'",
        AgentKind::Gemini => "-mindepth 3 -maxdepth 3 -type f -path '*/chats/session-*.json'",
    };
    let find = format!(
        "find \"$HOME/{}\" {} -printf '%P\\t%T@\\t%s\\n' 2>/dev/null",
        root, filter
    );
    match agent {
        AgentKind::Claude => format!(
            "{}; for d in \"$HOME/{}\"/*/; do \
             f=$(ls \"$d\" 2>/dev/null | grep '\\.jsonl$' | head -n 1); \
             [ -n \"$f\" ] && printf '{}\\t%s\\t%s\\n' \"$(basename \"$d\")\" \
             \"$(head -n 10 \"$d$f\" | grep -m1 -o '\"cwd\":\"[^\"]*\"')\"; \
             done 2>/dev/null; true",
            find, root, CWD_MARKER
        ),
        AgentKind::Gemini => format!("{}; true", find),
    }
}

pub fn parse_listing(output: &str) -> RemoteListing {
    let mut listing = RemoteListing::default();
    for line in output.lines().filter(|line| !line.trim().is_empty()) {
        if let Some(rest) = line
            .strip_prefix(CWD_MARKER)
            .and_then(|rest| rest.strip_prefix('\t'))
        {
            if let Some((dir, cwd)) = parse_cwd_line(rest) {
                listing.project_roots.insert(dir, cwd);
            }
            continue;
        }
        match parse_line(line) {
            Some(entry) => listing.entries.push(entry),
            None => tracing::debug!(line, "ignoring malformed listing line"),
        }
    }
    listing
}

/// `dir<TAB>"cwd":"/path"`; the fragment is decoded as JSON so escapes survive.
fn parse_cwd_line(rest: &str) -> Option<(String, String)> {
    let (dir, fragment) = rest.split_once('\t')?;
    let fragment = fragment.trim();
    if dir.is_empty() || fragment.is_empty() {
        return None;
    }
    let mut object: HashMap<String, String> =
        serde_json::from_str(&format!("{{{}}}", fragment)).ok()?;
    let cwd = object.remove("cwd").filter(|cwd| !cwd.is_empty())?;
    Some((dir.to_string(), cwd))
}

fn parse_line(line: &str) -> Option<RemoteEntry> {
    let mut fields = line.rsplitn(3, '\t');
    let size = fields.next()?.trim().parse().ok()?;
    let mtime = parse_epoch(fields.next()?.trim())?;
    let rel_path = fields.next()?.to_string();
    if rel_path.is_empty() {
        return None;
    }
    Some(RemoteEntry {
        rel_path,
        mtime,
        size,
    })
}

fn parse_epoch(s: &str) -> Option<DateTime<Utc>> {
    let (secs, frac) = s.split_once('.').unwrap_or((s, "0"));
    let secs: i64 = secs.parse().ok()?;
    let digits: String = frac.chars().take(9).collect();
    let nanos: u32 = format!("{:0<9}", digits).parse().ok()?;
    DateTime::from_timestamp(secs, nanos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_listing() {
        let output = "-home-me-proj/a.jsonl\t1762000000.5000000000\t120\n\
                      garbage line\n\
                      -home-me-proj/b.jsonl\t1762000100\t7\n";
        let entries = parse_listing(output).entries;

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].workspace_name(), "-home-me-proj");
        assert_eq!(entries[0].file_name(), "a.jsonl");
        assert_eq!(entries[0].size, 120);
        assert_eq!(entries[0].mtime.timestamp(), 1_762_000_000);
        assert_eq!(entries[0].mtime.timestamp_subsec_millis(), 500);
    }

    #[test]
    fn test_entry_shape_per_agent() {
        let at = DateTime::from_timestamp(0, 0).unwrap();
        let claude = RemoteEntry {
            rel_path: "-home-me-proj/a.jsonl".into(),
            mtime: at,
            size: 1,
        };
        let cached = RemoteEntry {
            rel_path: "remote_vm02_-home-me-proj/a.jsonl".into(),
            mtime: at,
            size: 1,
        };
        let gemini = RemoteEntry {
            rel_path: format!("{}/chats/session-1.json", "b".repeat(64)),
            mtime: at,
            size: 1,
        };

        assert!(claude.is_session(AgentKind::Claude));
        assert!(!cached.is_session(AgentKind::Claude));
        assert!(gemini.is_session(AgentKind::Gemini));
        assert!(!gemini.is_session(AgentKind::Claude));
    }

    #[test]
    fn test_parse_listing_keeps_project_roots() {
        let output = "-work-agent-history/a.jsonl\t1762000000\t10\n\
                      #cwd\t-work-agent-history\t\"cwd\":\"/work/agent-history\"\n\
                      #cwd\t-C-src-my-app\t\"cwd\":\"C:\\\\src\\\\my_app\"\n\
                      #cwd\t-work-empty\t\n";
        let listing = parse_listing(output);

        assert_eq!(listing.entries.len(), 1);
        assert_eq!(listing.project_roots.len(), 2);
        assert_eq!(
            listing.project_roots.get("-work-agent-history").map(String::as_str),
            Some("/work/agent-history")
        );
        assert_eq!(
            listing.project_roots.get("-C-src-my-app").map(String::as_str),
            Some("C:\\src\\my_app")
        );
    }

    #[test]
    fn test_listing_command_targets_agent_root() {
        let cmd = listing_command(AgentKind::Gemini);
        assert!(cmd.contains("$HOME/.gemini/tmp"));
        assert!(cmd.ends_with("; true"));
        assert!(!cmd.contains(CWD_MARKER));

        let cmd = listing_command(AgentKind::Claude);
        assert!(cmd.contains("$HOME/.claude/projects"));
        assert!(cmd.contains(CWD_MARKER));
        assert!(cmd.ends_with("; true"));
    }
}
