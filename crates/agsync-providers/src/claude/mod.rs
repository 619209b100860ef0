mod io;
mod schema;

pub use io::{parse_claude_transcript, probe_claude_file, read_claude_cwd};
