mod io;
mod schema;

pub use io::{parse_gemini_transcript, probe_gemini_file};
