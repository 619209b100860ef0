//! Testing infrastructure for agsync integration tests.
//!
//! - `TestWorld`: isolated HOME, data dir and working directory
//! - `fixtures`: Claude and Gemini session files with controlled mtimes
//! - `transport`: an in-process stand-in for SSH hosts
//! - `assertions`: checks over the CLI's JSON output

pub mod assertions;
pub mod fixtures;
pub mod transport;
pub mod world;

pub use fixtures::{Turn, day};
pub use transport::FakeTransport;
pub use world::{CliResult, TestWorld};
