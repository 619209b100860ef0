mod error;
pub mod layout;
pub mod migrate;
pub mod path;

pub use error::{Error, Result};
pub use layout::StateLayout;
pub use migrate::{MigrationReport, migrate_legacy_root};
pub use path::{expand_tilde, home_dir, legacy_root, resolve_config_root};
