pub mod agent;
pub mod scope;
pub mod session;
pub mod source;
pub mod workspace;

pub use agent::*;
pub use scope::*;
pub use session::*;
pub use source::*;
pub use workspace::*;
