pub mod alias;
pub mod export;
pub mod list;
pub mod remote;
pub mod stats;
pub mod sync;
