//! Client construction and shared state
//!
//! - `base`: [`BaseClient`], URL building, command lookup and reachability
//! - `builder`: [`ClientBuilder`] fluent construction
//! - `handle`: [`ClientHandle`], the state shared with bound commands

mod base;
mod builder;
mod handle;

pub use base::BaseClient;
pub use builder::ClientBuilder;
pub use handle::ClientHandle;
