//! Engine service implementations

pub mod adapters;
pub mod config_store;
pub mod env_source;
pub mod health;
pub mod registry;

#[cfg(test)]
pub mod tests;

pub use adapters::*;
pub use config_store::*;
pub use env_source::*;
pub use health::*;
