pub mod config;
pub mod error;
pub mod events;
pub mod experiment;
pub mod handover;
pub mod metrics;
pub mod mobility;
pub mod sim;
pub mod stack;
pub mod topo;
pub mod traffic;

pub use error::{ConfigError, Error, Result, StackError};

#[cfg(test)]
mod test;
