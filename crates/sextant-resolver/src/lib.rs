//! # sextant-resolver
//!
//! Async light client state resolution for relayer test tooling.
//!
//! [`StateResolver`] takes a client scheme identifier, a contract address,
//! storage keys and a block height, and assembles the state an on-chain
//! light client of that scheme needs to verify the contract's storage.
//! The chain is reached through a [`ProofSource`]; which header parser and
//! seal validator run is decided by the [`StrategyTable`].

pub mod config;
pub mod deadline;
pub mod error;
pub mod resolver;
pub mod source;
pub mod strategy;
pub mod table;

#[cfg(test)]
mod testing;

pub use config::ResolverConfig;
pub use deadline::Deadline;
pub use error::{ConfigError, ErrorKind, ResolveError, Stage};
pub use resolver::{BoundResolver, StateResolver};
pub use source::{ProofSource, SourceError};
pub use strategy::{CommitteeStrategy, ResolveStrategy, SimpleStrategy, StateRequest};
pub use table::{default_strategy, StrategyTable, StrategyTableBuilder};
