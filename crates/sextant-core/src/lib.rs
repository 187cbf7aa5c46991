//! # Sextant Core
//!
//! Data model and pure consensus logic for resolving light client states.
//!
//! This crate contains **no networking code** and **no async**. It knows
//! what a light client state looks like for each supported scheme, how to
//! decompose an IBFT 2.0 header, and how to extract commit seals from it.
//! Fetching blocks and proofs is the job of `sextant-resolver`.
//!
//! ## What is checked here
//!
//! - **Header layout** (`consensus::ibft2`): the extra data must decode as
//!   `RLP([vanity, validators, vote, round, seals])`.
//! - **Commit seals** (`consensus::seals`): each seal must be a well-formed
//!   65-byte signature and enough validators must have signed.
//!
//! Storage proofs are packaged, never verified against a state root. Seal
//! signers are not recovered. Both are left to the on-chain light client.

pub mod consensus;
pub mod scheme;
pub mod state;
pub mod types;

pub use consensus::{
    ibft2::{parse_ibft2_header, HeaderError, HeaderParser, Ibft2HeaderParser, ParsedHeader, Vote},
    seals::{CommitSeal, QuorumRule, QuorumSealValidator, SealError, SealValidator},
};
pub use scheme::{ClientScheme, UnknownSchemeError};
pub use state::{CommitteeState, LightClientState, SimpleState};
pub use types::{block::*, proof::*};
