//! The light client state bundle handed to on-chain clients.
//!
//! Every variant exposes the same two accessors, `header()` and `proof()`.
//! Callers read those through [`LightClientState`] and never need to know
//! which consensus scheme produced the bundle. Scheme-specific material
//! (commit seals, the parsed consensus header) is reachable through
//! optional accessors that return `None` for schemes that do not carry it.

use crate::consensus::ibft2::ParsedHeader;
use crate::consensus::seals::CommitSeal;
use crate::types::block::BlockHeader;
use crate::types::proof::StateProof;
use serde::{Deserialize, Serialize};

/// State for schemes that do not authenticate consensus.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleState {
    pub header: BlockHeader,
    pub proof: StateProof,
}

/// State for committee-finalized (IBFT 2.0) chains.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitteeState {
    /// The header, decomposed into consensus fields. Owns the base header.
    pub parsed_header: ParsedHeader,
    pub proof: StateProof,
    /// Validated commit seals in header order.
    pub commit_seals: Vec<CommitSeal>,
}

/// A resolved light client state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LightClientState {
    Simple(SimpleState),
    Committee(CommitteeState),
}

impl LightClientState {
    /// The block header the proof was taken at.
    pub fn header(&self) -> &BlockHeader {
        match self {
            LightClientState::Simple(state) => &state.header,
            LightClientState::Committee(state) => &state.parsed_header.base,
        }
    }

    /// The storage proof, one element per requested key.
    pub fn proof(&self) -> &StateProof {
        match self {
            LightClientState::Simple(state) => &state.proof,
            LightClientState::Committee(state) => &state.proof,
        }
    }

    /// Commit seals, for schemes that finalize through a committee.
    pub fn commit_seals(&self) -> Option<&[CommitSeal]> {
        match self {
            LightClientState::Simple(_) => None,
            LightClientState::Committee(state) => Some(&state.commit_seals),
        }
    }

    /// The consensus decomposition of the header, if the scheme has one.
    pub fn parsed_header(&self) -> Option<&ParsedHeader> {
        match self {
            LightClientState::Simple(_) => None,
            LightClientState::Committee(state) => Some(&state.parsed_header),
        }
    }

    /// Consume the state, returning the owned header and proof.
    pub fn into_parts(self) -> (BlockHeader, StateProof) {
        match self {
            LightClientState::Simple(state) => (state.header, state.proof),
            LightClientState::Committee(state) => (state.parsed_header.base, state.proof),
        }
    }
}

impl From<SimpleState> for LightClientState {
    fn from(state: SimpleState) -> Self {
        LightClientState::Simple(state)
    }
}

impl From<CommitteeState> for LightClientState {
    fn from(state: CommitteeState) -> Self {
        LightClientState::Committee(state)
    }
}
