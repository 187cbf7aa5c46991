use alloy_primitives::{Bytes, B256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A block height as requested by the caller.
/// `Latest` is symbolic and must be pinned to a concrete number before any
/// follow-up query is made against the same chain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockNumber {
    /// The chain head at the time the block is fetched.
    #[default]
    Latest,
    /// A specific block number.
    Number(u64),
}

impl BlockNumber {
    /// The concrete number, if this is not the symbolic `Latest`.
    pub fn as_number(&self) -> Option<u64> {
        match self {
            BlockNumber::Latest => None,
            BlockNumber::Number(n) => Some(*n),
        }
    }
}

impl From<u64> for BlockNumber {
    fn from(number: u64) -> Self {
        BlockNumber::Number(number)
    }
}

impl From<Option<u64>> for BlockNumber {
    fn from(number: Option<u64>) -> Self {
        number.map_or(BlockNumber::Latest, BlockNumber::Number)
    }
}

impl fmt::Display for BlockNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockNumber::Latest => write!(f, "latest"),
            BlockNumber::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Error parsing a block number from text.
#[derive(Debug, Error)]
#[error("Invalid block number '{input}': expected 'latest', a decimal or a 0x-prefixed hex number")]
pub struct ParseBlockNumberError {
    pub input: String,
}

impl FromStr for BlockNumber {
    type Err = ParseBlockNumberError;

    /// Accepts `latest`, decimal (`100`) and JSON-RPC style hex (`0x64`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseBlockNumberError {
            input: s.to_string(),
        };
        if s.eq_ignore_ascii_case("latest") {
            return Ok(BlockNumber::Latest);
        }
        let number = match s.strip_prefix("0x") {
            Some(hex_digits) => u64::from_str_radix(hex_digits, 16).map_err(|_| err())?,
            None => s.parse::<u64>().map_err(|_| err())?,
        };
        Ok(BlockNumber::Number(number))
    }
}

/// An execution layer block header, as returned by the chain.
/// Only the fields needed to package a light client state are kept;
/// `extra_data` is opaque here and interpreted per consensus scheme.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Block number.
    pub number: u64,
    /// Hash of this block as reported by the chain.
    pub hash: B256,
    /// Hash of the parent block.
    pub parent_hash: B256,
    /// Root of the world state trie after this block.
    pub state_root: B256,
    /// Block timestamp (seconds since epoch).
    pub timestamp: u64,
    /// Consensus-specific metadata. For IBFT 2.0 this carries validators and seals.
    pub extra_data: Bytes,
}

/// A block fetched from a proof source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
}

impl Block {
    /// The concrete block number. Always resolved, even when the block was
    /// requested as `latest`.
    pub fn number(&self) -> u64 {
        self.header.number
    }
}
