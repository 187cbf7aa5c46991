//! The chain data collaborator.
//!
//! A [`ProofSource`] is anything that can hand back blocks and
//! eth_getProof-style storage proofs: a JSON-RPC client, a devnet harness,
//! a recorded fixture. It is untrusted; the resolver only packages what it
//! returns.

use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;
use sextant_core::{Block, BlockNumber, StateProof};
use std::sync::Arc;
use thiserror::Error;

/// Failures reported by a proof source. Surfaced to callers unchanged.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Block {height} not found")]
    BlockNotFound { height: BlockNumber },

    #[error("Source unreachable: {reason}")]
    Unreachable { reason: String },

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Invalid response from source: {reason}")]
    InvalidResponse { reason: String },
}

/// Where blocks and storage proofs come from.
///
/// Implementations may be called concurrently from independent resolve
/// calls. Dropping a returned future must abandon the request.
#[async_trait]
pub trait ProofSource: Send + Sync {
    /// Fetch the block at `height`. `Latest` resolves to the current head.
    async fn block_by_number(&self, height: BlockNumber) -> Result<Block, SourceError>;

    /// Fetch the account proof and one storage proof per key, at a concrete block.
    async fn storage_proof(
        &self,
        address: Address,
        keys: &[Bytes],
        number: u64,
    ) -> Result<StateProof, SourceError>;
}

#[async_trait]
impl<T: ProofSource + ?Sized> ProofSource for Arc<T> {
    async fn block_by_number(&self, height: BlockNumber) -> Result<Block, SourceError> {
        (**self).block_by_number(height).await
    }

    async fn storage_proof(
        &self,
        address: Address,
        keys: &[Bytes],
        number: u64,
    ) -> Result<StateProof, SourceError> {
        (**self).storage_proof(address, keys, number).await
    }
}
