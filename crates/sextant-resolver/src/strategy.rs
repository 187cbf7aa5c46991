//! Per-scheme resolution strategies.
//!
//! Each strategy turns a request into a [`LightClientState`] using a
//! [`ProofSource`]. Steps run strictly in order and the first failure
//! aborts the call; no strategy ever returns a partially built state.

use crate::deadline::Deadline;
use crate::error::{ResolveError, Stage};
use crate::source::{ProofSource, SourceError};
use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;
use sextant_core::{
    Block, BlockNumber, ClientScheme, CommitteeState, HeaderParser, Ibft2HeaderParser,
    LightClientState, QuorumSealValidator, SealValidator, SimpleState, StateProof,
};
use tracing::debug;

/// The arguments of one resolve call.
#[derive(Clone, Copy, Debug)]
pub struct StateRequest<'a> {
    pub address: Address,
    pub storage_keys: &'a [Bytes],
    pub height: BlockNumber,
}

/// Produces a light client state for one scheme.
#[async_trait]
pub trait ResolveStrategy: Send + Sync {
    /// The scheme this strategy resolves.
    fn scheme(&self) -> ClientScheme;

    async fn resolve(
        &self,
        source: &dyn ProofSource,
        request: &StateRequest<'_>,
        deadline: &Deadline,
    ) -> Result<LightClientState, ResolveError>;
}

/// Fetch the block at the requested height. Errors are not retried.
/// A concrete height must come back as that exact block.
async fn fetch_block(
    source: &dyn ProofSource,
    height: BlockNumber,
    deadline: &Deadline,
) -> Result<Block, ResolveError> {
    let block = deadline
        .run(Stage::BlockRetrieval, source.block_by_number(height))
        .await?
        .map_err(|source| ResolveError::Retrieval { height, source })?;

    match height.as_number() {
        Some(requested) if requested != block.number() => Err(ResolveError::Retrieval {
            height,
            source: SourceError::InvalidResponse {
                reason: format!("asked for block {}, got block {}", requested, block.number()),
            },
        }),
        _ => Ok(block),
    }
}

/// Fetch the storage proof at a concrete block number and check its shape.
async fn fetch_proof(
    source: &dyn ProofSource,
    request: &StateRequest<'_>,
    number: u64,
    deadline: &Deadline,
) -> Result<StateProof, ResolveError> {
    let proof = deadline
        .run(
            Stage::StorageProof,
            source.storage_proof(request.address, request.storage_keys, number),
        )
        .await?
        .map_err(|source| ResolveError::Proof { number, source })?;

    if proof.len() != request.storage_keys.len() {
        return Err(ResolveError::ProofShape {
            number,
            expected: request.storage_keys.len(),
            got: proof.len(),
        });
    }
    Ok(proof)
}

/// Committee-finalized chains (IBFT 2.0): header, real storage proof, commit seals.
pub struct CommitteeStrategy<P = Ibft2HeaderParser, V = QuorumSealValidator> {
    parser: P,
    validator: V,
}

impl<P, V> CommitteeStrategy<P, V> {
    pub fn new(parser: P, validator: V) -> Self {
        Self { parser, validator }
    }
}

impl Default for CommitteeStrategy {
    fn default() -> Self {
        Self::new(Ibft2HeaderParser, QuorumSealValidator::default())
    }
}

#[async_trait]
impl<P: HeaderParser, V: SealValidator> ResolveStrategy for CommitteeStrategy<P, V> {
    fn scheme(&self) -> ClientScheme {
        ClientScheme::BesuIbft2
    }

    async fn resolve(
        &self,
        source: &dyn ProofSource,
        request: &StateRequest<'_>,
        deadline: &Deadline,
    ) -> Result<LightClientState, ResolveError> {
        // 1. The block pins `latest` to a concrete number
        let block = fetch_block(source, request.height, deadline).await?;
        let number = block.number();

        // 2. Proof at that number, never at the symbolic height
        let proof = fetch_proof(source, request, number, deadline).await?;

        // 3. Decompose the header
        let parsed_header = self
            .parser
            .parse(&block.header)
            .map_err(|source| ResolveError::MalformedHeader { number, source })?;

        // 4. Seals, only from a header that parsed
        let commit_seals = self
            .validator
            .validate(&parsed_header)
            .map_err(|source| ResolveError::SealValidation { number, source })?;

        debug!(
            number,
            validators = parsed_header.validator_count(),
            seals = commit_seals.len(),
            "committee state assembled"
        );

        Ok(CommitteeState {
            parsed_header,
            proof,
            commit_seals,
        }
        .into())
    }
}

/// Schemes that do not authenticate consensus: header plus a placeholder proof.
///
/// The proof has one element per key and no trie nodes, so it is only
/// useful against an on-chain client that does not check proofs.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimpleStrategy;

#[async_trait]
impl ResolveStrategy for SimpleStrategy {
    fn scheme(&self) -> ClientScheme {
        ClientScheme::Mock
    }

    async fn resolve(
        &self,
        source: &dyn ProofSource,
        request: &StateRequest<'_>,
        deadline: &Deadline,
    ) -> Result<LightClientState, ResolveError> {
        let block = fetch_block(source, request.height, deadline).await?;
        let proof = StateProof::placeholder(request.address, request.storage_keys);

        Ok(SimpleState {
            header: block.header,
            proof,
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::testing::{keys, CountingParser, CountingValidator, FakeChain, CONTRACT};
    use sextant_core::HeaderError;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn test_committee_strategy_happy_path() {
        let chain = FakeChain::new().with_block(100, 7, 5);
        let keys = keys(2);
        let request = StateRequest {
            address: CONTRACT,
            storage_keys: &keys,
            height: BlockNumber::Number(100),
        };

        let state = CommitteeStrategy::default()
            .resolve(&chain, &request, &Deadline::none())
            .await
            .unwrap();

        assert_eq!(state.header().number, 100);
        assert_eq!(state.proof().len(), 2);
        assert_eq!(state.commit_seals().map(<[_]>::len), Some(5));
        assert_eq!(chain.proof_numbers(), vec![100]);
    }

    #[tokio::test]
    async fn test_committee_strategy_pins_latest() {
        let chain = FakeChain::new().with_block(41, 4, 3).with_block(42, 4, 3);
        let keys = keys(1);
        let request = StateRequest {
            address: CONTRACT,
            storage_keys: &keys,
            height: BlockNumber::Latest,
        };

        let state = CommitteeStrategy::default()
            .resolve(&chain, &request, &Deadline::none())
            .await
            .unwrap();

        assert_eq!(state.header().number, 42);
        assert_eq!(chain.proof_numbers(), vec![42]);
    }

    #[tokio::test]
    async fn test_failed_parse_skips_seal_validation() {
        let chain = FakeChain::new().with_raw_extra(100, vec![0x83, 1, 2, 3]);
        let parser = CountingParser::default();
        let validator = CountingValidator::default();
        let parse_calls = parser.calls.clone();
        let validate_calls = validator.calls.clone();
        let keys = keys(2);
        let request = StateRequest {
            address: CONTRACT,
            storage_keys: &keys,
            height: BlockNumber::Number(100),
        };

        let err = CommitteeStrategy::new(parser, validator)
            .resolve(&chain, &request, &Deadline::none())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ResolveError::MalformedHeader {
                number: 100,
                source: HeaderError::NotAList
            }
        ));
        assert_eq!(parse_calls.load(Ordering::SeqCst), 1);
        assert_eq!(validate_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_proof_failure_stops_before_parsing() {
        let chain = FakeChain::new().with_block(100, 7, 5).failing_proofs();
        let parser = CountingParser::default();
        let parse_calls = parser.calls.clone();
        let keys = keys(1);
        let request = StateRequest {
            address: CONTRACT,
            storage_keys: &keys,
            height: BlockNumber::Number(100),
        };

        let err = CommitteeStrategy::new(parser, CountingValidator::default())
            .resolve(&chain, &request, &Deadline::none())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Proof);
        assert_eq!(parse_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_short_proof_is_rejected() {
        let chain = FakeChain::new().with_block(100, 7, 5).dropping_last_proof();
        let keys = keys(3);
        let request = StateRequest {
            address: CONTRACT,
            storage_keys: &keys,
            height: BlockNumber::Number(100),
        };

        let err = CommitteeStrategy::default()
            .resolve(&chain, &request, &Deadline::none())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ResolveError::ProofShape {
                number: 100,
                expected: 3,
                got: 2
            }
        ));
    }

    #[tokio::test]
    async fn test_simple_strategy_never_fetches_proof() {
        let chain = FakeChain::new().with_block(7, 0, 0);
        let keys = keys(3);
        let request = StateRequest {
            address: CONTRACT,
            storage_keys: &keys,
            height: BlockNumber::Number(7),
        };

        let state = SimpleStrategy
            .resolve(&chain, &request, &Deadline::none())
            .await
            .unwrap();

        assert_eq!(state.proof().len(), 3);
        assert!(state.proof().storage_proofs.iter().all(|p| p.is_placeholder()));
        assert_eq!(state.proof().address, CONTRACT);
        assert!(state.commit_seals().is_none());
        assert_eq!(chain.proof_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_wrong_block_from_source_is_rejected() {
        let chain = FakeChain::new().with_mislabeled_block(100, 101);
        let keys = keys(1);
        let request = StateRequest {
            address: CONTRACT,
            storage_keys: &keys,
            height: BlockNumber::Number(100),
        };

        for strategy in [
            Box::new(CommitteeStrategy::default()) as Box<dyn ResolveStrategy>,
            Box::new(SimpleStrategy),
        ] {
            let err = strategy
                .resolve(&chain, &request, &Deadline::none())
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                ResolveError::Retrieval {
                    height: BlockNumber::Number(100),
                    source: SourceError::InvalidResponse { .. }
                }
            ));
        }
        assert_eq!(chain.proof_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_simple_strategy_ignores_header_layout() {
        // Garbage extra data is fine when nobody parses it
        let chain = FakeChain::new().with_raw_extra(7, vec![0xde, 0xad]);
        let keys = keys(1);
        let request = StateRequest {
            address: CONTRACT,
            storage_keys: &keys,
            height: BlockNumber::Number(7),
        };

        let state = SimpleStrategy
            .resolve(&chain, &request, &Deadline::none())
            .await
            .unwrap();
        assert_eq!(state.header().number, 7);
    }
}
