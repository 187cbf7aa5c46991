//! In-memory collaborators for resolver tests.

use crate::source::{ProofSource, SourceError};
use alloy_primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use sextant_core::consensus::ibft2::fixtures;
use sextant_core::{
    Block, BlockNumber, CommitSeal, HeaderError, HeaderParser, Ibft2HeaderParser, ParsedHeader,
    QuorumSealValidator, SealError, SealValidator, StateProof, StorageProof,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const CONTRACT: Address = Address::new([0xCC; 20]);

/// `count` distinct 32-byte storage keys.
pub fn keys(count: usize) -> Vec<Bytes> {
    (0..count)
        .map(|i| Bytes::from(B256::with_last_byte(i as u8 + 1).to_vec()))
        .collect()
}

/// A chain held in memory that counts every call made to it.
#[derive(Default)]
pub struct FakeChain {
    blocks: BTreeMap<u64, Block>,
    fail_proofs: bool,
    drop_last_proof: bool,
    block_delay: Option<Duration>,
    pub block_calls: AtomicUsize,
    pub proof_calls: AtomicUsize,
    proof_numbers: Mutex<Vec<u64>>,
}

impl FakeChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an IBFT 2.0 block with `validators` validators, `signed` of which sealed it.
    pub fn with_block(mut self, number: u64, validators: usize, signed: usize) -> Self {
        let header = fixtures::header(number, validators, signed);
        self.blocks.insert(number, Block { header });
        self
    }

    /// Serve block `actual` when asked for `requested`.
    pub fn with_mislabeled_block(mut self, requested: u64, actual: u64) -> Self {
        let header = fixtures::header(actual, 4, 3);
        self.blocks.insert(requested, Block { header });
        self
    }

    /// Add a block whose extra data is exactly `extra`.
    pub fn with_raw_extra(mut self, number: u64, extra: Vec<u8>) -> Self {
        let mut header = fixtures::header(number, 0, 0);
        header.extra_data = Bytes::from(extra);
        self.blocks.insert(number, Block { header });
        self
    }

    pub fn failing_proofs(mut self) -> Self {
        self.fail_proofs = true;
        self
    }

    /// Return one storage proof fewer than requested.
    pub fn dropping_last_proof(mut self) -> Self {
        self.drop_last_proof = true;
        self
    }

    pub fn with_block_delay(mut self, delay: Duration) -> Self {
        self.block_delay = Some(delay);
        self
    }

    pub fn total_calls(&self) -> usize {
        self.block_calls.load(Ordering::SeqCst) + self.proof_calls.load(Ordering::SeqCst)
    }

    /// Block numbers storage proofs were requested at, in call order.
    pub fn proof_numbers(&self) -> Vec<u64> {
        self.proof_numbers
            .lock()
            .map(|n| n.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ProofSource for FakeChain {
    async fn block_by_number(&self, height: BlockNumber) -> Result<Block, SourceError> {
        self.block_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.block_delay {
            tokio::time::sleep(delay).await;
        }
        let block = match height {
            BlockNumber::Latest => self.blocks.values().next_back(),
            BlockNumber::Number(n) => self.blocks.get(&n),
        };
        block
            .cloned()
            .ok_or(SourceError::BlockNotFound { height })
    }

    async fn storage_proof(
        &self,
        address: Address,
        keys: &[Bytes],
        number: u64,
    ) -> Result<StateProof, SourceError> {
        self.proof_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut numbers) = self.proof_numbers.lock() {
            numbers.push(number);
        }
        if self.fail_proofs {
            return Err(SourceError::Rpc {
                code: -32000,
                message: "missing trie node".to_string(),
            });
        }

        let mut storage_proofs: Vec<StorageProof> = keys
            .iter()
            .enumerate()
            .map(|(i, key)| StorageProof {
                key: key.clone(),
                value: B256::with_last_byte(i as u8),
                proof: vec![Bytes::from(vec![0xe2, 0xa0, number as u8, i as u8])],
            })
            .collect();
        if self.drop_last_proof {
            storage_proofs.pop();
        }

        Ok(StateProof {
            address,
            account_proof: vec![Bytes::from(vec![0xf8, number as u8])],
            storage_proofs,
        })
    }
}

/// Header parser that counts calls before delegating to IBFT 2.0 parsing.
#[derive(Default)]
pub struct CountingParser {
    pub calls: Arc<AtomicUsize>,
}

impl HeaderParser for CountingParser {
    fn parse(&self, header: &sextant_core::BlockHeader) -> Result<ParsedHeader, HeaderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ibft2HeaderParser.parse(header)
    }
}

/// Seal validator that counts calls before delegating to the quorum check.
#[derive(Default)]
pub struct CountingValidator {
    pub calls: Arc<AtomicUsize>,
}

impl SealValidator for CountingValidator {
    fn validate(&self, parsed: &ParsedHeader) -> Result<Vec<CommitSeal>, SealError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        QuorumSealValidator::default().validate(parsed)
    }
}
