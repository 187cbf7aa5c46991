use crate::consensus::ibft2::ParsedHeader;
use alloy_primitives::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Length of a secp256k1 commit seal: r (32) || s (32) || v (1).
pub const COMMIT_SEAL_LEN: usize = 65;

/// A validator's signature over the block's commit hash.
/// Only the shape is checked here; the on-chain client recovers the signer.
pub type CommitSeal = Bytes;

/// Errors extracting commit seals from a parsed header.
#[derive(Debug, Error)]
pub enum SealError {
    #[error("Insufficient commit seals: {present}/{validators} validators signed (need at least {required})")]
    InsufficientQuorum {
        present: usize,
        validators: usize,
        required: usize,
    },

    #[error("Malformed commit seal at index {index}: {reason}")]
    MalformedSeal { index: usize, reason: String },

    #[error("Duplicate commit seal at index {index} (first seen at {first})")]
    DuplicateSeal { index: usize, first: usize },

    #[error("Header carries {seals} commit seals but only {validators} validators")]
    TooManySeals { seals: usize, validators: usize },

    #[error("Header has an empty validator set")]
    NoValidators,
}

/// How many of the validator set must have signed for a block to be final.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuorumRule {
    /// ceil(2n / 3), the IBFT 2.0 rule used by Besu.
    #[default]
    TwoThirds,
    /// Every validator must sign.
    All,
}

impl QuorumRule {
    /// Minimum number of seals required for `validators` validators.
    pub fn required(&self, validators: usize) -> usize {
        match self {
            QuorumRule::TwoThirds => (2 * validators).div_ceil(3),
            QuorumRule::All => validators,
        }
    }
}

/// Extracts commit seals from a parsed header, checking count and shape.
pub trait SealValidator: Send + Sync {
    fn validate(&self, parsed: &ParsedHeader) -> Result<Vec<CommitSeal>, SealError>;
}

/// Structural seal validator with a configurable quorum rule.
#[derive(Clone, Copy, Debug, Default)]
pub struct QuorumSealValidator {
    pub rule: QuorumRule,
}

impl QuorumSealValidator {
    pub fn new(rule: QuorumRule) -> Self {
        Self { rule }
    }
}

impl SealValidator for QuorumSealValidator {
    fn validate(&self, parsed: &ParsedHeader) -> Result<Vec<CommitSeal>, SealError> {
        let validators = parsed.validator_count();
        if validators == 0 {
            return Err(SealError::NoValidators);
        }

        let seals = &parsed.committed_seals;
        if seals.len() > validators {
            return Err(SealError::TooManySeals {
                seals: seals.len(),
                validators,
            });
        }

        for (index, seal) in seals.iter().enumerate() {
            check_seal_shape(index, seal)?;
            if let Some(first) = seals[..index].iter().position(|s| s == seal) {
                return Err(SealError::DuplicateSeal { index, first });
            }
        }

        let required = self.rule.required(validators);
        if seals.len() < required {
            return Err(SealError::InsufficientQuorum {
                present: seals.len(),
                validators,
                required,
            });
        }

        Ok(seals.clone())
    }
}

/// Check a seal is a plausible 65-byte recoverable secp256k1 signature.
fn check_seal_shape(index: usize, seal: &[u8]) -> Result<(), SealError> {
    if seal.len() != COMMIT_SEAL_LEN {
        return Err(SealError::MalformedSeal {
            index,
            reason: format!("expected {} bytes, got {}", COMMIT_SEAL_LEN, seal.len()),
        });
    }

    let (r, rest) = seal.split_at(32);
    let (s, v) = rest.split_at(32);
    if r.iter().all(|&b| b == 0) {
        return Err(SealError::MalformedSeal {
            index,
            reason: "r is zero".to_string(),
        });
    }
    if s.iter().all(|&b| b == 0) {
        return Err(SealError::MalformedSeal {
            index,
            reason: "s is zero".to_string(),
        });
    }
    match v[0] {
        0 | 1 | 27 | 28 => Ok(()),
        other => Err(SealError::MalformedSeal {
            index,
            reason: format!("invalid recovery id {}", other),
        }),
    }
}
