use crate::source::SourceError;
use sextant_core::{BlockNumber, ClientScheme, HeaderError, SealError, UnknownSchemeError};
use std::fmt;
use thiserror::Error;

/// The collaborator call a deadline expired in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    BlockRetrieval,
    StorageProof,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::BlockRetrieval => write!(f, "block retrieval"),
            Stage::StorageProof => write!(f, "storage proof retrieval"),
        }
    }
}

/// Coarse classification of a [`ResolveError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The scheme is unknown or not enabled. Fix the configuration.
    Configuration,
    /// The block could not be fetched.
    Retrieval,
    /// The storage proof could not be fetched or had the wrong shape.
    Proof,
    /// The header does not have the layout the scheme expects.
    MalformedHeader,
    /// Commit seals are missing, malformed or below quorum.
    SealValidation,
    /// The call ran past its deadline.
    Cancelled,
}

impl ErrorKind {
    /// Whether calling again later with the same arguments may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, ErrorKind::Retrieval | ErrorKind::Proof)
    }
}

/// Everything that can abort a resolve call. No variant carries a partial state.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    UnknownScheme(#[from] UnknownSchemeError),

    #[error("Client scheme '{scheme}' is not enabled for this resolver")]
    SchemeNotRegistered { scheme: ClientScheme },

    #[error("Failed to fetch block at height {height}: {source}")]
    Retrieval {
        height: BlockNumber,
        #[source]
        source: SourceError,
    },

    #[error("Failed to fetch storage proof at block {number}: {source}")]
    Proof {
        number: u64,
        #[source]
        source: SourceError,
    },

    #[error("Storage proof at block {number} has {got} elements for {expected} keys")]
    ProofShape {
        number: u64,
        expected: usize,
        got: usize,
    },

    #[error("Malformed header at block {number}: {source}")]
    MalformedHeader {
        number: u64,
        #[source]
        source: HeaderError,
    },

    #[error("Commit seal validation failed at block {number}: {source}")]
    SealValidation {
        number: u64,
        #[source]
        source: SealError,
    },

    #[error("Deadline exceeded during {stage}")]
    DeadlineExceeded { stage: Stage },
}

impl ResolveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResolveError::UnknownScheme(_) | ResolveError::SchemeNotRegistered { .. } => {
                ErrorKind::Configuration
            }
            ResolveError::Retrieval { .. } => ErrorKind::Retrieval,
            ResolveError::Proof { .. } | ResolveError::ProofShape { .. } => ErrorKind::Proof,
            ResolveError::MalformedHeader { .. } => ErrorKind::MalformedHeader,
            ResolveError::SealValidation { .. } => ErrorKind::SealValidation,
            ResolveError::DeadlineExceeded { .. } => ErrorKind::Cancelled,
        }
    }

    pub fn is_transient(&self) -> bool {
        self.kind().is_transient()
    }
}

/// Errors building a resolver from configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid resolver configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    UnknownScheme(#[from] UnknownSchemeError),

    #[error("Client scheme '{scheme}' registered twice")]
    DuplicateScheme { scheme: ClientScheme },

    #[error("No client schemes enabled")]
    NoSchemes,

    #[error("Request timeout must be greater than zero")]
    ZeroTimeout,
}
