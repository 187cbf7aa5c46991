use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The closed set of light client schemes a state can be resolved for.
///
/// Adding a scheme means adding a variant here; every `match` over
/// `ClientScheme` then fails to compile until the new scheme is handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClientScheme {
    /// Hyperledger Besu IBFT 2.0: header, storage proof and commit seals.
    #[serde(rename = "hyperledger-besu-ibft2")]
    BesuIbft2,
    /// Mock client: header and a placeholder proof, no consensus checks.
    #[serde(rename = "mock-client")]
    Mock,
}

impl ClientScheme {
    /// Every supported scheme.
    pub const ALL: [ClientScheme; 2] = [ClientScheme::BesuIbft2, ClientScheme::Mock];

    /// The configuration identifier of this scheme.
    pub fn id(&self) -> &'static str {
        match self {
            ClientScheme::BesuIbft2 => "hyperledger-besu-ibft2",
            ClientScheme::Mock => "mock-client",
        }
    }

    /// Whether states of this scheme carry authenticated consensus material.
    pub fn authenticates_consensus(&self) -> bool {
        match self {
            ClientScheme::BesuIbft2 => true,
            ClientScheme::Mock => false,
        }
    }
}

impl fmt::Display for ClientScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// An identifier that names no supported scheme.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown client scheme '{id}' (supported: hyperledger-besu-ibft2, mock-client)")]
pub struct UnknownSchemeError {
    pub id: String,
}

impl FromStr for ClientScheme {
    type Err = UnknownSchemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClientScheme::ALL
            .into_iter()
            .find(|scheme| scheme.id() == s)
            .ok_or_else(|| UnknownSchemeError { id: s.to_string() })
    }
}
