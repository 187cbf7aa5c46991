use alloy_primitives::{Address, Bytes, B256};
use alloy_rlp::Encodable;
use serde::{Deserialize, Serialize};

/// A Merkle-Patricia trie proof for a single storage slot.
/// Obtained from an eth_getProof style query; never verified here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageProof {
    /// The storage key (slot) this proof is for, exactly as requested.
    pub key: Bytes,
    /// The storage value at this key, as claimed by the source.
    pub value: B256,
    /// RLP-encoded trie nodes forming the proof path.
    pub proof: Vec<Bytes>,
}

impl StorageProof {
    /// A structurally valid element with no cryptographic content.
    /// Used where consensus is not authenticated and nobody checks the proof.
    pub fn placeholder(key: Bytes) -> Self {
        Self {
            key,
            value: B256::ZERO,
            proof: Vec::new(),
        }
    }

    /// Whether this element carries any trie nodes at all.
    pub fn is_placeholder(&self) -> bool {
        self.proof.is_empty()
    }
}

/// Account proof plus one storage proof per requested key.
///
/// Invariant: `storage_proofs.len()` equals the number of keys requested,
/// and `storage_proofs[i]` corresponds to key `i`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateProof {
    /// The contract the proofs are for.
    pub address: Address,
    /// RLP-encoded trie nodes proving the account against the state root.
    pub account_proof: Vec<Bytes>,
    /// Storage proofs for requested slots, in request order.
    pub storage_proofs: Vec<StorageProof>,
}

impl StateProof {
    /// Build a proof with one placeholder element per key and no account proof.
    pub fn placeholder(address: Address, keys: &[Bytes]) -> Self {
        Self {
            address,
            account_proof: Vec::new(),
            storage_proofs: keys.iter().cloned().map(StorageProof::placeholder).collect(),
        }
    }

    /// Number of storage proof elements.
    pub fn len(&self) -> usize {
        self.storage_proofs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage_proofs.is_empty()
    }

    /// RLP list of the account proof nodes, as passed to an on-chain client.
    pub fn account_proof_rlp(&self) -> Vec<u8> {
        encode_proof_nodes(&self.account_proof)
    }

    /// RLP list of the proof nodes for the storage key at `index`.
    /// A placeholder element encodes as the empty list `0xc0`.
    pub fn storage_proof_rlp(&self, index: usize) -> Option<Vec<u8>> {
        self.storage_proofs
            .get(index)
            .map(|p| encode_proof_nodes(&p.proof))
    }
}

/// Encode trie nodes as an RLP list of byte strings.
fn encode_proof_nodes(nodes: &[Bytes]) -> Vec<u8> {
    let payload_length: usize = nodes.iter().map(|n| n[..].length()).sum();
    let mut out = Vec::with_capacity(payload_length + 9);
    alloy_rlp::Header {
        list: true,
        payload_length,
    }
    .encode(&mut out);
    for node in nodes {
        node[..].encode(&mut out);
    }
    out
}
