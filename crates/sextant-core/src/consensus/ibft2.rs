use crate::types::block::BlockHeader;
use alloy_primitives::{Address, Bytes, B256};
use alloy_rlp::Decodable;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Length of the vanity prefix in IBFT 2.0 extra data.
pub const EXTRA_VANITY_LENGTH: usize = 32;

/// Vote type byte for adding a validator.
pub const VOTE_TYPE_ADD: u8 = 0xFF;

/// Vote type byte for dropping a validator.
pub const VOTE_TYPE_DROP: u8 = 0x00;

/// Errors decomposing a header into IBFT 2.0 fields.
/// Any of these means the header layout does not match the scheme.
#[derive(Debug, Error)]
pub enum HeaderError {
    #[error("Empty extra data in header {number}")]
    EmptyExtraData { number: u64 },

    #[error("Invalid RLP in extra data field '{field}': {reason}")]
    InvalidRlp { field: &'static str, reason: String },

    #[error("Extra data must be an RLP list, got a byte string")]
    NotAList,

    #[error("Invalid vanity length: expected {EXTRA_VANITY_LENGTH} bytes, got {got}")]
    InvalidVanity { got: usize },

    #[error("Invalid vote: {reason}")]
    InvalidVote { reason: String },

    #[error("Round is {got} bytes, at most 4 allowed")]
    InvalidRound { got: usize },

    #[error("Extra data list has {extra} unexpected trailing bytes")]
    TrailingBytes { extra: usize },
}

/// A pending validator vote carried in an IBFT 2.0 header.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    /// The validator being voted on.
    pub recipient: Address,
    /// `true` to add the recipient, `false` to drop it.
    pub add: bool,
}

/// A block header decomposed into its IBFT 2.0 consensus fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedHeader {
    /// The header these fields were decoded from.
    pub base: BlockHeader,
    /// 32 bytes of proposer vanity.
    pub vanity: B256,
    /// The validator set that must commit this block.
    pub validators: Vec<Address>,
    /// Optional vote to change the validator set.
    pub vote: Option<Vote>,
    /// The consensus round in which the block was committed.
    pub round: u32,
    /// Raw committed seals, unvalidated.
    pub committed_seals: Vec<Bytes>,
}

impl ParsedHeader {
    pub fn validator_count(&self) -> usize {
        self.validators.len()
    }
}

/// Decomposes a raw header into scheme-specific consensus fields.
pub trait HeaderParser: Send + Sync {
    fn parse(&self, header: &BlockHeader) -> Result<ParsedHeader, HeaderError>;
}

/// Parser for Hyperledger Besu IBFT 2.0 headers.
///
/// extraData = RLP([vanity, [validators], vote, round, [seals]])
#[derive(Clone, Copy, Debug, Default)]
pub struct Ibft2HeaderParser;

impl HeaderParser for Ibft2HeaderParser {
    fn parse(&self, header: &BlockHeader) -> Result<ParsedHeader, HeaderError> {
        parse_ibft2_header(header)
    }
}

/// Decode the IBFT 2.0 fields of a header's extra data.
pub fn parse_ibft2_header(header: &BlockHeader) -> Result<ParsedHeader, HeaderError> {
    if header.extra_data.is_empty() {
        return Err(HeaderError::EmptyExtraData {
            number: header.number,
        });
    }

    let mut buf: &[u8] = &header.extra_data;
    let list = alloy_rlp::Header::decode(&mut buf).map_err(rlp_error("extra_data"))?;
    if !list.list {
        return Err(HeaderError::NotAList);
    }
    if buf.len() < list.payload_length {
        return Err(HeaderError::InvalidRlp {
            field: "extra_data",
            reason: format!(
                "list claims {} bytes, only {} available",
                list.payload_length,
                buf.len()
            ),
        });
    }
    if buf.len() > list.payload_length {
        return Err(HeaderError::TrailingBytes {
            extra: buf.len() - list.payload_length,
        });
    }

    // 1. Vanity
    let vanity = Bytes::decode(&mut buf).map_err(rlp_error("vanity"))?;
    if vanity.len() != EXTRA_VANITY_LENGTH {
        return Err(HeaderError::InvalidVanity { got: vanity.len() });
    }

    // 2. Validators
    let validators = Vec::<Address>::decode(&mut buf).map_err(rlp_error("validators"))?;

    // 3. Vote (empty string or empty list when absent)
    let vote = decode_vote(&mut buf)?;

    // 4. Round, fixed 4-byte or minimal big-endian
    let round_bytes = Bytes::decode(&mut buf).map_err(rlp_error("round"))?;
    if round_bytes.len() > 4 {
        return Err(HeaderError::InvalidRound {
            got: round_bytes.len(),
        });
    }
    let round = round_bytes
        .iter()
        .fold(0u32, |acc, &b| (acc << 8) | b as u32);

    // 5. Committed seals
    let committed_seals =
        Vec::<Bytes>::decode(&mut buf).map_err(rlp_error("committed_seals"))?;

    if !buf.is_empty() {
        return Err(HeaderError::TrailingBytes { extra: buf.len() });
    }

    Ok(ParsedHeader {
        base: header.clone(),
        vanity: B256::from_slice(&vanity),
        validators,
        vote,
        round,
        committed_seals,
    })
}

fn decode_vote(buf: &mut &[u8]) -> Result<Option<Vote>, HeaderError> {
    let mut peek = *buf;
    let vote_header = alloy_rlp::Header::decode(&mut peek).map_err(rlp_error("vote"))?;

    if vote_header.payload_length == 0 {
        *buf = peek;
        return Ok(None);
    }
    if !vote_header.list {
        return Err(HeaderError::InvalidVote {
            reason: format!(
                "expected a list or empty value, got a {}-byte string",
                vote_header.payload_length
            ),
        });
    }
    if peek.len() < vote_header.payload_length {
        return Err(HeaderError::InvalidVote {
            reason: "truncated vote list".to_string(),
        });
    }

    let (mut payload, rest) = peek.split_at(vote_header.payload_length);
    let recipient = Address::decode(&mut payload).map_err(rlp_error("vote.recipient"))?;
    // 0x00 is written raw by Besu, so decode as bytes rather than an integer.
    let vote_type = Bytes::decode(&mut payload).map_err(rlp_error("vote.type"))?;
    if !payload.is_empty() {
        return Err(HeaderError::InvalidVote {
            reason: format!("{} unexpected bytes after vote type", payload.len()),
        });
    }
    let add = match &vote_type[..] {
        [] | [VOTE_TYPE_DROP] => false,
        [VOTE_TYPE_ADD] => true,
        other => {
            return Err(HeaderError::InvalidVote {
                reason: format!("unknown vote type 0x{}", hex::encode(other)),
            })
        }
    };

    *buf = rest;
    Ok(Some(Vote { recipient, add }))
}

fn rlp_error(field: &'static str) -> impl Fn(alloy_rlp::Error) -> HeaderError {
    move |e| HeaderError::InvalidRlp {
        field,
        reason: e.to_string(),
    }
}

/// Test fixture builders for IBFT 2.0 extra data.
#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures {
    use super::*;
    use alloy_rlp::Encodable;

    /// Encode IBFT 2.0 extra data the way Besu writes it.
    pub fn encode_extra_data(
        vanity: &[u8],
        validators: &[Address],
        vote: Option<&Vote>,
        round: u32,
        seals: &[Bytes],
    ) -> Bytes {
        let mut payload = Vec::new();
        vanity.encode(&mut payload);
        encode_list(validators.iter().map(|v| v.as_slice()), &mut payload);
        match vote {
            None => payload.push(alloy_rlp::EMPTY_STRING_CODE),
            Some(vote) => {
                let kind: &[u8] = if vote.add { &[VOTE_TYPE_ADD] } else { &[VOTE_TYPE_DROP] };
                encode_list([vote.recipient.as_slice(), kind].into_iter(), &mut payload);
            }
        }
        round.to_be_bytes().as_slice().encode(&mut payload);
        encode_list(seals.iter().map(|s| &s[..]), &mut payload);

        let mut out = Vec::new();
        alloy_rlp::Header {
            list: true,
            payload_length: payload.len(),
        }
        .encode(&mut out);
        out.extend_from_slice(&payload);
        Bytes::from(out)
    }

    fn encode_list<'a>(items: impl Iterator<Item = &'a [u8]> + Clone, out: &mut Vec<u8>) {
        let payload_length: usize = items.clone().map(|i| i.length()).sum();
        alloy_rlp::Header {
            list: true,
            payload_length,
        }
        .encode(out);
        for item in items {
            item.encode(out);
        }
    }

    /// `count` distinct validator addresses.
    pub fn validators(count: usize) -> Vec<Address> {
        (0..count)
            .map(|i| Address::repeat_byte(i as u8 + 1))
            .collect()
    }

    /// A well-formed 65-byte seal, distinct per `index`.
    pub fn seal(index: u8) -> Bytes {
        let mut sig = vec![index.wrapping_add(1); 65];
        sig[64] = 0x00;
        Bytes::from(sig)
    }

    /// A header whose extra data commits `validator_count` validators with `signed` seals.
    pub fn header(number: u64, validator_count: usize, signed: usize) -> BlockHeader {
        let seals: Vec<Bytes> = (0..signed).map(|i| seal(i as u8)).collect();
        BlockHeader {
            number,
            hash: B256::repeat_byte(number as u8),
            parent_hash: B256::repeat_byte(number.wrapping_sub(1) as u8),
            state_root: B256::repeat_byte(0x5a),
            timestamp: 1_700_000_000 + number,
            extra_data: encode_extra_data(
                &[0u8; EXTRA_VANITY_LENGTH],
                &validators(validator_count),
                None,
                0,
                &seals,
            ),
        }
    }
}
