//! Deterministic encoding of the precommit vote that each commit signature
//! covers. Fixed-width big-endian fields with a length-prefixed chain id;
//! the layout is part of the signing contract and must stay stable across
//! machines and releases.

use crate::types::BlockId;

/// Vote type tag for precommits. Prevotes never reach commit verification.
const PRECOMMIT_TAG: u8 = 2;

pub(crate) struct Encoder {
    buf: Vec<u8>,
}

impl Encoder {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn put_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn put_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn put_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn put_bytes32(&mut self, v: &[u8; 32]) {
        self.buf.extend_from_slice(v);
    }

    pub fn put_vec(&mut self, data: &[u8]) {
        self.put_u32(data.len() as u32);
        self.buf.extend_from_slice(data);
    }
}

/// The byte sequence a validator signs for a precommit.
///
/// `validator_index` is the validator's position inside the commit the
/// signature was taken from. When the trusted validator set does not line
/// up 1:1 with the commit, the commit position is still the one that was
/// signed.
pub fn precommit_sign_bytes(
    chain_id: &str,
    height: u64,
    round: u32,
    block_id: &BlockId,
    timestamp_ms: u64,
    validator_index: usize,
) -> Vec<u8> {
    let mut e = Encoder::new();
    e.put_u8(PRECOMMIT_TAG);
    e.put_u64(height);
    e.put_u32(round);
    e.put_bytes32(block_id.hash.as_bytes());
    e.put_u32(block_id.part_set_header.total);
    e.put_bytes32(block_id.part_set_header.hash.as_bytes());
    e.put_u64(timestamp_ms);
    e.put_vec(chain_id.as_bytes());
    e.put_u32(validator_index as u32);
    e.into_bytes()
}
