use serde::{Deserialize, Serialize};

use crate::types::{canonical, Address, BlockId};

/// Largest accepted signature: a BLS12-381 signature is 96 bytes.
pub const MAX_SIGNATURE_SIZE: usize = 96;

#[derive(thiserror::Error, Debug)]
pub enum CommitError {
    #[error("validator address is present for an absent signature")]
    AbsentWithAddress,
    #[error("timestamp is present for an absent signature")]
    AbsentWithTimestamp,
    #[error("signature is present for an absent signature")]
    AbsentWithSignature,
    #[error("missing validator address")]
    MissingAddress,
    #[error("missing signature")]
    MissingSignature,
    #[error("signature is {got} bytes, maximum is {}", MAX_SIGNATURE_SIZE)]
    OversizedSignature { got: usize },
    #[error("commit cannot be for a nil block")]
    NilBlockId,
    #[error("no signatures in commit")]
    NoSignatures,
    #[error("invalid signature #{idx}: {source}")]
    InvalidCommitSig {
        idx: usize,
        #[source]
        source: Box<CommitError>,
    },
}

/// What a validator's commit entry says: no vote arrived, a vote for the
/// block, or an explicit vote for nil.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockIdFlag {
    Absent,
    Commit,
    Nil,
}

/// One validator's entry in a commit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitSig {
    pub flag: BlockIdFlag,
    pub validator_address: Address,
    pub timestamp_ms: u64,
    #[serde(with = "serde_bytes")]
    pub signature: Vec<u8>,
}

impl CommitSig {
    /// Entry for a validator that did not sign.
    pub fn absent() -> Self {
        Self {
            flag: BlockIdFlag::Absent,
            validator_address: Address::ZERO,
            timestamp_ms: 0,
            signature: Vec::new(),
        }
    }

    pub fn new_commit(validator_address: Address, timestamp_ms: u64, signature: Vec<u8>) -> Self {
        Self { flag: BlockIdFlag::Commit, validator_address, timestamp_ms, signature }
    }

    pub fn new_nil(validator_address: Address, timestamp_ms: u64, signature: Vec<u8>) -> Self {
        Self { flag: BlockIdFlag::Nil, validator_address, timestamp_ms, signature }
    }

    pub fn is_absent(&self) -> bool {
        self.flag == BlockIdFlag::Absent
    }

    pub fn is_commit(&self) -> bool {
        self.flag == BlockIdFlag::Commit
    }

    /// The block id this entry voted for: the commit's block for a Commit
    /// flag, the zero id for nil and absent entries.
    pub fn block_id(&self, commit_block_id: &BlockId) -> BlockId {
        if self.is_commit() {
            *commit_block_id
        } else {
            BlockId::default()
        }
    }

    pub fn validate_basic(&self) -> Result<(), CommitError> {
        match self.flag {
            BlockIdFlag::Absent => {
                if !self.validator_address.is_zero() {
                    return Err(CommitError::AbsentWithAddress);
                }
                if self.timestamp_ms != 0 {
                    return Err(CommitError::AbsentWithTimestamp);
                }
                if !self.signature.is_empty() {
                    return Err(CommitError::AbsentWithSignature);
                }
            }
            BlockIdFlag::Commit | BlockIdFlag::Nil => {
                if self.validator_address.is_zero() {
                    return Err(CommitError::MissingAddress);
                }
                if self.signature.is_empty() {
                    return Err(CommitError::MissingSignature);
                }
                if self.signature.len() > MAX_SIGNATURE_SIZE {
                    return Err(CommitError::OversizedSignature { got: self.signature.len() });
                }
            }
        }
        Ok(())
    }
}

/// The precommit votes that finalized a block: one entry per validator of
/// the signing set, in validator-set order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub height: u64,
    pub round: u32,
    pub block_id: BlockId,
    pub signatures: Vec<CommitSig>,
}

impl Commit {
    pub fn new(height: u64, round: u32, block_id: BlockId, signatures: Vec<CommitSig>) -> Self {
        Self { height, round, block_id, signatures }
    }

    /// Canonical bytes the validator at position `idx` signed. The index is
    /// the commit position and is itself part of the signed payload.
    pub fn vote_sign_bytes(&self, chain_id: &str, idx: usize) -> Vec<u8> {
        let sig = &self.signatures[idx];
        canonical::precommit_sign_bytes(
            chain_id,
            self.height,
            self.round,
            &sig.block_id(&self.block_id),
            sig.timestamp_ms,
            idx,
        )
    }

    pub fn validate_basic(&self) -> Result<(), CommitError> {
        if self.height >= 1 {
            if self.block_id.is_zero() {
                return Err(CommitError::NilBlockId);
            }
            if self.signatures.is_empty() {
                return Err(CommitError::NoSignatures);
            }
            for (idx, sig) in self.signatures.iter().enumerate() {
                sig.validate_basic()
                    .map_err(|source| CommitError::InvalidCommitSig { idx, source: Box::new(source) })?;
            }
        }
        Ok(())
    }
}
