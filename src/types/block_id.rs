use serde::{Deserialize, Serialize};

use crate::types::Hash;

#[derive(thiserror::Error, Debug)]
pub enum BlockIdError {
    #[error("block id is for a nil block but part set header is not empty")]
    NilWithParts,
    #[error("part set header has a hash but zero parts")]
    PartsWithoutTotal,
}

/// Metadata of the part set a block was gossiped in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartSetHeader {
    pub total: u32,
    pub hash: Hash,
}

impl PartSetHeader {
    pub fn is_zero(&self) -> bool {
        self.total == 0 && self.hash.is_zero()
    }
}

/// Identifies a proposed block. Two block ids are equal iff both the block
/// hash and the part set header match exactly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockId {
    pub hash: Hash,
    pub part_set_header: PartSetHeader,
}

impl BlockId {
    pub fn new(hash: Hash, part_set_header: PartSetHeader) -> Self {
        Self { hash, part_set_header }
    }

    /// The zero block id stands for a nil vote.
    pub fn is_zero(&self) -> bool {
        self.hash.is_zero() && self.part_set_header.is_zero()
    }

    pub fn validate_basic(&self) -> Result<(), BlockIdError> {
        if self.hash.is_zero() && !self.part_set_header.is_zero() {
            return Err(BlockIdError::NilWithParts);
        }
        if self.part_set_header.total == 0 && !self.part_set_header.hash.is_zero() {
            return Err(BlockIdError::PartsWithoutTotal);
        }
        Ok(())
    }
}

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}/{}", self.hash, self.part_set_header.total, self.part_set_header.hash)
    }
}
