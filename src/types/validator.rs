use serde::{Deserialize, Serialize};

use crate::crypto::PublicKey;
use crate::types::Address;

/// Cap on the sum of voting powers. Keeping the total at most 1/8th of
/// `i64::MAX` guarantees `2 * total` never overflows when computing the
/// +2/3 threshold.
pub const MAX_TOTAL_VOTING_POWER: i64 = i64::MAX / 8;

#[derive(thiserror::Error, Debug)]
pub enum ValidatorSetError {
    #[error("validator set is empty")]
    Empty,
    #[error("validator has negative voting power: {0}")]
    NegativeVotingPower(i64),
    #[error("validator address is not derived from its public key: expected {expected}, got {got}")]
    MismatchedAddress { expected: Address, got: Address },
    #[error("total voting power exceeds the allowed maximum {}", MAX_TOTAL_VOTING_POWER)]
    TotalPowerOverflow,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    pub address: Address,
    pub pub_key: PublicKey,
    pub voting_power: i64,
    pub proposer_priority: i64,
}

impl Validator {
    pub fn new(pub_key: PublicKey, voting_power: i64) -> Self {
        Self {
            address: pub_key.address(),
            pub_key,
            voting_power,
            proposer_priority: 0,
        }
    }

    pub fn validate_basic(&self) -> Result<(), ValidatorSetError> {
        if self.voting_power < 0 {
            return Err(ValidatorSetError::NegativeVotingPower(self.voting_power));
        }
        let expected = self.pub_key.address();
        if self.address != expected {
            return Err(ValidatorSetError::MismatchedAddress { expected, got: self.address });
        }
        Ok(())
    }
}

impl std::fmt::Display for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Validator{{{} {} power:{}}}", self.address, self.pub_key.type_name(), self.voting_power)
    }
}

/// Ordered validator set. When a commit is paired 1:1 with the set,
/// signature position `i` belongs to `validators()[i]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorSet {
    validators: Vec<Validator>,
    total_voting_power: i64,
}

impl ValidatorSet {
    pub fn new(validators: Vec<Validator>) -> Result<Self, ValidatorSetError> {
        if validators.is_empty() {
            return Err(ValidatorSetError::Empty);
        }
        let mut total: i64 = 0;
        for val in &validators {
            val.validate_basic()?;
            total = total
                .checked_add(val.voting_power)
                .ok_or(ValidatorSetError::TotalPowerOverflow)?;
        }
        if total > MAX_TOTAL_VOTING_POWER {
            return Err(ValidatorSetError::TotalPowerOverflow);
        }
        Ok(Self { validators, total_voting_power: total })
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }

    pub fn get(&self, idx: usize) -> Option<&Validator> {
        self.validators.get(idx)
    }

    pub fn get_by_address(&self, address: &Address) -> Option<(usize, &Validator)> {
        self.validators
            .iter()
            .enumerate()
            .find(|(_, val)| val.address == *address)
    }

    pub fn has_address(&self, address: &Address) -> bool {
        self.get_by_address(address).is_some()
    }

    pub fn total_voting_power(&self) -> i64 {
        self.total_voting_power
    }

    /// The designated proposer. Proposer rotation lives outside this crate,
    /// so the first entry stands in; verification only ever reads the
    /// proposer's key family, and only under `all_keys_have_same_type`.
    pub fn proposer(&self) -> &Validator {
        &self.validators[0]
    }

    pub fn all_keys_have_same_type(&self) -> bool {
        self.validators
            .windows(2)
            .all(|pair| pair[0].pub_key.type_name() == pair[1].pub_key.type_name())
    }
}
