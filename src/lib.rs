//! Commit verification core for a BFT consensus engine.
//!
//! Given a chain id, a trusted validator set, a block id and a height, the
//! entry points in [`types::validation`] decide whether a [`Commit`] — the
//! per-validator precommit signatures from the final round of a consensus
//! instance — represents a valid +2/3 quorum (or, for light clients
//! crossing epoch boundaries, a caller-chosen trust fraction) of that set.
//!
//! Verification is a pure, synchronous decision procedure: no I/O, no
//! shared state, inputs are never mutated. Calls on distinct inputs may run
//! in parallel freely.

pub mod crypto;
pub mod math;
pub mod types;

pub use crypto::{BatchVerifier, KeyError, PrivateKey, PublicKey};
pub use math::Fraction;
pub use types::{
    verify_commit, verify_commit_light, verify_commit_light_all_signatures,
    verify_commit_light_trusting, verify_commit_light_trusting_all_signatures, Address, BlockId,
    BlockIdFlag, Commit, CommitSig, Hash, PartSetHeader, Validator, ValidatorSet, VerifyError,
    MAX_TOTAL_VOTING_POWER,
};
