//! Commit verification: decides whether a commit carries a valid quorum of
//! a validator set.
//!
//! Three verification paths exist. Sets whose keys are all BLS verify one
//! aggregated signature per vote group; same-type sets whose key family
//! supports it verify all signatures as one batch; everything else verifies
//! signature by signature. The path is chosen once per call and a failed
//! batch reports the offending signature directly instead of falling back.

use std::collections::HashMap;

use tracing::trace;

use crate::crypto::bls::{self, BlsPublicKey};
use crate::crypto::PublicKey;
use crate::math::{safe_mul, Fraction};
use crate::types::commit::CommitError;
use crate::types::{Address, BlockId, BlockIdFlag, Commit, CommitSig, ValidatorSet};

/// Batch verification needs at least two signatures to beat per-signature
/// verification.
const BATCH_VERIFY_THRESHOLD: usize = 2;

#[derive(thiserror::Error, Debug)]
pub enum VerifyError {
    #[error("invalid commit -- wrong set size: {expected} vs {got}")]
    SignatureCountMismatch { expected: usize, got: usize },
    #[error("invalid commit -- wrong height: want {want}, got {got}")]
    HeightMismatch { want: u64, got: u64 },
    #[error("invalid commit -- wrong block id: want {want}, got {got}")]
    BlockIdMismatch { want: BlockId, got: BlockId },
    #[error("trust level has zero denominator")]
    ZeroTrustDenominator,
    #[error("int64 overflow while calculating voting power needed; provide a smaller trust level numerator")]
    VotingPowerOverflow,
    #[error("invalid commit signature at index {idx}: {source}")]
    InvalidCommitSig {
        idx: usize,
        #[source]
        source: CommitError,
    },
    #[error("double vote from {validator} ({first_index} and {second_index})")]
    DoubleVote { validator: Address, first_index: usize, second_index: usize },
    #[error("wrong signature (#{idx}): {}", hex::encode_upper(.signature))]
    InvalidSignature { idx: usize, signature: Vec<u8> },
    #[error("not enough voting power signed: got {got}, needed more than {needed}")]
    NotEnoughVotingPower { got: i64, needed: i64 },
    #[error("unsupported signature algorithm or insufficient signatures for batch verification")]
    UnsupportedBatchVerification,
    #[error("batch verification failed with no invalid signatures")]
    BatchVerifyInconsistency,
    #[error("key type {key_type} cannot participate in an aggregated commit (index {idx})")]
    UnsupportedAggregateKey { idx: usize, key_type: &'static str },
    #[error("aggregated commit has no signature for the block")]
    MissingAggregateSignature,
    #[error("wrong aggregated signature for block: {}", hex::encode_upper(.signature))]
    InvalidAggregateSignature { signature: Vec<u8> },
    #[error("wrong aggregated signature for nil: {}", hex::encode_upper(.signature))]
    InvalidNilAggregateSignature { signature: Vec<u8> },
}

fn should_batch_verify(vals: &ValidatorSet, commit: &Commit) -> bool {
    commit.signatures.len() >= BATCH_VERIFY_THRESHOLD
        && vals.proposer().pub_key.supports_batch_verify()
        && vals.all_keys_have_same_type()
}

fn is_aggregated_commit(vals: &ValidatorSet) -> bool {
    vals.proposer().pub_key.is_bls() && vals.all_keys_have_same_type()
}

/// Verifies that +2/3 of the validator set signed this commit.
///
/// Every signature is checked, even after the quorum is reached: which
/// validators signed feeds downstream incentive accounting, so the early
/// exit is reserved for the light-client entry points.
pub fn verify_commit(
    chain_id: &str,
    vals: &ValidatorSet,
    block_id: &BlockId,
    height: u64,
    commit: &Commit,
) -> Result<(), VerifyError> {
    verify_basic_vals_and_commit(vals, commit, height, block_id)?;

    // total voting power is capped at 1/8th of i64::MAX, so doubling it
    // cannot overflow
    let voting_power_needed = vals.total_voting_power() * 2 / 3;

    trace!(height, signatures = commit.signatures.len(), "verifying commit");

    // absent entries carry nothing to check; only votes for the block count
    // towards the quorum
    let ignore = |sig: &CommitSig| sig.flag == BlockIdFlag::Absent;
    let count = |sig: &CommitSig| sig.flag == BlockIdFlag::Commit;

    if is_aggregated_commit(vals) {
        return verify_aggregated_commit(chain_id, vals, commit, voting_power_needed, ignore, count, true);
    }
    if should_batch_verify(vals, commit) {
        return verify_commit_batch(chain_id, vals, commit, voting_power_needed, ignore, count, true, true);
    }
    verify_commit_single(chain_id, vals, commit, voting_power_needed, ignore, count, true, true)
}

/// Verifies that +2/3 of the validator set signed this commit, stopping as
/// soon as the quorum is reached. Primarily used by light clients.
pub fn verify_commit_light(
    chain_id: &str,
    vals: &ValidatorSet,
    block_id: &BlockId,
    height: u64,
    commit: &Commit,
) -> Result<(), VerifyError> {
    verify_commit_light_internal(chain_id, vals, block_id, height, commit, false)
}

/// Like [`verify_commit_light`], but checks every signature.
pub fn verify_commit_light_all_signatures(
    chain_id: &str,
    vals: &ValidatorSet,
    block_id: &BlockId,
    height: u64,
    commit: &Commit,
) -> Result<(), VerifyError> {
    verify_commit_light_internal(chain_id, vals, block_id, height, commit, true)
}

fn verify_commit_light_internal(
    chain_id: &str,
    vals: &ValidatorSet,
    block_id: &BlockId,
    height: u64,
    commit: &Commit,
    count_all_signatures: bool,
) -> Result<(), VerifyError> {
    verify_basic_vals_and_commit(vals, commit, height, block_id)?;

    let voting_power_needed = vals.total_voting_power() * 2 / 3;

    trace!(height, signatures = commit.signatures.len(), "verifying commit (light)");

    // only votes for the block are interesting here, and all of them count
    let ignore = |sig: &CommitSig| sig.flag != BlockIdFlag::Commit;
    let count = |_: &CommitSig| true;

    if is_aggregated_commit(vals) {
        return verify_aggregated_commit(chain_id, vals, commit, voting_power_needed, ignore, count, true);
    }
    if should_batch_verify(vals, commit) {
        return verify_commit_batch(
            chain_id, vals, commit, voting_power_needed, ignore, count, count_all_signatures, true,
        );
    }
    verify_commit_single(
        chain_id, vals, commit, voting_power_needed, ignore, count, count_all_signatures, true,
    )
}

/// Verifies that `trust_level` of the given validator set signed this
/// commit.
///
/// The set does not have to be the one that produced the commit: a light
/// client crossing an epoch boundary holds an older (or newer) set that
/// merely intersects the signers. Signers are therefore resolved by
/// address, and commit entries from unknown validators are skipped.
pub fn verify_commit_light_trusting(
    chain_id: &str,
    vals: &ValidatorSet,
    commit: &Commit,
    trust_level: Fraction,
) -> Result<(), VerifyError> {
    verify_commit_light_trusting_internal(chain_id, vals, commit, trust_level, false)
}

/// Like [`verify_commit_light_trusting`], but checks every signature.
pub fn verify_commit_light_trusting_all_signatures(
    chain_id: &str,
    vals: &ValidatorSet,
    commit: &Commit,
    trust_level: Fraction,
) -> Result<(), VerifyError> {
    verify_commit_light_trusting_internal(chain_id, vals, commit, trust_level, true)
}

fn verify_commit_light_trusting_internal(
    chain_id: &str,
    vals: &ValidatorSet,
    commit: &Commit,
    trust_level: Fraction,
    count_all_signatures: bool,
) -> Result<(), VerifyError> {
    // the commit may come from a different validator set, so no size,
    // height or block id cross-checks are possible here
    if trust_level.denominator == 0 {
        return Err(VerifyError::ZeroTrustDenominator);
    }

    let numerator = i64::try_from(trust_level.numerator).map_err(|_| VerifyError::VotingPowerOverflow)?;
    let (product, overflow) = safe_mul(vals.total_voting_power(), numerator);
    if overflow {
        return Err(VerifyError::VotingPowerOverflow);
    }
    let voting_power_needed = (product as i128 / trust_level.denominator as i128) as i64;

    trace!(
        trust_level = %trust_level,
        signatures = commit.signatures.len(),
        "verifying commit (light, trusting)"
    );

    let ignore = |sig: &CommitSig| sig.flag != BlockIdFlag::Commit;
    let count = |_: &CommitSig| true;

    if is_aggregated_commit(vals) {
        return verify_aggregated_commit(chain_id, vals, commit, voting_power_needed, ignore, count, false);
    }
    if should_batch_verify(vals, commit) {
        return verify_commit_batch(
            chain_id, vals, commit, voting_power_needed, ignore, count, count_all_signatures, false,
        );
    }
    verify_commit_single(
        chain_id, vals, commit, voting_power_needed, ignore, count, count_all_signatures, false,
    )
}

fn verify_basic_vals_and_commit(
    vals: &ValidatorSet,
    commit: &Commit,
    height: u64,
    block_id: &BlockId,
) -> Result<(), VerifyError> {
    if vals.len() != commit.signatures.len() {
        return Err(VerifyError::SignatureCountMismatch {
            expected: vals.len(),
            got: commit.signatures.len(),
        });
    }
    if height != commit.height {
        return Err(VerifyError::HeightMismatch { want: height, got: commit.height });
    }
    if *block_id != commit.block_id {
        return Err(VerifyError::BlockIdMismatch { want: *block_id, got: commit.block_id });
    }
    Ok(())
}

/// Per-signature verification; the fallback when neither aggregation nor
/// batching applies.
///
/// CONTRACT: when `look_up_by_index` is set, the caller has already checked
/// that the set and the commit have the same size.
fn verify_commit_single(
    chain_id: &str,
    vals: &ValidatorSet,
    commit: &Commit,
    voting_power_needed: i64,
    ignore_sig: impl Fn(&CommitSig) -> bool,
    count_sig: impl Fn(&CommitSig) -> bool,
    count_all_signatures: bool,
    look_up_by_index: bool,
) -> Result<(), VerifyError> {
    let mut seen_vals: HashMap<usize, usize> = HashMap::with_capacity(commit.signatures.len());
    let mut tallied_voting_power: i64 = 0;

    for (idx, commit_sig) in commit.signatures.iter().enumerate() {
        if ignore_sig(commit_sig) {
            continue;
        }

        commit_sig
            .validate_basic()
            .map_err(|source| VerifyError::InvalidCommitSig { idx, source })?;

        // with a 1-to-1 correspondence the entry at position idx belongs to
        // the validator at the same position; otherwise resolve the signer
        // by address
        let val = if look_up_by_index {
            &vals.validators()[idx]
        } else {
            match vals.get_by_address(&commit_sig.validator_address) {
                // the signature doesn't belong to anyone in this set
                None => continue,
                Some((val_idx, val)) => {
                    // address lookup can hit the same validator twice
                    if let Some(&first_index) = seen_vals.get(&val_idx) {
                        return Err(VerifyError::DoubleVote {
                            validator: val.address,
                            first_index,
                            second_index: idx,
                        });
                    }
                    seen_vals.insert(val_idx, idx);
                    val
                }
            }
        };

        let vote_sign_bytes = commit.vote_sign_bytes(chain_id, idx);
        if !val.pub_key.verify_signature(&vote_sign_bytes, &commit_sig.signature) {
            return Err(VerifyError::InvalidSignature { idx, signature: commit_sig.signature.clone() });
        }

        if count_sig(commit_sig) {
            tallied_voting_power += val.voting_power;
        }

        if !count_all_signatures && tallied_voting_power > voting_power_needed {
            return Ok(());
        }
    }

    if tallied_voting_power <= voting_power_needed {
        return Err(VerifyError::NotEnoughVotingPower {
            got: tallied_voting_power,
            needed: voting_power_needed,
        });
    }
    Ok(())
}

/// Batch verification; behaviourally equivalent to [`verify_commit_single`]
/// and faster iff every signature in the batch is valid.
///
/// CONTRACT: the caller has checked `should_batch_verify`.
fn verify_commit_batch(
    chain_id: &str,
    vals: &ValidatorSet,
    commit: &Commit,
    voting_power_needed: i64,
    ignore_sig: impl Fn(&CommitSig) -> bool,
    count_sig: impl Fn(&CommitSig) -> bool,
    count_all_signatures: bool,
    look_up_by_index: bool,
) -> Result<(), VerifyError> {
    let mut seen_vals: HashMap<usize, usize> = HashMap::with_capacity(commit.signatures.len());
    let mut batch_sig_idxs: Vec<usize> = Vec::with_capacity(commit.signatures.len());
    let mut tallied_voting_power: i64 = 0;

    let mut bv = match vals.proposer().pub_key.batch_verifier() {
        Some(bv) if commit.signatures.len() >= BATCH_VERIFY_THRESHOLD => bv,
        // unreachable given the dispatcher; failing loudly beats a wrong
        // verdict
        _ => return Err(VerifyError::UnsupportedBatchVerification),
    };

    for (idx, commit_sig) in commit.signatures.iter().enumerate() {
        if ignore_sig(commit_sig) {
            continue;
        }

        let val = if look_up_by_index {
            &vals.validators()[idx]
        } else {
            match vals.get_by_address(&commit_sig.validator_address) {
                None => continue,
                Some((val_idx, val)) => {
                    if let Some(&first_index) = seen_vals.get(&val_idx) {
                        return Err(VerifyError::DoubleVote {
                            validator: val.address,
                            first_index,
                            second_index: idx,
                        });
                    }
                    seen_vals.insert(val_idx, idx);
                    val
                }
            }
        };

        let vote_sign_bytes = commit.vote_sign_bytes(chain_id, idx);
        bv.add(&val.pub_key, vote_sign_bytes, &commit_sig.signature)
            .map_err(|_| VerifyError::InvalidSignature { idx, signature: commit_sig.signature.clone() })?;
        batch_sig_idxs.push(idx);

        if count_sig(commit_sig) {
            tallied_voting_power += val.voting_power;
        }

        // with enough voting power batched the remaining signatures are not
        // needed for the light verdict
        if !count_all_signatures && tallied_voting_power > voting_power_needed {
            break;
        }
    }

    // no point paying for cryptography below the threshold
    if tallied_voting_power <= voting_power_needed {
        return Err(VerifyError::NotEnoughVotingPower {
            got: tallied_voting_power,
            needed: voting_power_needed,
        });
    }

    let (all_valid, valid_sigs) = bv.verify();
    if all_valid {
        return Ok(());
    }

    // report the first invalid signature, translated back from the batch
    // position to the commit position
    for (batch_idx, ok) in valid_sigs.iter().enumerate() {
        if !ok {
            let idx = batch_sig_idxs[batch_idx];
            return Err(VerifyError::InvalidSignature {
                idx,
                signature: commit.signatures[idx].signature.clone(),
            });
        }
    }

    // the batch rejected but every entry re-verified as valid: an invariant
    // violation in the underlying library, never a silent success
    Err(VerifyError::BatchVerifyInconsistency)
}

/// Aggregated (BLS) verification: entries that voted for the block form one
/// group, explicit nil votes the other. The first entry of each group
/// carries the group's aggregated signature, later members carry empty
/// signature bytes, and the group message is derived from that first
/// entry's commit position.
///
/// CONTRACT: the caller has checked `is_aggregated_commit`.
fn verify_aggregated_commit(
    chain_id: &str,
    vals: &ValidatorSet,
    commit: &Commit,
    voting_power_needed: i64,
    ignore_sig: impl Fn(&CommitSig) -> bool,
    count_sig: impl Fn(&CommitSig) -> bool,
    look_up_by_index: bool,
) -> Result<(), VerifyError> {
    let mut seen_vals: HashMap<usize, usize> = HashMap::with_capacity(commit.signatures.len());
    let mut tallied_voting_power: i64 = 0;

    let mut agg_sig_block: Option<&[u8]> = None;
    let mut msg_block: Option<Vec<u8>> = None;
    let mut pubkeys_block: Vec<&BlsPublicKey> = Vec::with_capacity(commit.signatures.len());

    let mut agg_sig_nil: Option<&[u8]> = None;
    let mut msg_nil: Option<Vec<u8>> = None;
    let mut pubkeys_nil: Vec<&BlsPublicKey> = Vec::with_capacity(commit.signatures.len());

    for (idx, commit_sig) in commit.signatures.iter().enumerate() {
        if ignore_sig(commit_sig) {
            continue;
        }

        let val = if look_up_by_index {
            &vals.validators()[idx]
        } else {
            match vals.get_by_address(&commit_sig.validator_address) {
                None => continue,
                Some((val_idx, val)) => {
                    if let Some(&first_index) = seen_vals.get(&val_idx) {
                        return Err(VerifyError::DoubleVote {
                            validator: val.address,
                            first_index,
                            second_index: idx,
                        });
                    }
                    seen_vals.insert(val_idx, idx);
                    val
                }
            }
        };

        let pk = match &val.pub_key {
            PublicKey::Bls12381(pk) => pk,
            other => {
                return Err(VerifyError::UnsupportedAggregateKey { idx, key_type: other.type_name() })
            }
        };

        match commit_sig.flag {
            BlockIdFlag::Commit => {
                // the first non-empty signature is the group aggregate
                if agg_sig_block.is_none() {
                    agg_sig_block = Some(&commit_sig.signature);
                    msg_block = Some(commit.vote_sign_bytes(chain_id, idx));
                }
                pubkeys_block.push(pk);
            }
            BlockIdFlag::Nil => {
                if agg_sig_nil.is_none() {
                    agg_sig_nil = Some(&commit_sig.signature);
                    msg_nil = Some(commit.vote_sign_bytes(chain_id, idx));
                }
                pubkeys_nil.push(pk);
            }
            BlockIdFlag::Absent => {}
        }

        if count_sig(commit_sig) {
            tallied_voting_power += val.voting_power;
        }
    }

    if tallied_voting_power <= voting_power_needed {
        return Err(VerifyError::NotEnoughVotingPower {
            got: tallied_voting_power,
            needed: voting_power_needed,
        });
    }

    // being above the threshold implies at least one counted vote for the
    // block, so the block group is populated
    let (Some(agg_sig), Some(msg)) = (agg_sig_block, msg_block.as_deref()) else {
        return Err(VerifyError::MissingAggregateSignature);
    };
    if !bls::verify_aggregate_signature(agg_sig, &pubkeys_block, msg) {
        return Err(VerifyError::InvalidAggregateSignature { signature: agg_sig.to_vec() });
    }

    if let (Some(agg_sig), Some(msg)) = (agg_sig_nil, msg_nil.as_deref()) {
        if !bls::verify_aggregate_signature(agg_sig, &pubkeys_nil, msg) {
            return Err(VerifyError::InvalidNilAggregateSignature { signature: agg_sig.to_vec() });
        }
    }

    Ok(())
}
