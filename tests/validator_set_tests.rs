//! Validator set construction and lookup tests.

use quorumbft::crypto::hash::sha256;
use quorumbft::types::validator::ValidatorSetError;
use quorumbft::{PrivateKey, Validator, ValidatorSet, MAX_TOTAL_VOTING_POWER};

fn make_validators(n: usize, power: i64) -> Vec<Validator> {
    (0..n)
        .map(|_| Validator::new(PrivateKey::generate_ed25519().public_key(), power))
        .collect()
}

#[test]
fn test_total_power_is_cached_sum() {
    let vals = ValidatorSet::new(make_validators(4, 25)).unwrap();
    assert_eq!(vals.total_voting_power(), 100);
    assert_eq!(vals.len(), 4);
}

#[test]
fn test_empty_set_rejected() {
    assert!(matches!(ValidatorSet::new(vec![]), Err(ValidatorSetError::Empty)));
}

#[test]
fn test_negative_power_rejected() {
    let validators = vec![Validator::new(PrivateKey::generate_ed25519().public_key(), -1)];
    assert!(matches!(
        ValidatorSet::new(validators),
        Err(ValidatorSetError::NegativeVotingPower(-1))
    ));
}

#[test]
fn test_total_power_cap_enforced() {
    let validators = vec![
        Validator::new(PrivateKey::generate_ed25519().public_key(), MAX_TOTAL_VOTING_POWER),
        Validator::new(PrivateKey::generate_ed25519().public_key(), 1),
    ];
    assert!(matches!(
        ValidatorSet::new(validators),
        Err(ValidatorSetError::TotalPowerOverflow)
    ));
}

/// The address must be derived from the public key; a tampered address is
/// rejected at construction.
#[test]
fn test_mismatched_address_rejected() {
    let mut val = Validator::new(PrivateKey::generate_ed25519().public_key(), 1);
    val.address.0[0] ^= 0xff;
    assert!(matches!(
        ValidatorSet::new(vec![val]),
        Err(ValidatorSetError::MismatchedAddress { .. })
    ));
}

#[test]
fn test_address_is_truncated_key_hash() {
    let key = PrivateKey::generate_ed25519();
    let val = Validator::new(key.public_key(), 1);
    let digest = sha256(&key.public_key().to_bytes());
    assert_eq!(val.address.as_bytes()[..], digest.as_bytes()[..20]);
}

#[test]
fn test_get_by_address_returns_position() {
    let validators = make_validators(3, 10);
    let wanted = validators[2].address;
    let vals = ValidatorSet::new(validators).unwrap();

    let (idx, val) = vals.get_by_address(&wanted).unwrap();
    assert_eq!(idx, 2);
    assert_eq!(val.address, wanted);

    let stranger = Validator::new(PrivateKey::generate_ed25519().public_key(), 1);
    assert!(vals.get_by_address(&stranger.address).is_none());
}

#[test]
fn test_proposer_is_first_entry() {
    let validators = make_validators(3, 10);
    let first = validators[0].address;
    let vals = ValidatorSet::new(validators).unwrap();
    assert_eq!(vals.proposer().address, first);
}

#[test]
fn test_same_key_type_predicate() {
    let uniform = ValidatorSet::new(make_validators(3, 1)).unwrap();
    assert!(uniform.all_keys_have_same_type());

    let mixed = ValidatorSet::new(vec![
        Validator::new(PrivateKey::generate_ed25519().public_key(), 1),
        Validator::new(PrivateKey::generate_secp256k1().public_key(), 1),
    ])
    .unwrap();
    assert!(!mixed.all_keys_have_same_type());

    let bls = ValidatorSet::new(vec![
        Validator::new(PrivateKey::generate_bls12381().public_key(), 1),
        Validator::new(PrivateKey::generate_bls12381().public_key(), 1),
    ])
    .unwrap();
    assert!(bls.all_keys_have_same_type());
}
