//! Key family wrappers: per-family sign/verify, the batch verifier, and
//! serde round trips of the tagged key type.

use quorumbft::crypto::keys::KeyError;
use quorumbft::{PrivateKey, PublicKey};

#[test]
fn test_sign_verify_each_family() {
    for key in [
        PrivateKey::generate_ed25519(),
        PrivateKey::generate_secp256k1(),
        PrivateKey::generate_bls12381(),
    ] {
        let pub_key = key.public_key();
        let sig = key.sign(b"vote bytes");
        assert!(pub_key.verify_signature(b"vote bytes", &sig), "{}", pub_key.type_name());
        assert!(!pub_key.verify_signature(b"other bytes", &sig), "{}", pub_key.type_name());
        // garbage signature bytes verify false, they are not an error
        assert!(!pub_key.verify_signature(b"vote bytes", b"junk"), "{}", pub_key.type_name());
    }
}

#[test]
fn test_batch_capability_per_family() {
    assert!(PrivateKey::generate_ed25519().public_key().supports_batch_verify());
    assert!(!PrivateKey::generate_secp256k1().public_key().supports_batch_verify());
    assert!(!PrivateKey::generate_bls12381().public_key().supports_batch_verify());

    assert!(PrivateKey::generate_bls12381().public_key().is_bls());
    assert!(!PrivateKey::generate_ed25519().public_key().is_bls());
}

#[test]
fn test_batch_verifier_all_valid() {
    let keys: Vec<PrivateKey> = (0..4).map(|_| PrivateKey::generate_ed25519()).collect();
    let mut bv = keys[0].public_key().batch_verifier().unwrap();
    for (i, key) in keys.iter().enumerate() {
        let msg = format!("message {i}").into_bytes();
        let sig = key.sign(&msg);
        bv.add(&key.public_key(), msg, &sig).unwrap();
    }
    let (all_valid, valid) = bv.verify();
    assert!(all_valid);
    assert_eq!(valid, vec![true; 4]);
}

/// A failed batch identifies exactly the offending entries.
#[test]
fn test_batch_verifier_pinpoints_invalid() {
    let keys: Vec<PrivateKey> = (0..4).map(|_| PrivateKey::generate_ed25519()).collect();
    let mut bv = keys[0].public_key().batch_verifier().unwrap();
    for (i, key) in keys.iter().enumerate() {
        let msg = format!("message {i}").into_bytes();
        let sig = if i == 2 { key.sign(b"a different message") } else { key.sign(&msg) };
        bv.add(&key.public_key(), msg, &sig).unwrap();
    }
    let (all_valid, valid) = bv.verify();
    assert!(!all_valid);
    assert_eq!(valid, vec![true, true, false, true]);
}

#[test]
fn test_batch_verifier_rejects_other_families() {
    let ed = PrivateKey::generate_ed25519();
    let secp = PrivateKey::generate_secp256k1();
    let mut bv = ed.public_key().batch_verifier().unwrap();
    let err = bv.add(&secp.public_key(), b"msg".to_vec(), &secp.sign(b"msg")).unwrap_err();
    assert!(matches!(err, KeyError::BatchUnsupported { .. }));
    assert!(bv.is_empty());
}

#[test]
fn test_batch_verifier_rejects_malformed_signature() {
    let ed = PrivateKey::generate_ed25519();
    let mut bv = ed.public_key().batch_verifier().unwrap();
    let err = bv.add(&ed.public_key(), b"msg".to_vec(), b"short").unwrap_err();
    assert!(matches!(err, KeyError::MalformedSignature));
}

#[test]
fn test_no_batch_verifier_for_unsupported_families() {
    assert!(PrivateKey::generate_secp256k1().public_key().batch_verifier().is_none());
    assert!(PrivateKey::generate_bls12381().public_key().batch_verifier().is_none());
}

#[test]
fn test_public_key_serde_roundtrip() {
    for key in [
        PrivateKey::generate_ed25519(),
        PrivateKey::generate_secp256k1(),
        PrivateKey::generate_bls12381(),
    ] {
        let pub_key = key.public_key();
        let encoded = serde_json::to_string(&pub_key).unwrap();
        let decoded: PublicKey = serde_json::from_str(&encoded).unwrap();
        assert_eq!(pub_key, decoded);
        assert_eq!(pub_key.address(), decoded.address());
    }
}

#[test]
fn test_public_key_from_bad_bytes() {
    assert!(PublicKey::from_type_and_bytes("ed25519", &[0u8; 31]).is_err());
    assert!(PublicKey::from_type_and_bytes("secp256k1", &[0u8; 33]).is_err());
    assert!(PublicKey::from_type_and_bytes("bls12_381", &[0u8; 48]).is_err());
    assert!(matches!(
        PublicKey::from_type_and_bytes("rsa", &[]),
        Err(KeyError::UnknownKeyType(_))
    ));
}
