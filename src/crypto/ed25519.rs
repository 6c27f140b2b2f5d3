use ed25519_dalek::Signer;
use ed25519_dalek::{Signature, SigningKey, VerifyingKey};
use rand_core::OsRng;

pub const SIGNATURE_SIZE: usize = 64;
pub const PUBLIC_KEY_SIZE: usize = 32;

pub fn generate_keypair() -> (SigningKey, VerifyingKey) {
    let sk = SigningKey::generate(&mut OsRng);
    let vk = sk.verifying_key();
    (sk, vk)
}

pub fn sign(sk: &SigningKey, msg: &[u8]) -> [u8; 64] {
    let sig: Signature = sk.sign(msg);
    sig.to_bytes()
}

pub fn verify(vk: &VerifyingKey, msg: &[u8], sig_bytes: &[u8]) -> bool {
    let Ok(sig) = Signature::from_slice(sig_bytes) else {
        return false;
    };
    vk.verify_strict(msg, &sig).is_ok()
}

/// Verifies a batch of signatures, reporting per-signature validity.
///
/// The fast path is a single multi-scalar batch equation over the whole
/// input. When it rejects, each entry is re-checked individually to identify
/// the offenders, so the returned vector always lines up with the input
/// order. The batch equation and strict single verification can disagree on
/// pathological inputs; callers must treat `(false, all-true)` as an
/// inconsistency, not as success.
pub fn verify_batch(keys: &[VerifyingKey], msgs: &[Vec<u8>], sigs: &[Signature]) -> (bool, Vec<bool>) {
    if keys.is_empty() {
        return (true, Vec::new());
    }

    let msg_refs: Vec<&[u8]> = msgs.iter().map(|m| m.as_slice()).collect();
    if ed25519_dalek::verify_batch(&msg_refs, sigs, keys).is_ok() {
        return (true, vec![true; keys.len()]);
    }

    let valid: Vec<bool> = keys
        .iter()
        .zip(msgs.iter().zip(sigs.iter()))
        .map(|(vk, (msg, sig))| vk.verify_strict(msg, sig).is_ok())
        .collect();
    (false, valid)
}
