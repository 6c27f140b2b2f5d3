use k256::ecdsa::signature::{Signer, Verifier};
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use rand_core::OsRng;

/// Compressed SEC1 encoding.
pub const PUBLIC_KEY_SIZE: usize = 33;
pub const SIGNATURE_SIZE: usize = 64;

pub fn generate_keypair() -> (SigningKey, VerifyingKey) {
    let sk = SigningKey::random(&mut OsRng);
    let vk = *sk.verifying_key();
    (sk, vk)
}

/// Signs with an RFC 6979 deterministic nonce; no RNG involved.
pub fn sign(sk: &SigningKey, msg: &[u8]) -> Vec<u8> {
    let sig: Signature = sk.sign(msg);
    sig.to_bytes().to_vec()
}

pub fn verify(vk: &VerifyingKey, msg: &[u8], sig_bytes: &[u8]) -> bool {
    let Ok(sig) = Signature::from_slice(sig_bytes) else {
        return false;
    };
    vk.verify(msg, &sig).is_ok()
}
