//! BLS12-381 signatures (min-pk: 48-byte public keys, 96-byte signatures).
//!
//! Aggregated commits carry one signature per vote group; verification
//! checks that aggregate against the public keys of every group member and
//! the group's single canonical message.

use blst::min_pk::{AggregateSignature, PublicKey, SecretKey, Signature};
use blst::BLST_ERROR;
use rand_core::{OsRng, RngCore};

/// Domain separation tag for BLS signatures (Ethereum 2.0 compatible).
const DST: &[u8] = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_POP_";

pub const PUBLIC_KEY_SIZE: usize = 48;
pub const SIGNATURE_SIZE: usize = 96;

#[derive(thiserror::Error, Debug)]
pub enum BlsError {
    #[error("invalid BLS public key")]
    InvalidPublicKey,
    #[error("invalid BLS signature")]
    InvalidSignature,
    #[error("nothing to aggregate")]
    EmptyAggregation,
    #[error("signature aggregation failed")]
    AggregationFailed,
}

/// BLS public key, 48 bytes compressed.
#[derive(Clone)]
pub struct BlsPublicKey(PublicKey);

impl BlsPublicKey {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BlsError> {
        PublicKey::from_bytes(bytes)
            .map(BlsPublicKey)
            .map_err(|_| BlsError::InvalidPublicKey)
    }

    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_SIZE] {
        self.0.to_bytes()
    }

    pub fn verify(&self, msg: &[u8], sig_bytes: &[u8]) -> bool {
        let Ok(sig) = Signature::from_bytes(sig_bytes) else {
            return false;
        };
        sig.verify(true, msg, DST, &[], &self.0, true) == BLST_ERROR::BLST_SUCCESS
    }
}

impl PartialEq for BlsPublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for BlsPublicKey {}

impl std::fmt::Debug for BlsPublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BlsPublicKey({})", hex::encode(&self.to_bytes()[..8]))
    }
}

/// BLS key pair; used to produce commits in tests and tools, never by the
/// verification paths.
pub struct BlsKeyPair {
    secret: SecretKey,
    public: BlsPublicKey,
}

impl BlsKeyPair {
    pub fn generate() -> Self {
        let mut ikm = [0u8; 32];
        OsRng.fill_bytes(&mut ikm);
        let secret = SecretKey::key_gen(&ikm, &[]).expect("32 bytes of ikm is enough");
        let public = BlsPublicKey(secret.sk_to_pk());
        Self { secret, public }
    }

    pub fn sign(&self, msg: &[u8]) -> [u8; SIGNATURE_SIZE] {
        self.secret.sign(msg, DST, &[]).to_bytes()
    }

    pub fn public_key(&self) -> BlsPublicKey {
        self.public.clone()
    }
}

/// Aggregates individual signatures over a common message into one.
pub fn aggregate_signatures(sigs: &[Vec<u8>]) -> Result<Vec<u8>, BlsError> {
    if sigs.is_empty() {
        return Err(BlsError::EmptyAggregation);
    }
    let mut parsed = Vec::with_capacity(sigs.len());
    for sig in sigs {
        parsed.push(Signature::from_bytes(sig).map_err(|_| BlsError::InvalidSignature)?);
    }
    let refs: Vec<&Signature> = parsed.iter().collect();
    let agg = AggregateSignature::aggregate(&refs, true).map_err(|_| BlsError::AggregationFailed)?;
    Ok(agg.to_signature().to_bytes().to_vec())
}

/// Verifies an aggregated signature of `pubkeys` over the single message
/// `msg`. Malformed input verifies as false, never as an error.
pub fn verify_aggregate_signature(agg_sig: &[u8], pubkeys: &[&BlsPublicKey], msg: &[u8]) -> bool {
    if pubkeys.is_empty() {
        return false;
    }
    let Ok(sig) = Signature::from_bytes(agg_sig) else {
        return false;
    };
    let keys: Vec<&PublicKey> = pubkeys.iter().map(|pk| &pk.0).collect();
    sig.fast_aggregate_verify(true, msg, DST, &keys) == BLST_ERROR::BLST_SUCCESS
}
