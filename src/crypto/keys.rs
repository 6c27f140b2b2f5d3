//! Tagged key variants for the three supported signature families.
//!
//! Verification dispatches by match instead of downcasting: the batch
//! capability is a method returning an optional verifier, and aggregated
//! (BLS) commits are detected with a direct tag check.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::crypto::bls::BlsPublicKey;
use crate::crypto::hash::sha256;
use crate::crypto::{bls, ed25519, secp256k1};
use crate::types::Address;

pub const ED25519_TYPE: &str = "ed25519";
pub const SECP256K1_TYPE: &str = "secp256k1";
pub const BLS12381_TYPE: &str = "bls12_381";

#[derive(thiserror::Error, Debug)]
pub enum KeyError {
    #[error("unknown key type {0:?}")]
    UnknownKeyType(String),
    #[error("invalid {key_type} public key bytes")]
    InvalidKeyBytes { key_type: &'static str },
    #[error("malformed signature")]
    MalformedSignature,
    #[error("{key_type} does not support batch verification")]
    BatchUnsupported { key_type: &'static str },
}

/// A validator public key of one of the known algorithm families.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PublicKey {
    Ed25519(ed25519_dalek::VerifyingKey),
    Secp256k1(k256::ecdsa::VerifyingKey),
    Bls12381(BlsPublicKey),
}

impl PublicKey {
    pub fn from_type_and_bytes(key_type: &str, bytes: &[u8]) -> Result<Self, KeyError> {
        match key_type {
            ED25519_TYPE => {
                let arr: [u8; ed25519::PUBLIC_KEY_SIZE] = bytes
                    .try_into()
                    .map_err(|_| KeyError::InvalidKeyBytes { key_type: ED25519_TYPE })?;
                let vk = ed25519_dalek::VerifyingKey::from_bytes(&arr)
                    .map_err(|_| KeyError::InvalidKeyBytes { key_type: ED25519_TYPE })?;
                Ok(PublicKey::Ed25519(vk))
            }
            SECP256K1_TYPE => {
                let vk = k256::ecdsa::VerifyingKey::from_sec1_bytes(bytes)
                    .map_err(|_| KeyError::InvalidKeyBytes { key_type: SECP256K1_TYPE })?;
                Ok(PublicKey::Secp256k1(vk))
            }
            BLS12381_TYPE => {
                let pk = BlsPublicKey::from_bytes(bytes)
                    .map_err(|_| KeyError::InvalidKeyBytes { key_type: BLS12381_TYPE })?;
                Ok(PublicKey::Bls12381(pk))
            }
            other => Err(KeyError::UnknownKeyType(other.to_string())),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            PublicKey::Ed25519(vk) => vk.to_bytes().to_vec(),
            PublicKey::Secp256k1(vk) => vk.to_sec1_bytes().to_vec(),
            PublicKey::Bls12381(pk) => pk.to_bytes().to_vec(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            PublicKey::Ed25519(_) => ED25519_TYPE,
            PublicKey::Secp256k1(_) => SECP256K1_TYPE,
            PublicKey::Bls12381(_) => BLS12381_TYPE,
        }
    }

    /// Address derived from the key bytes; the same scheme for every family.
    pub fn address(&self) -> Address {
        let digest = sha256(&self.to_bytes());
        let mut addr = [0u8; 20];
        addr.copy_from_slice(&digest.as_bytes()[..20]);
        Address(addr)
    }

    /// Checks one signature over one message. Malformed signature bytes
    /// verify as false.
    pub fn verify_signature(&self, msg: &[u8], sig: &[u8]) -> bool {
        match self {
            PublicKey::Ed25519(vk) => ed25519::verify(vk, msg, sig),
            PublicKey::Secp256k1(vk) => secp256k1::verify(vk, msg, sig),
            PublicKey::Bls12381(pk) => pk.verify(msg, sig),
        }
    }

    pub fn supports_batch_verify(&self) -> bool {
        matches!(self, PublicKey::Ed25519(_))
    }

    pub fn is_bls(&self) -> bool {
        matches!(self, PublicKey::Bls12381(_))
    }

    /// A fresh batch verifier for this key's family, if the family has one.
    pub fn batch_verifier(&self) -> Option<BatchVerifier> {
        if self.supports_batch_verify() {
            Some(BatchVerifier::default())
        } else {
            None
        }
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let bytes = self.to_bytes();
        (self.type_name(), serde_bytes::Bytes::new(&bytes)).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (key_type, bytes): (String, serde_bytes::ByteBuf) = Deserialize::deserialize(deserializer)?;
        PublicKey::from_type_and_bytes(&key_type, &bytes).map_err(D::Error::custom)
    }
}

/// Signing counterpart of [`PublicKey`]; commit producers and tests use it,
/// the verification paths never do.
pub enum PrivateKey {
    Ed25519(ed25519_dalek::SigningKey),
    Secp256k1(k256::ecdsa::SigningKey),
    Bls12381(bls::BlsKeyPair),
}

impl PrivateKey {
    pub fn generate_ed25519() -> Self {
        let (sk, _) = ed25519::generate_keypair();
        PrivateKey::Ed25519(sk)
    }

    pub fn generate_secp256k1() -> Self {
        let (sk, _) = secp256k1::generate_keypair();
        PrivateKey::Secp256k1(sk)
    }

    pub fn generate_bls12381() -> Self {
        PrivateKey::Bls12381(bls::BlsKeyPair::generate())
    }

    pub fn public_key(&self) -> PublicKey {
        match self {
            PrivateKey::Ed25519(sk) => PublicKey::Ed25519(sk.verifying_key()),
            PrivateKey::Secp256k1(sk) => PublicKey::Secp256k1(*sk.verifying_key()),
            PrivateKey::Bls12381(kp) => PublicKey::Bls12381(kp.public_key()),
        }
    }

    pub fn sign(&self, msg: &[u8]) -> Vec<u8> {
        match self {
            PrivateKey::Ed25519(sk) => ed25519::sign(sk, msg).to_vec(),
            PrivateKey::Secp256k1(sk) => secp256k1::sign(sk, msg),
            PrivateKey::Bls12381(kp) => kp.sign(msg).to_vec(),
        }
    }
}

/// Collects `(key, message, signature)` tuples and verifies them in one
/// shot. Only the ed25519 family supports this; obtain an instance through
/// [`PublicKey::batch_verifier`].
#[derive(Default)]
pub struct BatchVerifier {
    keys: Vec<ed25519_dalek::VerifyingKey>,
    msgs: Vec<Vec<u8>>,
    sigs: Vec<ed25519_dalek::Signature>,
}

impl BatchVerifier {
    pub fn add(&mut self, pub_key: &PublicKey, msg: Vec<u8>, sig: &[u8]) -> Result<(), KeyError> {
        let PublicKey::Ed25519(vk) = pub_key else {
            return Err(KeyError::BatchUnsupported { key_type: pub_key.type_name() });
        };
        let sig = ed25519_dalek::Signature::from_slice(sig).map_err(|_| KeyError::MalformedSignature)?;
        self.keys.push(*vk);
        self.msgs.push(msg);
        self.sigs.push(sig);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns whether every entry verified, plus per-entry validity in
    /// insertion order.
    pub fn verify(&self) -> (bool, Vec<bool>) {
        ed25519::verify_batch(&self.keys, &self.msgs, &self.sigs)
    }
}
