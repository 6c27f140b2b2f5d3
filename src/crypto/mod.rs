pub mod bls;
pub mod ed25519;
pub mod hash;
pub mod keys;
pub mod secp256k1;

pub use keys::{BatchVerifier, KeyError, PrivateKey, PublicKey};
