//! The crypto module wraps the fixed set of primitives a credential is built
//! from: RSA with PKCS#1 v1.5 padding for the asymmetric half, AES-256 in CTR
//! mode for the bulk data, and SHA-512 for the digest that gets signed.
//!
//! None of this is negotiated. Every envelope ever written uses the same three
//! algorithms, so the parameters are plain constants in [`params`].

pub mod hash;
pub mod keypair;
pub mod seal;
pub mod secret_key;

pub use hash::Hash;
pub use keypair::{PrivateKey, PublicKey};
pub use seal::SealedSection;
pub use secret_key::SecretKey;

use rand::{rngs::OsRng, RngCore, SeedableRng};

/// Fixed algorithm parameters.
pub mod params {
    /// AES key length in bytes (256 bits).
    pub const SYMMETRIC_KEY_LEN: usize = 32;
    /// SHA-512 output length in bytes.
    pub const DIGEST_LEN: usize = 64;
    /// Initial CTR counter block. Every section is encrypted under a freshly
    /// generated key that is never reused, so a constant counter is safe.
    pub const CTR_INITIAL_COUNTER: [u8; 16] = [0u8; 16];
    /// Modulus size the key generator tools produce.
    pub const RSA_KEY_BITS: usize = 4096;
}

/// A convenience function that returns a ChaCha20 CSRNG seeded with OS random bytes. Use this if
/// you want a nice, strong random number generator, you don't want to wire one up yourself, and
/// your platform provides good entropy.
///
/// This can be used as an input to any function in this crate that accepts `&mut rng`. Otherwise,
/// you can bring your own RNG that implements [`RngCore`] + [`CryptoRng`](rand::CryptoRng).
pub fn rng_chacha20() -> rand_chacha::ChaCha20Rng {
    let mut seed_bytes = [0u8; 32];
    OsRng.fill_bytes(&mut seed_bytes);
    rand_chacha::ChaCha20Rng::from_seed(seed_bytes)
}
