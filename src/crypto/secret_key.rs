use crate::{
    crypto::params,
    error::{Error, Result},
};
use aes::Aes256;
use ctr::cipher::{KeyIvInit, StreamCipher};
use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

type Aes256Ctr = ctr::Ctr128BE<Aes256>;

/// A single-use AES-256 key. One of these is generated for every section of
/// an envelope (the pilgrim's data, each hostel's stamp) and then sealed for
/// the office under its public key.
pub struct SecretKey(Zeroizing<[u8; params::SYMMETRIC_KEY_LEN]>);

impl SecretKey {
    /// Create a new random AES-256 key
    pub fn new_aes256ctr<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut randbuf = Zeroizing::new([0u8; params::SYMMETRIC_KEY_LEN]);
        rng.fill_bytes(randbuf.as_mut());
        Self(randbuf)
    }

    /// Rebuild a key from raw bytes. Anything that isn't exactly 32 bytes is
    /// rejected, which is also how we notice an RSA-decrypted key is garbage.
    pub fn new_aes256ctr_from_bytes(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; params::SYMMETRIC_KEY_LEN] = bytes
            .try_into()
            .map_err(|_| Error::DecryptionKeyMismatch(format!("symmetric key ({} bytes, expected {})", bytes.len(), params::SYMMETRIC_KEY_LEN)))?;
        Ok(Self(Zeroizing::new(arr)))
    }

    fn apply_keystream(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut cipher = Aes256Ctr::new_from_slices(self.0.as_slice(), &params::CTR_INITIAL_COUNTER)
            .map_err(|_| Error::CryptoSealFailed)?;
        let mut buf = data.to_vec();
        cipher.try_apply_keystream(&mut buf).map_err(|_| Error::CryptoSealFailed)?;
        Ok(buf)
    }

    /// Encrypt a value with this key
    pub fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        self.apply_keystream(plaintext)
    }

    /// Decrypt a value with this key. CTR has no integrity check of its own:
    /// a wrong key "succeeds" and hands back noise.
    pub fn open(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        self.apply_keystream(ciphertext)
    }
}

impl AsRef<[u8]> for SecretKey {
    fn as_ref(&self) -> &[u8] {
        self.0.as_slice()
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}
