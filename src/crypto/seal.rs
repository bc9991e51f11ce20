//! Sealing is the hybrid encrypt-then-sign step every section of a credential
//! goes through, whether it's the pilgrim's own data or a hostel's stamp.
//!
//! A sealed section is three byte strings:
//!
//! 1. `data`: the plaintext encrypted under a fresh AES-256 key (CTR mode)
//! 2. `key`: that AES key encrypted under the recipient's RSA public key
//! 3. `digest`: SHA-512 of `data` encrypted under the signer's RSA private key
//!
//! Note that the digest is taken over the *ciphertext*. Anyone holding the
//! signer's public key can check who wrote a section without being able to
//! read it.

use crate::{
    crypto::{Hash, PrivateKey, PublicKey, SecretKey},
    error::{Error, Result},
};
use rand::{CryptoRng, RngCore};

/// The three ciphertexts making up one section of an envelope.
#[derive(Debug, Clone, PartialEq, getset::Getters, getset::MutGetters)]
#[getset(get = "pub", get_mut = "pub(crate)")]
pub struct SealedSection {
    /// The encrypted payload
    data: Vec<u8>,
    /// The payload's symmetric key, encrypted for the recipient
    key: Vec<u8>,
    /// The digest of `data`, encrypted by the signer
    digest: Vec<u8>,
}

impl SealedSection {
    /// Assemble a section from its three parts (usually fresh out of an
    /// envelope).
    pub fn new(data: Vec<u8>, key: Vec<u8>, digest: Vec<u8>) -> Self {
        Self { data, key, digest }
    }

    /// Encrypt `plaintext` for `recipient` and sign the result with `signer`.
    pub fn seal<R: RngCore + CryptoRng>(
        rng: &mut R,
        recipient: &PublicKey,
        signer: &PrivateKey,
        plaintext: &[u8],
    ) -> Result<Self> {
        let secret_key = SecretKey::new_aes256ctr(rng);
        let data = secret_key.seal(plaintext)?;
        let key = recipient.seal_key(rng, secret_key.as_ref())?;
        let digest = signer.sign_digest(&Hash::new_sha512(&data)?)?;
        Ok(Self { data, key, digest })
    }

    /// Check that `signer` produced this section and that `data` hasn't been
    /// touched since. `label` describes the section in the error.
    pub fn verify(&self, signer: &PublicKey, label: &str) -> Result<()> {
        let hash = Hash::new_sha512(&self.data)?;
        if !signer.verify_digest(&hash, &self.digest) {
            Err(Error::SignatureInvalid(label.into()))?;
        }
        Ok(())
    }

    /// Recover the plaintext. Does NOT verify: call [`verify`](Self::verify)
    /// first.
    pub fn open(&self, recipient: &PrivateKey) -> Result<Vec<u8>> {
        let key_bytes = recipient.open_key(&self.key)?;
        let secret_key = SecretKey::new_aes256ctr_from_bytes(&key_bytes)?;
        secret_key.open(&self.data)
    }

    /// Break the section back into `(data, key, digest)`.
    pub fn into_parts(self) -> (Vec<u8>, Vec<u8>, Vec<u8>) {
        (self.data, self.key, self.digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{keys::Role, util::test};

    fn keypairs() -> (PrivateKey, PrivateKey) {
        let keys = test::keys();
        (
            PrivateKey::from_rsa(Role::Office, keys.office.clone()),
            PrivateKey::from_rsa(Role::Pilgrim, keys.pilgrim.clone()),
        )
    }

    #[test]
    fn seal_verify_open() {
        let mut rng = test::rng();
        let (office, pilgrim) = keypairs();
        let sealed = SealedSection::seal(&mut rng, &office.public_key(), &pilgrim, b"omg lol wtf").unwrap();
        assert_eq!(sealed.data().len(), 11);
        assert_eq!(sealed.key().len(), 256);
        assert_eq!(sealed.digest().len(), 256);

        sealed.verify(&pilgrim.public_key(), "test section").unwrap();
        let plain = sealed.open(&office).unwrap();
        assert_eq!(plain.as_slice(), b"omg lol wtf");
    }

    #[test]
    fn seal_tampered_data_fails_verify() {
        let mut rng = test::rng();
        let (office, pilgrim) = keypairs();
        let sealed = SealedSection::seal(&mut rng, &office.public_key(), &pilgrim, b"omg lol wtf").unwrap();

        let mut sealed2 = sealed.clone();
        sealed2.data_mut()[3] ^= 0x01;
        let res = sealed2.verify(&pilgrim.public_key(), "test section");
        assert!(matches!(res, Err(Error::SignatureInvalid(ref l)) if l == "test section"));

        // wrong signer
        let res = sealed.verify(&office.public_key(), "test section");
        assert!(matches!(res, Err(Error::SignatureInvalid(_))));
    }

    #[test]
    fn seal_open_wrong_recipient() {
        let mut rng = test::rng();
        let (office, pilgrim) = keypairs();
        let sealed = SealedSection::seal(&mut rng, &office.public_key(), &pilgrim, b"omg lol wtf").unwrap();
        let res = sealed.open(&pilgrim);
        assert!(matches!(res, Err(Error::CryptoOpenFailed) | Err(Error::DecryptionKeyMismatch(_))));
    }

    #[test]
    fn seal_parts_round_trip() {
        let mut rng = test::rng();
        let (office, pilgrim) = keypairs();
        let sealed = SealedSection::seal(&mut rng, &office.public_key(), &pilgrim, b"x").unwrap();
        let (data, key, digest) = sealed.clone().into_parts();
        assert_eq!(SealedSection::new(data, key, digest), sealed);
    }
}
