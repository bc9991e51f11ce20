//! Opaque RSA key handles.
//!
//! Every key remembers which [`Role`] it belongs to. That's purely a label,
//! but it lets errors say *whose* key was too short or malformed without the
//! caller having to thread that information through by hand.

use crate::{
    crypto::Hash,
    error::{Error, KeyDecodeError, Result},
    keys::Role,
};
use rand::{CryptoRng, RngCore};
use rsa::{
    pkcs8::{DecodePrivateKey, DecodePublicKey},
    traits::PublicKeyParts,
    Pkcs1v15Encrypt, Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey,
};

/// An RSA private key, decoded from PKCS#8.
#[derive(Clone, getset::Getters)]
pub struct PrivateKey {
    /// Who this key belongs to.
    #[getset(get = "pub")]
    role: Role,
    inner: RsaPrivateKey,
}

impl PrivateKey {
    /// Decode a PKCS#8 (DER) private key.
    pub fn from_pkcs8_der(role: Role, der: &[u8]) -> Result<Self> {
        let inner = RsaPrivateKey::from_pkcs8_der(der)
            .map_err(|e| Error::KeyFormatInvalid { role, source: KeyDecodeError::from(e) })?;
        Ok(Self { role, inner })
    }

    /// Wrap an already-built RSA key.
    pub fn from_rsa(role: Role, inner: RsaPrivateKey) -> Self {
        Self { role, inner }
    }

    /// Derive the public half of this key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_rsa(self.role, self.inner.to_public_key())
    }

    /// Modulus size in bits.
    pub fn bits(&self) -> usize {
        self.inner.size() * 8
    }

    /// Decrypt something that was sealed for us with [`PublicKey::seal_key`].
    pub fn open_key(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        self.inner.decrypt(Pkcs1v15Encrypt, ciphertext)
            .map_err(|_| Error::CryptoOpenFailed)
    }

    /// "Sign" a digest by encrypting it under the private key (PKCS#1 v1.5 type
    /// 1 padding, no DigestInfo prefix). Anybody with the public key can
    /// recover the digest, and only we could have produced it.
    pub fn sign_digest(&self, hash: &Hash) -> Result<Vec<u8>> {
        self.inner.sign(Pkcs1v15Sign::new_unprefixed(), hash.as_bytes())
            .map_err(|e| match e {
                rsa::Error::MessageTooLong => Error::KeyTooShort(self.role),
                _ => Error::CryptoSealFailed,
            })
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("role", &self.role)
            .field("bits", &self.bits())
            .finish_non_exhaustive()
    }
}

/// An RSA public key, decoded from an X.509 SubjectPublicKeyInfo.
#[derive(Debug, Clone, PartialEq, getset::Getters)]
pub struct PublicKey {
    /// Who this key belongs to.
    #[getset(get = "pub")]
    role: Role,
    inner: RsaPublicKey,
}

impl PublicKey {
    /// Decode an X.509 (DER) public key.
    pub fn from_spki_der(role: Role, der: &[u8]) -> Result<Self> {
        let inner = RsaPublicKey::from_public_key_der(der)
            .map_err(|e| Error::KeyFormatInvalid { role, source: KeyDecodeError::from(e) })?;
        Ok(Self { role, inner })
    }

    /// Wrap an already-built RSA key.
    pub fn from_rsa(role: Role, inner: RsaPublicKey) -> Self {
        Self { role, inner }
    }

    /// Modulus size in bits.
    pub fn bits(&self) -> usize {
        self.inner.size() * 8
    }

    /// Encrypt a small payload (a symmetric key, in practice) so only the
    /// holder of the matching private key can read it.
    pub fn seal_key<R: RngCore + CryptoRng>(&self, rng: &mut R, data: &[u8]) -> Result<Vec<u8>> {
        self.inner.encrypt(rng, Pkcs1v15Encrypt, data)
            .map_err(|e| match e {
                rsa::Error::MessageTooLong => Error::KeyTooShort(self.role),
                _ => Error::CryptoSealFailed,
            })
    }

    /// Recover the digest inside `signature` and compare it with `hash`.
    /// Returns false on any mismatch, including signatures that don't even
    /// decrypt to a well-formed block.
    pub fn verify_digest(&self, hash: &Hash, signature: &[u8]) -> bool {
        self.inner.verify(Pkcs1v15Sign::new_unprefixed(), hash.as_bytes(), signature).is_ok()
    }
}
