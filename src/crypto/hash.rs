use crate::{
    crypto::params,
    error::{Error, Result},
    util::ser,
};
use sha2::{Digest, Sha512};
use std::ops::Deref;

/// A SHA-512 digest. This is what gets "signed" (encrypted with a private
/// key) for every section of an envelope.
///
/// When stringified, the hash is plain base64 of the digest bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hash([u8; params::DIGEST_LEN]);

impl Hash {
    /// Create a new SHA-512 hash from a message
    pub fn new_sha512(message: &[u8]) -> Result<Self> {
        let genarr = Sha512::digest(message);
        let arr: [u8; params::DIGEST_LEN] = genarr.as_slice().try_into()
            .map_err(|_| Error::CryptoSealFailed)?;
        Ok(Self(arr))
    }

    /// Return the byte slice representing this hash.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Deref for Hash {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for Hash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", ser::base64_encode(self.as_bytes()))
    }
}
