//! The main error enum for the project lives here, and documents the various
//! conditions that can arise while issuing, stamping, or opening a credential.

use crate::keys::{KeyKind, Role};
use thiserror::Error;

/// The reason a key could not be decoded. Wraps whatever the underlying DER
/// decoder complained about.
#[derive(Error, Debug)]
pub enum KeyDecodeError {
    /// The private key is not valid PKCS#8 (or not RSA).
    #[error("invalid PKCS#8 private key: {0}")]
    Pkcs8(#[from] rsa::pkcs8::Error),

    /// The public key is not a valid X.509 SubjectPublicKeyInfo (or not RSA).
    #[error("invalid X.509 public key: {0}")]
    Spki(#[from] rsa::pkcs8::spki::Error),
}

/// This is our error enum. It contains an entry for any part of the system in
/// which an expectation is not met or a problem occurs.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open a sealed symmetric key. Usually means the envelope was
    /// addressed to a different office.
    #[error("failed to decrypt a sealed key")]
    CryptoOpenFailed,

    /// Something went wrong while encrypting that isn't the key's fault.
    #[error("failed to seal data")]
    CryptoSealFailed,

    /// Decryption "worked" but the plaintext is garbage. A strong signal that
    /// the wrong key pair was used.
    #[error("decrypted {0} is garbage (wrong key?)")]
    DecryptionKeyMismatch(String),

    /// A required argument is missing or empty. Always a caller bug.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An IO error
    #[error("io error {0:?}")]
    IoError(#[from] std::io::Error),

    /// Key bytes could not be decoded in the expected encoding.
    #[error("{role} key is not in a recognized format")]
    KeyFormatInvalid {
        role: Role,
        #[source]
        source: KeyDecodeError,
    },

    /// A key's modulus is too small for the payload being encrypted under it.
    #[error("the {0} key is too short to encrypt the required data")]
    KeyTooShort(Role),

    /// The envelope text could not be parsed.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// A block the protocol requires isn't in the envelope.
    #[error("envelope is missing the block {0:?}")]
    MissingBlock(String),

    /// An operation needed a key that was never set.
    #[error("the {role} has no {kind} key set")]
    PreconditionFailed {
        role: Role,
        kind: KeyKind,
    },

    /// An error while engaging in yaml serialization.
    #[error("yaml serialization error")]
    SerializeYaml(#[from] serde_yaml::Error),

    /// The recomputed digest doesn't match the signed one.
    #[error("signature on {0} does not verify (wrong signer key or tampered data)")]
    SignatureInvalid(String),
}

/// Wraps `std::result::Result` around our `Error` enum
pub type Result<T> = std::result::Result<T, Error>;
