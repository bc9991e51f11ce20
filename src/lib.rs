//! Welcome to the CPV core, the library behind the virtual pilgrim credential
//! (*credencial peregrina virtual*).
//!
//! A virtual credential replaces the paper booklet pilgrims carry along the
//! Camino. Three parties touch it:
//!
//! 1. The **pilgrim** issues it, sealing their personal details so that only
//! the pilgrim office can read them, and signing them so the office knows who
//! wrote them.
//! 1. Each **hostel** along the way stamps it, appending its own sealed and
//! signed section. A hostel can't read the pilgrim's details or the other
//! stamps, and it can't alter them without the office noticing.
//! 1. The **pilgrim office** opens it at the end, verifying every section it
//! has a key for and decrypting the lot.
//!
//! The credential itself is a plain-text envelope of named, base64-encoded
//! blocks (see [`package`]), so it survives email, copy-paste, and whatever
//! else pilgrims throw at it. Each section in it is a hybrid
//! encrypt-then-sign triple (see [`crypto::SealedSection`]) built from RSA
//! with PKCS#1 v1.5 padding, AES-256 in CTR mode, and SHA-512.
//!
//! The three operations live in [`credential`]. Keys are passed to each call
//! explicitly through a [`keys::KeyMaterial`], and all randomness comes from
//! a caller-supplied rng (see [`crypto::rng_chacha20`] if you don't have one
//! handy).
//!
//! ```ignore
//! let mut rng = cpv_core::crypto::rng_chacha20();
//! let attrs = Attributes::new().with("Name", "Alice");
//! credential::issue(&mut rng, &mut std::io::stdout(), &attrs, &pilgrim_keys)?;
//! ```

pub mod error;
pub(crate) mod util;
pub mod attributes;
pub mod crypto;
pub mod keys;
pub mod package;
pub mod credential;

pub use attributes::Attributes;
pub use credential::{issue, issue_package, open, open_package, stamp, stamp_package, OpenedEnvelope};
pub use error::{Error, Result};
pub use keys::{HostelKey, KeyMaterial, Role, RoleKeys};
pub use package::Package;
pub use util::Timestamp;
