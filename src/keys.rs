//! Key slots: whatever keys one logical operation needs, per role.
//!
//! Nothing here is global. Build a [`KeyMaterial`] (or a few [`RoleKeys`])
//! right before you issue, stamp, or open a credential and hand it to the
//! operation. Keys are decoded when they're set, so a garbage key file blows
//! up at load time rather than halfway through sealing.

use crate::{
    crypto::{PrivateKey, PublicKey},
    error::{Error, Result},
};
use serde_derive::{Deserialize, Serialize};
use std::path::Path;

/// The three parties that touch a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Owns the credential and issues it.
    Pilgrim,
    /// Stamps the credential along the way.
    Hostel,
    /// Receives the credential and opens it.
    Office,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pilgrim => write!(f, "pilgrim"),
            Self::Hostel => write!(f, "hostel"),
            Self::Office => write!(f, "pilgrim office"),
        }
    }
}

/// Which half of a keypair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Private,
    Public,
}

impl std::fmt::Display for KeyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Private => write!(f, "private"),
            Self::Public => write!(f, "public"),
        }
    }
}

/// The (optional) private and public key for a single role.
#[derive(Debug, Clone, getset::Getters)]
pub struct RoleKeys {
    /// Whose keys these are.
    #[getset(get = "pub")]
    role: Role,
    private_key: Option<PrivateKey>,
    public_key: Option<PublicKey>,
}

impl RoleKeys {
    /// An empty slot for `role`.
    pub fn new(role: Role) -> Self {
        Self {
            role,
            private_key: None,
            public_key: None,
        }
    }

    /// Fill both halves from a private key.
    pub fn from_private_key(key: PrivateKey) -> Self {
        Self {
            role: *key.role(),
            public_key: Some(key.public_key()),
            private_key: Some(key),
        }
    }

    /// Set the private key from its PKCS#8 (DER) bytes.
    pub fn set_private_key(&mut self, der: &[u8]) -> Result<()> {
        self.private_key = Some(PrivateKey::from_pkcs8_der(self.role, der)?);
        Ok(())
    }

    /// Set the public key from its X.509 SubjectPublicKeyInfo (DER) bytes.
    pub fn set_public_key(&mut self, der: &[u8]) -> Result<()> {
        self.public_key = Some(PublicKey::from_spki_der(self.role, der)?);
        Ok(())
    }

    /// Builder-flavored [`set_private_key`](Self::set_private_key).
    pub fn with_private_key(mut self, der: &[u8]) -> Result<Self> {
        self.set_private_key(der)?;
        Ok(self)
    }

    /// Builder-flavored [`set_public_key`](Self::set_public_key).
    pub fn with_public_key(mut self, der: &[u8]) -> Result<Self> {
        self.set_public_key(der)?;
        Ok(self)
    }

    /// Read a PKCS#8 private key file (the `.privada` files the key generator
    /// writes) and set it.
    pub fn load_private_key<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let der = std::fs::read(path)?;
        self.set_private_key(&der)
    }

    /// Read an X.509 public key file and set it.
    pub fn load_public_key<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let der = std::fs::read(path)?;
        self.set_public_key(&der)
    }

    /// Grab the private key, or complain that nobody set one.
    pub fn private_key(&self) -> Result<&PrivateKey> {
        self.private_key.as_ref()
            .ok_or(Error::PreconditionFailed { role: self.role, kind: KeyKind::Private })
    }

    /// Grab the public key, or complain that nobody set one.
    pub fn public_key(&self) -> Result<&PublicKey> {
        self.public_key.as_ref()
            .ok_or(Error::PreconditionFailed { role: self.role, kind: KeyKind::Public })
    }

    pub fn has_private_key(&self) -> bool {
        self.private_key.is_some()
    }

    pub fn has_public_key(&self) -> bool {
        self.public_key.is_some()
    }
}

/// All the key slots for one operation: one [`RoleKeys`] per role.
///
/// Which slots must be filled depends on the operation:
///
/// - issue: office public, pilgrim private
/// - stamp: office public, hostel private
/// - open: office private, pilgrim public (hostel keys come in separately as
///   [`HostelKey`]s since there can be many)
#[derive(Debug, Clone, getset::Getters, getset::MutGetters)]
#[getset(get = "pub", get_mut = "pub")]
pub struct KeyMaterial {
    pilgrim: RoleKeys,
    hostel: RoleKeys,
    office: RoleKeys,
}

impl KeyMaterial {
    /// Create a set of empty slots.
    pub fn new() -> Self {
        Self {
            pilgrim: RoleKeys::new(Role::Pilgrim),
            hostel: RoleKeys::new(Role::Hostel),
            office: RoleKeys::new(Role::Office),
        }
    }

    /// The slot for `role`.
    pub fn role(&self, role: Role) -> &RoleKeys {
        match role {
            Role::Pilgrim => &self.pilgrim,
            Role::Hostel => &self.hostel,
            Role::Office => &self.office,
        }
    }

    /// The slot for `role`, mutably.
    pub fn role_mut(&mut self, role: Role) -> &mut RoleKeys {
        match role {
            Role::Pilgrim => &mut self.pilgrim,
            Role::Hostel => &mut self.hostel,
            Role::Office => &mut self.office,
        }
    }
}

impl Default for KeyMaterial {
    fn default() -> Self {
        Self::new()
    }
}

/// A hostel identifier paired with the public key its stamps are verified
/// against.
#[derive(Debug, Clone, PartialEq, getset::Getters)]
#[getset(get = "pub")]
pub struct HostelKey {
    /// The identifier substituted into the hostel's block names.
    id: String,
    /// The hostel's public key.
    public_key: PublicKey,
}

impl HostelKey {
    /// Pair an id with an X.509 (DER) public key.
    pub fn new<S: Into<String>>(id: S, der: &[u8]) -> Result<Self> {
        Ok(Self {
            id: id.into(),
            public_key: PublicKey::from_spki_der(Role::Hostel, der)?,
        })
    }

    /// Pair an id with an already-decoded public key.
    pub fn from_public_key<S: Into<String>>(id: S, public_key: PublicKey) -> Self {
        Self { id: id.into(), public_key }
    }

    /// Pair an id with a public key read from a file.
    pub fn load<S: Into<String>, P: AsRef<Path>>(id: S, path: P) -> Result<Self> {
        let der = std::fs::read(path)?;
        Self::new(id, &der)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::KeyDecodeError, util::test};

    #[test]
    fn rolekeys_unset_is_precondition_failed() {
        let keys = RoleKeys::new(Role::Hostel);
        match keys.private_key() {
            Err(Error::PreconditionFailed { role, kind }) => {
                assert_eq!(role, Role::Hostel);
                assert_eq!(kind, KeyKind::Private);
            }
            _ => panic!("expected PreconditionFailed"),
        }
        assert!(matches!(keys.public_key(), Err(Error::PreconditionFailed { role: Role::Hostel, kind: KeyKind::Public })));
        assert!(!keys.has_private_key());
        assert!(!keys.has_public_key());
        let err = keys.public_key().unwrap_err();
        assert_eq!(err.to_string(), "the hostel has no public key set");
    }

    #[test]
    fn rolekeys_set_and_get() {
        let fixture = test::keys();
        let keys = RoleKeys::new(Role::Office)
            .with_private_key(&test::private_der(&fixture.office)).unwrap()
            .with_public_key(&test::public_der(&fixture.office)).unwrap();
        assert_eq!(keys.private_key().unwrap().role(), &Role::Office);
        assert_eq!(&keys.private_key().unwrap().public_key(), keys.public_key().unwrap());
    }

    #[test]
    fn rolekeys_bad_bytes_keep_previous_key() {
        let fixture = test::keys();
        let mut keys = RoleKeys::new(Role::Pilgrim);
        keys.set_public_key(&test::public_der(&fixture.pilgrim)).unwrap();
        let res = keys.set_public_key(b"\x30\x03\x02\x01\x01");
        assert!(matches!(res, Err(Error::KeyFormatInvalid { role: Role::Pilgrim, source: KeyDecodeError::Spki(_) })));
        assert!(keys.has_public_key());
    }

    #[test]
    fn rolekeys_load_from_files() {
        let fixture = test::keys();
        let dir = std::env::temp_dir().join(format!("cpv-keys-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let priv_path = dir.join("hostel.privada");
        let pub_path = dir.join("hostel.publica");
        std::fs::write(&priv_path, test::private_der(&fixture.hostel)).unwrap();
        std::fs::write(&pub_path, test::public_der(&fixture.hostel)).unwrap();

        let mut keys = RoleKeys::new(Role::Hostel);
        keys.load_private_key(&priv_path).unwrap();
        keys.load_public_key(&pub_path).unwrap();
        let hostel = HostelKey::load("H7", &pub_path).unwrap();
        assert_eq!(hostel.public_key(), keys.public_key().unwrap());
        assert_eq!(hostel.id(), "H7");

        let res = keys.load_private_key(dir.join("nope.privada"));
        assert!(matches!(res, Err(Error::IoError(_))));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn rolekeys_from_private_key_fills_both_halves() {
        let fixture = test::keys();
        let private = PrivateKey::from_pkcs8_der(Role::Hostel, &test::private_der(&fixture.hostel)).unwrap();
        let keys = RoleKeys::from_private_key(private);
        assert_eq!(keys.role(), &Role::Hostel);
        assert!(keys.has_private_key());
        assert_eq!(keys.public_key().unwrap(), &PublicKey::from_spki_der(Role::Hostel, &test::public_der(&fixture.hostel)).unwrap());

        let hostel = HostelKey::from_public_key("H7", keys.public_key().unwrap().clone());
        assert_eq!(hostel, test::hostel_key("H7", &fixture.hostel));
    }

    #[test]
    fn keymaterial_slots_are_labeled() {
        let mut material = KeyMaterial::new();
        for role in [Role::Pilgrim, Role::Hostel, Role::Office] {
            assert_eq!(material.role(role).role(), &role);
        }
        let fixture = test::keys();
        material.role_mut(Role::Office).set_public_key(&test::public_der(&fixture.office)).unwrap();
        assert!(material.office().has_public_key());
        assert!(!material.office().has_private_key());
        assert_eq!(Role::Office.to_string(), "pilgrim office");
    }
}
