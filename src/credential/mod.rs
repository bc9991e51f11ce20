//! The credential protocol: issue, stamp, open.
//!
//! A credential starts life when the pilgrim *issues* it: their attributes
//! are sealed for the pilgrim office and signed by the pilgrim, producing the
//! three `PILGRIM_*` blocks. Along the way, each hostel *stamps* it by
//! appending its own three `STAMP_*{ID}` blocks, sealed for the office and
//! signed by the hostel. Hostels can't read the pilgrim's data or each
//! other's stamps. They just add to the pile. Finally, the office *opens* the
//! credential, checking every signature it has a key for and decrypting
//! everything.
//!
//! Every operation comes in two flavors: one that works on a [`Package`] in
//! memory (`*_package`) and one that reads and/or writes the envelope text
//! on a stream.

pub mod names;

use crate::{
    attributes::Attributes,
    crypto::{PrivateKey, PublicKey, SealedSection},
    error::{Error, Result},
    keys::{HostelKey, KeyMaterial},
    package::Package,
};
use names::SectionNames;
use rand::{CryptoRng, RngCore};
use serde_derive::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use tracing::{debug, warn};

/// Everything the office gets out of a credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, getset::Getters)]
#[getset(get = "pub")]
pub struct OpenedEnvelope {
    /// The pilgrim's own attributes.
    pilgrim: Attributes,
    /// Each verified stamp, keyed by hostel id.
    stamps: BTreeMap<String, Attributes>,
    /// Hostels we were asked about that never stamped this credential.
    skipped: Vec<String>,
}

impl OpenedEnvelope {
    /// Render the opened credential for a human.
    #[cfg(feature = "yaml-export")]
    pub fn to_yaml(&self) -> Result<String> {
        crate::util::ser::serialize_human(self)
    }

    /// Consume this result, returning `(pilgrim, stamps, skipped)`.
    pub fn into_parts(self) -> (Attributes, BTreeMap<String, Attributes>, Vec<String>) {
        (self.pilgrim, self.stamps, self.skipped)
    }
}

/// Seal `attributes` and store the resulting triple under `names`.
fn seal_section<R: RngCore + CryptoRng>(
    rng: &mut R,
    package: &mut Package,
    names: &SectionNames,
    attributes: &Attributes,
    recipient: &PublicKey,
    signer: &PrivateKey,
) -> Result<()> {
    if attributes.is_empty() {
        Err(Error::InvalidArgument(format!("no attributes given for {}", names.data)))?;
    }
    let plaintext = attributes.to_bytes()?;
    let (data, key, digest) = SealedSection::seal(rng, recipient, signer, &plaintext)?.into_parts();
    package.add(names.data.as_str(), data)?;
    package.add(names.key.as_str(), key)?;
    package.add(names.digest.as_str(), digest)?;
    Ok(())
}

/// Pull a section's triple out of a package. No data block means no section
/// (`None`). A data block without its key or digest is a broken envelope.
fn find_section(package: &Package, names: &SectionNames) -> Result<Option<SealedSection>> {
    let data = match package.get(&names.data) {
        Some(data) => data,
        None => return Ok(None),
    };
    let key = package.get(&names.key)
        .ok_or_else(|| Error::MissingBlock(names.key.clone()))?;
    let digest = package.get(&names.digest)
        .ok_or_else(|| Error::MissingBlock(names.digest.clone()))?;
    Ok(Some(SealedSection::new(data.to_vec(), key.to_vec(), digest.to_vec())))
}

/// Verify, decrypt, and decode one section.
fn open_section(section: &SealedSection, signer: &PublicKey, recipient: &PrivateKey, label: &str) -> Result<Attributes> {
    section.verify(signer, label)?;
    let plaintext = section.open(recipient)?;
    let attributes = Attributes::from_bytes(&plaintext);
    if attributes.is_empty() {
        Err(Error::DecryptionKeyMismatch(label.into()))?;
    }
    Ok(attributes)
}

/// Create a new credential package holding the pilgrim's sealed attributes.
///
/// Needs the office's public key and the pilgrim's private key.
pub fn issue_package<R: RngCore + CryptoRng>(rng: &mut R, attributes: &Attributes, keys: &KeyMaterial) -> Result<Package> {
    let office = keys.office().public_key()?;
    let pilgrim = keys.pilgrim().private_key()?;
    let mut package = Package::new();
    seal_section(rng, &mut package, &names::pilgrim_names(), attributes, office, pilgrim)?;
    debug!(attributes = attributes.len(), "issued credential");
    Ok(package)
}

/// Issue a credential and write its envelope to `writer`.
pub fn issue<R, W>(rng: &mut R, writer: &mut W, attributes: &Attributes, keys: &KeyMaterial) -> Result<()>
    where R: RngCore + CryptoRng,
          W: Write,
{
    issue_package(rng, attributes, keys)?.write_to(writer)
}

/// Add a hostel's stamp to an existing credential package.
///
/// Needs the office's public key and the hostel's private key. Every block
/// already in the package is left alone, unless this hostel stamped before,
/// in which case its old stamp is replaced.
pub fn stamp_package<R: RngCore + CryptoRng>(
    rng: &mut R,
    package: &mut Package,
    hostel_id: &str,
    attributes: &Attributes,
    keys: &KeyMaterial,
) -> Result<()> {
    if hostel_id.is_empty() {
        Err(Error::InvalidArgument("hostel id cannot be empty".into()))?;
    }
    let office = keys.office().public_key()?;
    let hostel = keys.hostel().private_key()?;
    if package.get(names::PILGRIM_DATA).is_none() {
        warn!(hostel_id, "stamping an envelope that has no pilgrim data");
    }
    let stamp_names = names::stamp_names(hostel_id);
    if package.get(&stamp_names.data).is_some() {
        debug!(hostel_id, "replacing an existing stamp");
    }
    seal_section(rng, package, &stamp_names, attributes, office, hostel)?;
    debug!(hostel_id, blocks = package.len(), "stamped credential");
    Ok(())
}

/// Read an envelope from `reader`, stamp it, and write the result to
/// `writer`.
pub fn stamp<R, I, W>(
    rng: &mut R,
    reader: I,
    writer: &mut W,
    hostel_id: &str,
    attributes: &Attributes,
    keys: &KeyMaterial,
) -> Result<()>
    where R: RngCore + CryptoRng,
          I: BufRead,
          W: Write,
{
    let mut package = Package::read_from(reader)?;
    stamp_package(rng, &mut package, hostel_id, attributes, keys)?;
    package.write_to(writer)
}

/// Verify and decrypt a credential package.
///
/// Needs the office's private key and the pilgrim's public key, plus the
/// public key of every hostel whose stamp we want to read. A hostel that
/// never stamped this credential is noted in
/// [`skipped`](OpenedEnvelope::skipped) rather than treated as an error, but
/// a stamp that is there and doesn't check out fails the whole thing.
pub fn open_package(package: &Package, keys: &KeyMaterial, hostels: &[HostelKey]) -> Result<OpenedEnvelope> {
    let office = keys.office().private_key()?;
    let pilgrim_key = keys.pilgrim().public_key()?;

    let section = find_section(package, &names::pilgrim_names())?
        .ok_or_else(|| Error::MissingBlock(names::PILGRIM_DATA.into()))?;
    let pilgrim = open_section(&section, pilgrim_key, office, "pilgrim data")?;

    let mut stamps = BTreeMap::new();
    let mut skipped = Vec::new();
    for hostel in hostels {
        let hostel_id = hostel.id().as_str();
        let section = match find_section(package, &names::stamp_names(hostel_id))? {
            Some(section) => section,
            None => {
                warn!(hostel_id, "no stamp from this hostel, skipping");
                skipped.push(hostel_id.to_string());
                continue;
            }
        };
        let label = format!("stamp from hostel {}", hostel_id);
        let attributes = open_section(&section, hostel.public_key(), office, &label)?;
        stamps.insert(hostel_id.to_string(), attributes);
    }

    debug!(stamps = stamps.len(), skipped = skipped.len(), "opened credential");
    Ok(OpenedEnvelope { pilgrim, stamps, skipped })
}

/// Read an envelope from `reader`, then verify and decrypt it.
pub fn open<I: BufRead>(reader: I, keys: &KeyMaterial, hostels: &[HostelKey]) -> Result<OpenedEnvelope> {
    let package = Package::read_from(reader)?;
    open_package(&package, keys, hostels)
}
