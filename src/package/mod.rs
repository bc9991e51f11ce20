//! A package is the in-memory form of an envelope: an ordered set of named
//! byte blocks. It knows nothing about cryptography or about the text format
//! (see [`codec`] for that). It just stores blocks.

pub mod codec;

use crate::error::{Error, Result};
use serde_derive::{Deserialize, Serialize};
use std::io::{BufRead, Write};

/// A named chunk of binary data inside a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, getset::Getters)]
#[getset(get = "pub")]
pub struct Block {
    /// The block's label. Unique within a package.
    name: String,
    /// Whatever bytes the block carries.
    content: Vec<u8>,
}

/// An ordered collection of uniquely-named blocks.
///
/// Adding a block under a name that already exists replaces its content but
/// keeps its position, so re-stamping doesn't shuffle the envelope around.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    blocks: Vec<Block>,
}

impl Package {
    /// Create an empty package.
    pub fn new() -> Self {
        Self { blocks: Vec::new() }
    }

    /// Store (or replace) a block.
    ///
    /// The name must be non-empty and must fit on one line, otherwise the
    /// package could never be written out.
    pub fn add<S: Into<String>, C: Into<Vec<u8>>>(&mut self, name: S, content: C) -> Result<()> {
        let name = name.into();
        if name.is_empty() {
            Err(Error::InvalidArgument("block name cannot be empty".into()))?;
        }
        if name.contains(['\n', '\r']) {
            Err(Error::InvalidArgument(format!("block name {:?} contains a line break", name)))?;
        }
        let content = content.into();
        match self.blocks.iter_mut().find(|b| b.name == name) {
            Some(existing) => existing.content = content,
            None => self.blocks.push(Block { name, content }),
        }
        Ok(())
    }

    /// Look a block up by name. A missing block is `None`, not an error:
    /// plenty of blocks (a given hostel's stamp, say) are optional.
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.blocks.iter()
            .find(|b| b.name == name)
            .map(|b| b.content.as_slice())
    }

    /// Drop a block, returning its content if it was there.
    pub fn remove(&mut self, name: &str) -> Option<Vec<u8>> {
        let idx = self.blocks.iter().position(|b| b.name == name)?;
        Some(self.blocks.remove(idx).content)
    }

    /// All block names, in insertion order.
    pub fn names(&self) -> Vec<&str> {
        self.blocks.iter().map(|b| b.name.as_str()).collect()
    }

    /// All blocks, in insertion order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Parse a package from an envelope stream. See [`codec::read_package`].
    pub fn read_from<R: BufRead>(reader: R) -> Result<Self> {
        codec::read_package(reader)
    }

    /// Serialize this package into an envelope stream. See
    /// [`codec::write_package`].
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        codec::write_package(writer, self)
    }

    /// Render the envelope text for this package.
    pub fn to_text(&self) -> String {
        codec::encode(self)
    }

    /// Parse envelope text.
    pub fn from_text(text: &str) -> Result<Self> {
        codec::read_package(text.as_bytes())
    }
}
