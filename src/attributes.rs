//! Attributes are the actual content of a credential: the pilgrim's details,
//! or whatever a hostel wants to say in its stamp. They're a flat string to
//! string map.
//!
//! On the wire, attributes are a tiny subset of JSON:
//!
//! ```text
//! {"Name":"Alice","Hostel":"Albergue de Triacastela"}
//! ```
//!
//! There is no escaping. Instead, the characters that would need it (`{`,
//! `}`, `:`, `,` and `"`) are stripped from keys and values before encoding,
//! so `"12:30"` goes in and `"1230"` comes out. Envelopes written by every
//! other tool in the ecosystem look exactly like this, which is why we don't
//! just use a real JSON library here.

use crate::{
    error::{Error, Result},
    util::Timestamp,
};
use serde_derive::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Characters with meaning in the attribute encoding. They never survive
/// encoding.
pub const RESERVED_CHARS: [char; 5] = ['{', '}', ':', ',', '"'];

/// The attribute issuing tools record a credential's creation time under.
pub const CREATION_DATE_KEY: &str = "Fecha de creación";

fn strip_reserved(val: &str) -> String {
    val.chars().filter(|c| !RESERVED_CHARS.contains(c)).collect()
}

/// A sorted map of credential attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(BTreeMap<String, String>);

impl Attributes {
    /// Create an empty attribute map.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Set an attribute, returning the previous value if there was one.
    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(|v| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Record "now" (RFC 2822, local time) under `key`.
    pub fn set_creation_date<K: Into<String>>(&mut self, key: K) {
        self.insert(key, Timestamp::now().rfc2822());
    }

    /// Encode into the wire form. Reserved characters are silently dropped;
    /// a key that is nothing *but* reserved characters is an error since it
    /// would come back out as an empty key.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = String::from("{");
        for (i, (key, val)) in self.0.iter().enumerate() {
            let key_clean = strip_reserved(key);
            if key_clean.is_empty() {
                Err(Error::InvalidArgument(format!("attribute key {:?} is empty once reserved characters are removed", key)))?;
            }
            if i > 0 {
                out.push(',');
            }
            out.push('"');
            out.push_str(&key_clean);
            out.push_str("\":\"");
            out.push_str(&strip_reserved(val));
            out.push('"');
        }
        out.push('}');
        Ok(out.into_bytes())
    }

    /// Decode the wire form.
    ///
    /// This never fails: anything that can't be made sense of decodes to an
    /// empty map. Since an honest credential never carries an empty map,
    /// callers treat that as "decrypted with the wrong key."
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let text = String::from_utf8_lossy(bytes);
        let content = match (text.find('{'), text.find('}')) {
            (Some(start), Some(end)) if start < end => text[start + 1..end].trim(),
            _ => return Self::new(),
        };
        let mut entries: Vec<&str> = content.split(',').map(str::trim).collect();
        while entries.last().map_or(false, |e| e.is_empty()) {
            entries.pop();
        }
        let mut map = BTreeMap::new();
        for entry in entries {
            let Some((key, val)) = entry.split_once(':') else {
                return Self::new();
            };
            map.insert(key.trim().replace('"', ""), val.trim().replace('"', ""));
        }
        Self(map)
    }
}

impl From<BTreeMap<String, String>> for Attributes {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = (&'a String, &'a String);
    type IntoIter = std::collections::btree_map::Iter<'a, String, String>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
