//! Helpful serialization tools.
//!
//! The envelope format wants plain, padded, standard-alphabet base64 (the
//! flavor every other base64 tool on the planet speaks by default), and the
//! opened credential wants a human-readable dump. Both live here.

use crate::error::Result;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;

/// Convert bytes to base64
pub fn base64_encode<T: AsRef<[u8]>>(bytes: T) -> String {
    STANDARD.encode(bytes.as_ref())
}

/// Convert base64 back into bytes
pub fn base64_decode<T: AsRef<[u8]>>(bytes: T) -> std::result::Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(bytes.as_ref())
}

#[cfg_attr(not(feature = "yaml-export"), allow(dead_code))]
pub(crate) fn serialize_human<T: Serialize>(obj: &T) -> Result<String> {
    Ok(serde_yaml::to_string(obj)?)
}
