//! Block names used inside a credential envelope.
//!
//! Hostel blocks are templates: `{ID}` is replaced, verbatim, with the
//! hostel's identifier. No case folding, no trimming. `"H7"` and `"h7 "` are
//! different hostels.

/// Placeholder for the hostel identifier in the stamp templates.
pub const ID_PLACEHOLDER: &str = "{ID}";

pub const PILGRIM_DATA: &str = "PILGRIM_DATA";
pub const PILGRIM_DATA_KEY: &str = "PILGRIM_DATA_KEY";
pub const PILGRIM_DATA_DIGEST: &str = "PILGRIM_DATA_DIGEST";

pub const STAMP_DATA: &str = "STAMP_DATA{ID}";
pub const STAMP_DATA_KEY: &str = "STAMP_DATA_KEY{ID}";
pub const STAMP_DATA_DIGEST: &str = "STAMP_DATA_DIGEST{ID}";

/// The `(data, key, digest)` block names for one section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionNames {
    pub data: String,
    pub key: String,
    pub digest: String,
}

/// Block names for the pilgrim's own section.
pub fn pilgrim_names() -> SectionNames {
    SectionNames {
        data: PILGRIM_DATA.into(),
        key: PILGRIM_DATA_KEY.into(),
        digest: PILGRIM_DATA_DIGEST.into(),
    }
}

/// Block names for a given hostel's stamp.
pub fn stamp_names(hostel_id: &str) -> SectionNames {
    SectionNames {
        data: STAMP_DATA.replace(ID_PLACEHOLDER, hostel_id),
        key: STAMP_DATA_KEY.replace(ID_PLACEHOLDER, hostel_id),
        digest: STAMP_DATA_DIGEST.replace(ID_PLACEHOLDER, hostel_id),
    }
}
