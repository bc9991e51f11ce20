//! Utilities. OBVIOUSLY.

use chrono::{DateTime, FixedOffset, Local, Utc};
use serde_derive::{Deserialize, Serialize};
use std::ops::Deref;
use std::str::FromStr;

pub mod ser;

/// A library-local representation of a time.
///
/// Credentials only ever need "right now, in a form a person can read," so
/// this is deliberately thin: construct it, format it, deref it if you need
/// the underlying [DateTime<Utc>](chrono::DateTime).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a new Timestamp from the current date/time.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn local(&self) -> DateTime<Local> {
        DateTime::from(self.0)
    }

    /// RFC 2822 rendering in the host's local time, e.g.
    /// `Tue, 1 Jul 2003 10:52:37 +0200`. Use [`rfc2822_at`](Self::rfc2822_at)
    /// when the zone must not depend on the machine (the desktop tools always
    /// wrote Madrid time).
    pub fn rfc2822(&self) -> String {
        self.local().to_rfc2822()
    }

    /// RFC 2822 rendering at a fixed UTC offset.
    pub fn rfc2822_at(&self, offset: FixedOffset) -> String {
        self.0.with_timezone(&offset).to_rfc2822()
    }
}

impl Deref for Timestamp {
    type Target = DateTime<Utc>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(date: DateTime<Utc>) -> Self {
        Self(date)
    }
}

impl FromStr for Timestamp {
    type Err = chrono::format::ParseError;
    fn from_str(s: &str) -> std::result::Result<Timestamp, Self::Err> {
        let datetime: DateTime<Utc> = s.parse()?;
        Ok(Timestamp(datetime))
    }
}
