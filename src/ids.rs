//! Request identifiers.

use std::fmt;
use ulid::Ulid;

/// Identifies one request in logs and in the `x-request-id` response header.
///
/// Ids sort by creation time. One arriving from upstream is adopted so a
/// request can be followed across services.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct RequestId(Ulid);

impl RequestId {
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new())
    }

    /// Parse an upstream `x-request-id`; `None` unless it holds a ULID.
    #[must_use]
    pub fn from_header(value: &str) -> Option<Self> {
        Ulid::from_string(value.trim()).ok().map(Self)
    }

    /// Unix time in milliseconds at which the id was minted.
    #[must_use]
    pub fn timestamp_ms(&self) -> u64 {
        self.0.timestamp_ms()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
