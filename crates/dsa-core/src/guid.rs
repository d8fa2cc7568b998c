use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// Stable identifier that survives export, import and sync.
///
/// Characters and potions carry one. Local row ids are device specific and
/// must never cross the export boundary; a `Guid` is what does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Guid(pub Uuid);

impl Guid {
    /// Generate a new random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Short form used in log lines.
    pub fn short(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for Guid {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Guid {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| CoreError::InvalidGuid(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_full_hyphenated_uuid() {
        let guid: Guid = "a3f2b1c8-1234-5678-9abc-def012345678".parse().unwrap();
        assert_eq!(guid.to_string(), "a3f2b1c8-1234-5678-9abc-def012345678");
        assert_eq!(guid.short(), "a3f2b1c8");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("not-a-guid".parse::<Guid>().is_err());
    }

    #[test]
    fn serializes_as_plain_string() {
        let guid: Guid = "a3f2b1c8-1234-5678-9abc-def012345678".parse().unwrap();
        let json = serde_json::to_string(&guid).unwrap();
        assert_eq!(json, "\"a3f2b1c8-1234-5678-9abc-def012345678\"");
    }

    #[test]
    fn new_guids_differ() {
        assert_ne!(Guid::new(), Guid::new());
    }
}
