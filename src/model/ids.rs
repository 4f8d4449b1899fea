//! Record identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wrap a raw store-assigned id.
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// The raw numeric id.
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }
    };
}

record_id!(
    /// Local identity of a process row.
    ProcessId
);

record_id!(
    /// Local identity of a persisted step row.
    StepId
);

record_id!(
    /// Local identity of an artifact row.
    ArtifactId
);

/// Stable identity of a step, assigned when the step is first created in
/// memory and kept across saves, moves, and undo.
///
/// Step routes (`nextType = step`) point at a key rather than an array
/// position, so reordering never retargets them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepKey(Uuid);

impl StepKey {
    /// Generate a fresh random key.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for StepKey {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StepKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StepKey {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_display_raw_value() {
        assert_eq!(ProcessId::new(7).to_string(), "7");
        assert_eq!(StepId::new(12).get(), 12);
    }

    #[test]
    fn ids_parse_with_whitespace() {
        let id: ArtifactId = " 3 ".parse().unwrap();
        assert_eq!(id, ArtifactId::new(3));
        assert!("abc".parse::<ProcessId>().is_err());
    }

    #[test]
    fn ids_serialize_as_plain_numbers() {
        let json = serde_json::to_string(&ProcessId::new(5)).unwrap();
        assert_eq!(json, "5");
    }

    #[test]
    fn step_keys_are_unique() {
        assert_ne!(StepKey::new(), StepKey::new());
    }

    #[test]
    fn step_key_round_trips_through_string() {
        let key = StepKey::new();
        let parsed: StepKey = key.to_string().parse().unwrap();
        assert_eq!(parsed, key);
    }
}
