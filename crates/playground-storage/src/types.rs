//! Storage-layer types for program identity and records.
//!
//! [`ProgramUid`] is defined here because program identity is a storage
//! concern: a submission only gains a uid once the backend persists it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::StorageError;

/// Identifier assigned to a stored program.
///
/// Rendered the way Dgraph renders uids: `0x` followed by lowercase hex. Every
/// backend uses the same shape so clients never see a backend-specific id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProgramUid(pub u64);

impl ProgramUid {
    /// Parses a `0x`-prefixed hex uid. Decimal and bare hex are rejected.
    pub fn parse(raw: &str) -> Result<Self, StorageError> {
        let hex = raw
            .strip_prefix("0x")
            .or_else(|| raw.strip_prefix("0X"))
            .ok_or_else(|| StorageError::InvalidUid(raw.to_string()))?;
        if hex.is_empty() || hex.len() > 16 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(StorageError::InvalidUid(raw.to_string()));
        }
        u64::from_str_radix(hex, 16)
            .map(ProgramUid)
            .map_err(|_| StorageError::InvalidUid(raw.to_string()))
    }
}

impl fmt::Display for ProgramUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl FromStr for ProgramUid {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProgramUid::parse(s)
    }
}

impl Serialize for ProgramUid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ProgramUid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        ProgramUid::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// A persisted program: the backend-assigned uid plus the code sequence
/// exactly as it was submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredProgram {
    /// Program identifier.
    pub uid: ProgramUid,
    /// The submitted code fragments, in order.
    #[serde(rename = "Code", alias = "code", default)]
    pub code: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dgraph_style_uids() {
        assert_eq!(ProgramUid::parse("0x1").unwrap(), ProgramUid(1));
        assert_eq!(ProgramUid::parse("0x4e21").unwrap(), ProgramUid(0x4e21));
        assert_eq!(ProgramUid::parse("0XFF").unwrap(), ProgramUid(255));
    }

    #[test]
    fn rejects_malformed_uids() {
        for raw in ["", "0x", "12", "0xzz", "0x1) { evil }", "0x11111111111111111"] {
            assert!(
                matches!(ProgramUid::parse(raw), Err(StorageError::InvalidUid(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn displays_as_lowercase_hex() {
        assert_eq!(ProgramUid(0x4E21).to_string(), "0x4e21");
    }

    #[test]
    fn stored_program_reads_dgraph_json() {
        let record: StoredProgram =
            serde_json::from_str(r#"{"uid":"0x2","Code":["print(1)","x"]}"#).unwrap();
        assert_eq!(record.uid, ProgramUid(2));
        assert_eq!(record.code, vec!["print(1)".to_string(), "x".to_string()]);
    }
}
