//! Query result model structs.
//!
//! All structs derive `Serialize` so the command layer can print them as JSON.

use serde::Serialize;

/// Structure metadata for listings and advisories.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StructureInfo {
    pub id: i64,
    /// Display name, quoted in deactivation advisories.
    pub name: String,
    /// Inactive structures are skipped by batch computations.
    pub active: bool,
}

/// A message attached to a structure, such as a deactivation notice.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Advisory {
    pub structure_id: i64,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structure_info_serializes() {
        let info = StructureInfo {
            id: 4,
            name: "Pont Neuf".to_string(),
            active: true,
        };
        let json = serde_json::to_string(&info).unwrap();
        assert_eq!(json, r#"{"id":4,"name":"Pont Neuf","active":true}"#);
    }
}
