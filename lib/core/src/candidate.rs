use crate::frequency::FrequencyTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One store record from the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Store identifier (the store name in the shipped catalog)
    pub id: String,
    pub address: String,
    pub store_type: String,
    /// Named boolean attributes such as `parking` or `petZone`
    pub flags: BTreeMap<String, bool>,
    pub frequency: FrequencyTable,
    /// Zero-based position in the catalog; ranking ties fall back to it
    pub position: usize,
}

impl Candidate {
    pub fn new(id: impl Into<String>, frequency: FrequencyTable) -> Self {
        Self {
            id: id.into(),
            address: String::new(),
            store_type: String::new(),
            flags: BTreeMap::new(),
            frequency,
            position: 0,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    pub fn with_store_type(mut self, store_type: impl Into<String>) -> Self {
        self.store_type = store_type.into();
        self
    }

    pub fn with_flag(mut self, name: impl Into<String>, value: bool) -> Self {
        self.flags.insert(name.into(), value);
        self
    }

    pub fn with_position(mut self, position: usize) -> Self {
        self.position = position;
        self
    }

    #[inline]
    pub fn flag(&self, name: &str) -> Option<bool> {
        self.flags.get(name).copied()
    }
}

/// One entry of a recommendation: the store identifier and its score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedStore {
    pub identifier: String,
    pub score: f64,
}

impl RankedStore {
    pub fn new(identifier: impl Into<String>, score: f64) -> Self {
        Self {
            identifier: identifier.into(),
            score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_flags() {
        let candidate = Candidate::new("강남R점", FrequencyTable::new())
            .with_address("서울특별시 강남구 테헤란로 1")
            .with_store_type("리저브")
            .with_flag("parking", true)
            .with_flag("petZone", false)
            .with_position(4);

        assert_eq!(candidate.flag("parking"), Some(true));
        assert_eq!(candidate.flag("petZone"), Some(false));
        assert_eq!(candidate.flag("subway"), None);
        assert_eq!(candidate.position, 4);
    }

    #[test]
    fn test_ranked_store_json_shape() {
        let json = serde_json::to_value(RankedStore::new("역삼점", 4.0)).unwrap();
        assert_eq!(json, serde_json::json!({"identifier": "역삼점", "score": 4.0}));
    }
}
