use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Identity of one physical sensor slot, keyed by its 1-based index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorDefinition {
    pub index: u32,
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid registry JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("registry must be an object keyed by index or an array")]
    Shape,
}

// Page-supplied entry; the index comes from the surrounding key or position.
#[derive(Deserialize)]
struct RawEntry {
    id: String,
    name: String,
    #[serde(default, alias = "latitude")]
    lat: Option<f64>,
    #[serde(default, alias = "longitude", alias = "lon")]
    lng: Option<f64>,
}

/// Static index → sensor mapping handed over by the page at load time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SensorRegistry {
    by_index: BTreeMap<u32, SensorDefinition>,
}

impl SensorRegistry {
    pub fn new(defs: impl IntoIterator<Item = SensorDefinition>) -> Self {
        let by_index = defs
            .into_iter()
            .filter(|d| d.index >= 1)
            .map(|d| (d.index, d))
            .collect();
        Self { by_index }
    }

    /// Accepts `{"1": {...}, "2": {...}}` or `[{...}, {...}]` (position 0 is index 1).
    /// Entries with a non-numeric or zero key are skipped with a warning.
    pub fn from_json(raw: &str) -> Result<Self, RegistryError> {
        let value: serde_json::Value = serde_json::from_str(raw)?;
        let mut defs = Vec::new();

        match value {
            serde_json::Value::Object(map) => {
                for (key, entry) in map {
                    let Ok(index) = key.trim().parse::<u32>() else {
                        tracing::warn!("ignoring sensor registry key {key:?}");
                        continue;
                    };
                    if index == 0 {
                        tracing::warn!("ignoring sensor registry index 0");
                        continue;
                    }
                    let e: RawEntry = serde_json::from_value(entry)?;
                    defs.push(SensorDefinition {
                        index,
                        id: e.id,
                        name: e.name,
                        lat: e.lat,
                        lng: e.lng,
                    });
                }
            }
            serde_json::Value::Array(items) => {
                for (pos, entry) in items.into_iter().enumerate() {
                    let e: RawEntry = serde_json::from_value(entry)?;
                    defs.push(SensorDefinition {
                        index: pos as u32 + 1,
                        id: e.id,
                        name: e.name,
                        lat: e.lat,
                        lng: e.lng,
                    });
                }
            }
            _ => return Err(RegistryError::Shape),
        }

        Ok(Self::new(defs))
    }

    pub fn get(&self, index: u32) -> Option<&SensorDefinition> {
        self.by_index.get(&index)
    }

    pub fn len(&self) -> usize {
        self.by_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_index.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SensorDefinition> {
        self.by_index.values()
    }

    /// Definitions for the closed interval `[1, count]`, in index order.
    pub fn active(&self, count: u32) -> impl Iterator<Item = &SensorDefinition> {
        self.by_index.range(1..=count).map(|(_, d)| d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_object_keyed_by_index() {
        let reg = SensorRegistry::from_json(
            r#"{"1":{"id":"AQ-001","name":"Downtown","lat":6.52,"lng":3.37},
                "2":{"id":"AQ-002","name":"Harbour"}}"#,
        )
        .expect("registry should parse");

        assert_eq!(reg.len(), 2);
        assert_eq!(reg.get(1).map(|d| d.id.as_str()), Some("AQ-001"));
        assert_eq!(reg.get(1).and_then(|d| d.lat), Some(6.52));
        assert_eq!(reg.get(2).and_then(|d| d.lat), None);
        assert!(reg.get(3).is_none());
    }

    #[test]
    fn parses_array_as_one_based() {
        let reg = SensorRegistry::from_json(
            r#"[{"id":"a","name":"A"},{"id":"b","name":"B","latitude":1.0,"longitude":2.0}]"#,
        )
        .expect("registry should parse");
        assert_eq!(reg.get(1).map(|d| d.name.as_str()), Some("A"));
        assert_eq!(reg.get(2).and_then(|d| d.lng), Some(2.0));
    }

    #[test]
    fn skips_bad_keys() {
        let reg = SensorRegistry::from_json(
            r#"{"0":{"id":"z","name":"Z"},"x":{"id":"x","name":"X"},"3":{"id":"c","name":"C"}}"#,
        )
        .expect("registry should parse");
        assert_eq!(reg.len(), 1);
        assert!(reg.get(3).is_some());
    }

    #[test]
    fn rejects_scalars() {
        assert!(matches!(
            SensorRegistry::from_json("42"),
            Err(RegistryError::Shape)
        ));
    }

    #[test]
    fn active_range_is_closed_and_sparse_safe() {
        let reg = SensorRegistry::from_json(
            r#"{"1":{"id":"a","name":"A"},"3":{"id":"c","name":"C"},"4":{"id":"d","name":"D"}}"#,
        )
        .expect("registry should parse");
        let ids: Vec<_> = reg.active(3).map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }
}
