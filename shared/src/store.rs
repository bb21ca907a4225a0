use std::collections::BTreeMap;

use crate::SensorDatum;
use crate::registry::{SensorDefinition, SensorRegistry};

/// Most recent measurement for one sensor. Replaced wholesale on every poll.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub sensor_id: String,
    pub sensor_name: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub aqi: f64,
    pub no2: f64,
    pub co: f64,
    pub smoke: f64,
}

/// Live readings keyed by sensor id, with the sensor name as a fallback key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiveStateStore {
    by_id: BTreeMap<String, Reading>,
    name_to_id: BTreeMap<String, String>,
}

impl LiveStateStore {
    /// Builds a fresh store from an index-aligned payload. Only the first
    /// `active_count` elements are considered. Elements whose index has no
    /// registry entry, or with a null measurement, are dropped.
    pub fn from_payload(
        registry: &SensorRegistry,
        data: &[SensorDatum],
        active_count: u32,
    ) -> Self {
        let mut store = Self::default();
        for (pos, datum) in data.iter().take(active_count as usize).enumerate() {
            let index = pos as u32 + 1;
            let Some(def) = registry.get(index) else {
                tracing::warn!("sensor payload slot {index} has no registry entry");
                continue;
            };
            let Some((aqi, no2, co, smoke)) = datum.measures() else {
                tracing::debug!("sensor {} reported a null measurement", def.id);
                continue;
            };
            store.insert(Reading {
                sensor_id: def.id.clone(),
                sensor_name: def.name.clone(),
                lat: datum.latitude,
                lng: datum.longitude,
                aqi,
                no2,
                co,
                smoke,
            });
        }
        store
    }

    pub fn insert(&mut self, reading: Reading) {
        self.name_to_id
            .insert(reading.sensor_name.clone(), reading.sensor_id.clone());
        self.by_id.insert(reading.sensor_id.clone(), reading);
    }

    /// Looks a sensor up by id first, then by name.
    pub fn lookup(&self, id: &str, name: &str) -> Option<&Reading> {
        self.by_id.get(id).or_else(|| {
            self.name_to_id
                .get(name)
                .and_then(|id| self.by_id.get(id))
                .or_else(|| self.by_id.get(name))
        })
    }

    pub fn for_sensor(&self, def: &SensorDefinition) -> Option<&Reading> {
        self.lookup(&def.id, &def.name)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Reading> {
        self.by_id.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.by_id.keys().map(String::as_str)
    }

    pub fn average_aqi(&self) -> Option<f64> {
        if self.by_id.is_empty() {
            return None;
        }
        let sum: f64 = self.by_id.values().map(|r| r.aqi).sum();
        Some(sum / self.by_id.len() as f64)
    }
}

/// Dispatch-order tag attached to an in-flight poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PollTicket(u64);

impl PollTicket {
    pub fn seq(&self) -> u64 {
        self.0
    }
}

/// Latest-dispatched-wins ordering for one endpoint. Each request takes a
/// ticket at dispatch; a completion older than the last applied one is stale.
#[derive(Debug, Clone, Default)]
pub struct PollSequencer {
    next: u64,
    last_applied: Option<u64>,
}

impl PollSequencer {
    pub fn dispatch(&mut self) -> PollTicket {
        self.next += 1;
        PollTicket(self.next)
    }

    pub fn is_stale(&self, ticket: PollTicket) -> bool {
        self.last_applied.is_some_and(|last| ticket.0 < last)
    }

    /// Records `ticket` as applied. Returns `false` (and records nothing) when stale.
    pub fn try_apply(&mut self, ticket: PollTicket) -> bool {
        if self.is_stale(ticket) {
            return false;
        }
        self.last_applied = Some(ticket.0);
        true
    }

    pub fn last_applied(&self) -> Option<u64> {
        self.last_applied
    }
}
