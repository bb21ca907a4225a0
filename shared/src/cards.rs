use std::collections::HashMap;

use crate::aqi::{self, AqiCategory};
use crate::registry::SensorRegistry;
use crate::store::{LiveStateStore, Reading};

/// Identity a card is reconciled on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardKey {
    pub sensor_id: String,
    pub index: u32,
}

impl CardKey {
    /// Stable string usable as a render key.
    pub fn dom_key(&self) -> String {
        format!("{}#{}", self.index, self.sensor_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CardContent {
    Loading,
    Live {
        aqi: f64,
        no2: f64,
        co: f64,
        smoke: f64,
    },
}

impl CardContent {
    fn from_reading(reading: Option<&Reading>) -> Self {
        match reading {
            Some(r) => CardContent::Live {
                aqi: r.aqi,
                no2: r.no2,
                co: r.co,
                smoke: r.smoke,
            },
            None => CardContent::Loading,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub key: CardKey,
    pub name: String,
    pub content: CardContent,
    pub flipped: bool,
}

impl Card {
    pub fn aqi(&self) -> Option<f64> {
        match self.content {
            CardContent::Live { aqi, .. } => Some(aqi),
            CardContent::Loading => None,
        }
    }

    pub fn category(&self) -> Option<AqiCategory> {
        self.aqi().map(AqiCategory::from_aqi)
    }

    pub fn category_label(&self) -> &'static str {
        aqi::category_label(self.aqi())
    }

    pub fn color(&self) -> &'static str {
        aqi::category_color(self.aqi())
    }

    /// CSS status class of the badge: "online" once data arrived.
    pub fn status(&self) -> &'static str {
        match self.content {
            CardContent::Live { .. } => "online",
            CardContent::Loading => "loading",
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.content, CardContent::Loading)
    }

    /// Display strings for (aqi, no2, co, smoke).
    pub fn display_values(&self) -> [String; 4] {
        match self.content {
            CardContent::Live { aqi, no2, co, smoke } => [
                aqi::format_measure(Some(aqi)),
                aqi::format_measure(Some(no2)),
                aqi::format_measure(Some(co)),
                aqi::format_measure(Some(smoke)),
            ],
            CardContent::Loading => std::array::from_fn(|_| aqi::format_measure(None)),
        }
    }
}

/// What a render pass changed, in key terms.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardDiff {
    pub added: Vec<CardKey>,
    pub removed: Vec<CardKey>,
    pub kept: Vec<CardKey>,
}

/// Ordered set of rendered cards, one per active index with a registry entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardSet {
    cards: Vec<Card>,
}

impl CardSet {
    /// Reconciles the card set against `[1, count]`. Cards whose key survives
    /// keep their flip state; indices missing from the registry are skipped.
    pub fn render(
        &mut self,
        registry: &SensorRegistry,
        store: &LiveStateStore,
        count: u32,
    ) -> CardDiff {
        let mut previous: HashMap<CardKey, Card> = self
            .cards
            .drain(..)
            .map(|c| (c.key.clone(), c))
            .collect();
        let mut diff = CardDiff::default();

        for index in 1..=count {
            let Some(def) = registry.get(index) else {
                tracing::warn!("no sensor definition for index {index}");
                continue;
            };
            let key = CardKey {
                sensor_id: def.id.clone(),
                index,
            };
            let flipped = match previous.remove(&key) {
                Some(old) => {
                    diff.kept.push(key.clone());
                    old.flipped
                }
                None => {
                    tracing::debug!("rendering card for sensor {} ({})", def.id, def.name);
                    diff.added.push(key.clone());
                    false
                }
            };
            self.cards.push(Card {
                content: CardContent::from_reading(store.lookup(&def.id, &def.name)),
                name: def.name.clone(),
                key,
                flipped,
            });
        }

        let mut removed: Vec<CardKey> = previous.into_keys().collect();
        removed.sort();
        diff.removed = removed;
        diff
    }

    /// Rewrites every card's content from `store` without touching the set.
    pub fn update(&mut self, registry: &SensorRegistry, store: &LiveStateStore) {
        for card in &mut self.cards {
            let Some(def) = registry.get(card.key.index) else {
                continue;
            };
            card.content = CardContent::from_reading(store.lookup(&card.key.sensor_id, &def.name));
        }
    }

    /// Flips a card between overview and detail. Returns the new state.
    pub fn toggle_flip(&mut self, key: &CardKey) -> Option<bool> {
        let card = self.cards.iter_mut().find(|c| &c.key == key)?;
        card.flipped = !card.flipped;
        Some(card.flipped)
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn get(&self, index: u32) -> Option<&Card> {
        self.cards.iter().find(|c| c.key.index == index)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SensorDatum;
    use crate::registry::SensorDefinition;

    fn registry(n: u32) -> SensorRegistry {
        SensorRegistry::new((1..=n).map(|i| SensorDefinition {
            index: i,
            id: format!("S{i}"),
            name: format!("Site {i}"),
            lat: None,
            lng: None,
        }))
    }

    fn store_with(reg: &SensorRegistry, aqis: &[f64]) -> LiveStateStore {
        let data: Vec<SensorDatum> = aqis
            .iter()
            .map(|&aqi| SensorDatum {
                latitude: None,
                longitude: None,
                aqi: Some(aqi),
                no2: Some(1.0),
                co: Some(2.0),
                smoke: Some(3.0),
            })
            .collect();
        LiveStateStore::from_payload(reg, &data, aqis.len() as u32)
    }

    #[test]
    fn render_count_is_min_of_count_and_registry() {
        let reg = registry(4);
        let store = LiveStateStore::default();
        for n in 1..=10 {
            let mut set = CardSet::default();
            set.render(&reg, &store, n);
            assert_eq!(set.len(), (n as usize).min(reg.len()), "count {n}");
            for (pos, card) in set.cards().iter().enumerate() {
                assert_eq!(card.key.index, pos as u32 + 1);
                assert!(card.key.index <= n);
            }
        }
    }

    #[test]
    fn new_cards_show_loading_placeholder() {
        let reg = registry(3);
        let mut set = CardSet::default();
        set.render(&reg, &LiveStateStore::default(), 3);

        for card in set.cards() {
            assert!(card.is_loading());
            assert_eq!(card.status(), "loading");
            assert_eq!(card.category_label(), "Waiting for data");
            assert_eq!(card.color(), "#999");
            assert_eq!(card.display_values()[0], "—");
        }
    }

    #[test]
    fn update_fills_present_and_blanks_missing() {
        let reg = registry(3);
        let mut set = CardSet::default();
        set.render(&reg, &LiveStateStore::default(), 3);

        let store = store_with(&reg, &[40.0, 120.0]);
        set.update(&reg, &store);

        let cats: Vec<_> = set.cards().iter().map(|c| c.category_label()).collect();
        assert_eq!(cats, vec!["Good", "Unhealthy", "Waiting for data"]);
        assert_eq!(set.get(1).map(|c| c.status()), Some("online"));
        assert_eq!(set.get(3).map(|c| c.status()), Some("loading"));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn update_never_keeps_stale_content() {
        let reg = registry(2);
        let mut set = CardSet::default();
        let full = store_with(&reg, &[10.0, 20.0]);
        set.render(&reg, &full, 2);
        assert_eq!(set.get(2).and_then(|c| c.aqi()), Some(20.0));

        let partial = store_with(&reg, &[11.0]);
        set.update(&reg, &partial);
        assert_eq!(set.get(1).and_then(|c| c.aqi()), Some(11.0));
        assert!(set.get(2).is_some_and(Card::is_loading));
    }

    #[test]
    fn missing_registry_index_is_skipped() {
        let reg = SensorRegistry::new([
            SensorDefinition {
                index: 1,
                id: "a".into(),
                name: "A".into(),
                lat: None,
                lng: None,
            },
            SensorDefinition {
                index: 3,
                id: "c".into(),
                name: "C".into(),
                lat: None,
                lng: None,
            },
        ]);
        let mut set = CardSet::default();
        set.render(&reg, &LiveStateStore::default(), 3);
        let indices: Vec<_> = set.cards().iter().map(|c| c.key.index).collect();
        assert_eq!(indices, vec![1, 3]);
    }

    #[test]
    fn surviving_cards_keep_flip_state() {
        let reg = registry(5);
        let store = LiveStateStore::default();
        let mut set = CardSet::default();
        set.render(&reg, &store, 3);

        let second = set.get(2).map(|c| c.key.clone()).expect("card 2");
        assert_eq!(set.toggle_flip(&second), Some(true));

        let diff = set.render(&reg, &store, 4);
        assert_eq!(diff.added.len(), 1);
        assert_eq!(diff.kept.len(), 3);
        assert!(diff.removed.is_empty());
        assert!(set.get(2).is_some_and(|c| c.flipped));
        assert!(set.get(4).is_some_and(|c| !c.flipped));

        let diff = set.render(&reg, &store, 1);
        assert_eq!(diff.removed.len(), 3);
        assert_eq!(set.len(), 1);

        set.render(&reg, &store, 2);
        assert!(set.get(2).is_some_and(|c| !c.flipped));
    }
}
