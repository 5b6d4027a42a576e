//! In-memory host backed by a deck.

use std::collections::BTreeMap;

use udq_core::Category;
use udq_engine::{EntitySource, SummarySource};

use crate::schema::{Deck, EntitiesDef};

type SeriesKey = (String, Option<String>, usize);

/// Serves a deck's summary values and entity lists to the engine.
///
/// Summary values are reported per step; a value missing at a step is not
/// available there, even if an earlier step reported it.
#[derive(Debug, Clone, Default)]
pub struct DeckSource {
    base: EntitiesDef,
    overrides: Vec<(usize, EntitiesDef)>,
    series: BTreeMap<SeriesKey, f64>,
}

impl DeckSource {
    pub fn new(deck: &Deck) -> Self {
        let mut overrides: Vec<(usize, EntitiesDef)> = deck
            .steps
            .iter()
            .filter_map(|s| s.entities.clone().map(|e| (s.step, e)))
            .collect();
        overrides.sort_by_key(|(step, _)| *step);
        let series = deck
            .steps
            .iter()
            .flat_map(|s| {
                s.summary
                    .iter()
                    .map(move |v| ((v.key.clone(), v.entity.clone(), s.step), v.value))
            })
            .collect();
        Self {
            base: deck.entities.clone(),
            overrides,
            series,
        }
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl SummarySource for DeckSource {
    fn lookup_timeseries(
        &self,
        _category: Category,
        entity: Option<&str>,
        key: &str,
        report_step: usize,
    ) -> Option<f64> {
        self.series
            .get(&(key.to_string(), entity.map(str::to_string), report_step))
            .copied()
    }
}

impl EntitySource for DeckSource {
    fn entity_names(&self, category: Category, report_step: usize) -> Vec<String> {
        self.overrides
            .iter()
            .take_while(|(step, _)| *step <= report_step)
            .filter_map(|(_, entities)| entities.names(category))
            .last()
            .or_else(|| self.base.names(category))
            .map(<[String]>::to_vec)
            .unwrap_or_default()
    }
}
