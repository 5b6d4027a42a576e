//! Host collaborators and the per-step entity snapshot.
//!
//! The engine never reads simulator state directly. Raw summary vectors come
//! through [`SummarySource`] and entity names through [`EntitySource`]; the
//! names are frozen into an [`EntityContext`] once per step so that position
//! `i` of every set means the same entity for the whole evaluation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use udq_core::Category;

/// Raw time series values supplied by the host.
pub trait SummarySource {
    /// Value of `key` for `entity` (or the field/scalar value when `entity`
    /// is `None`) at `report_step`. `None` means not available.
    fn lookup_timeseries(
        &self,
        category: Category,
        entity: Option<&str>,
        key: &str,
        report_step: usize,
    ) -> Option<f64>;
}

impl<F> SummarySource for F
where
    F: Fn(Category, Option<&str>, &str, usize) -> Option<f64>,
{
    fn lookup_timeseries(
        &self,
        category: Category,
        entity: Option<&str>,
        key: &str,
        report_step: usize,
    ) -> Option<f64> {
        self(category, entity, key, report_step)
    }
}

/// Entity name lists supplied by the host.
pub trait EntitySource {
    /// Ordered names of the entities of `category` at `report_step`.
    fn entity_names(&self, category: Category, report_step: usize) -> Vec<String>;
}

/// Ordered entity names per category, frozen for one evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityContext {
    names: BTreeMap<Category, Vec<String>>,
}

impl EntityContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Query every entity category of `source` at `report_step`.
    pub fn snapshot(source: &dyn EntitySource, report_step: usize) -> Self {
        let names = Category::EVALUATION_ORDER
            .into_iter()
            .filter(|c| c.is_entity())
            .map(|c| (c, source.entity_names(c, report_step)))
            .collect();
        Self { names }
    }

    pub fn with<S: Into<String>>(
        mut self,
        category: Category,
        names: impl IntoIterator<Item = S>,
    ) -> Self {
        self.names
            .insert(category, names.into_iter().map(Into::into).collect());
        self
    }

    pub fn names(&self, category: Category) -> &[String] {
        self.names.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self, category: Category) -> usize {
        self.names(category).len()
    }

    pub fn position(&self, category: Category, name: &str) -> Option<usize> {
        self.names(category).iter().position(|n| n == name)
    }
}
