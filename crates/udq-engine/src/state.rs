//! Caller-owned evaluation state.
//!
//! [`QuantityState`] is the current value table the host exports to its
//! summary output. [`EvaluationHistory`] is the bookkeeping that makes
//! evaluation incremental: which assignment records were applied, when each
//! definition last ran, and an append-only log of per-step results.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use udq_core::{UdqSet, UpdateStatus};

use crate::define::UpdateRecord;

/// Current values keyed by (quantity name, entity or none).
///
/// Only defined values are stored; a missing key reads as undefined.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuantityState {
    scalars: BTreeMap<String, f64>,
    entities: BTreeMap<String, BTreeMap<String, f64>>,
}

impl QuantityState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str, entity: Option<&str>) -> Option<f64> {
        match entity {
            None => self.scalars.get(name).copied(),
            Some(entity) => self.entities.get(name)?.get(entity).copied(),
        }
    }

    /// Value for export, with undefined replaced by `undefined_value`.
    pub fn get_or(&self, name: &str, entity: Option<&str>, undefined_value: f64) -> f64 {
        self.get(name, entity).unwrap_or(undefined_value)
    }

    pub fn has(&self, name: &str, entity: Option<&str>) -> bool {
        self.get(name, entity).is_some()
    }

    /// Store `value`; `None` marks the entry undefined.
    pub fn set(&mut self, name: &str, entity: Option<&str>, value: Option<f64>) {
        match (entity, value) {
            (None, Some(v)) => {
                self.scalars.insert(name.to_string(), v);
            }
            (None, None) => {
                self.scalars.remove(name);
            }
            (Some(entity), Some(v)) => {
                self.entities
                    .entry(name.to_string())
                    .or_default()
                    .insert(entity.to_string(), v);
            }
            (Some(entity), None) => {
                if let Some(values) = self.entities.get_mut(name) {
                    values.remove(entity);
                }
            }
        }
    }

    /// Drop every value of `name`.
    pub fn clear(&mut self, name: &str) {
        self.scalars.remove(name);
        self.entities.remove(name);
    }

    /// Defined per-entity values of `name`, by entity name.
    pub fn entity_values(&self, name: &str) -> Option<&BTreeMap<String, f64>> {
        self.entities.get(name)
    }
}

/// Result of one quantity at one report step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepValue {
    pub report_step: usize,
    pub set: UdqSet,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationHistory {
    /// Number of applicable records when each assignment was last applied.
    applied_records: BTreeMap<String, usize>,
    /// Step at which each definition was last evaluated successfully.
    last_defined: BTreeMap<String, usize>,
    results: BTreeMap<String, Vec<StepValue>>,
}

impl EvaluationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when more records apply now than at the last application.
    pub fn should_assign(&self, name: &str, applicable_records: usize) -> bool {
        applicable_records > self.applied_records.get(name).copied().unwrap_or(0)
    }

    pub fn should_define(&self, name: &str, update: UpdateRecord) -> bool {
        match update.status {
            UpdateStatus::On => true,
            UpdateStatus::Off => false,
            UpdateStatus::Next => self
                .last_defined
                .get(name)
                .is_none_or(|&last| last < update.report_step),
        }
    }

    pub fn record_assign(
        &mut self,
        name: &str,
        applicable_records: usize,
        report_step: usize,
        set: UdqSet,
    ) {
        self.applied_records
            .insert(name.to_string(), applicable_records);
        self.push(name, report_step, set);
    }

    pub fn record_define(&mut self, name: &str, report_step: usize, set: UdqSet) {
        self.last_defined.insert(name.to_string(), report_step);
        self.push(name, report_step, set);
    }

    /// Log a failed evaluation without marking the definition as run.
    pub fn record_failure(&mut self, name: &str, report_step: usize, set: UdqSet) {
        self.push(name, report_step, set);
    }

    // one entry per quantity and step; a re-run replaces the entry
    fn push(&mut self, name: &str, report_step: usize, set: UdqSet) {
        let log = self.results.entry(name.to_string()).or_default();
        match log.last_mut() {
            Some(last) if last.report_step == report_step => last.set = set,
            _ => log.push(StepValue { report_step, set }),
        }
    }

    pub fn results(&self, name: &str) -> &[StepValue] {
        self.results.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn latest(&self, name: &str) -> Option<&StepValue> {
        self.results(name).last()
    }

    /// Most recent result recorded at or before `report_step`.
    pub fn value_at(&self, name: &str, report_step: usize) -> Option<&StepValue> {
        self.results(name)
            .iter()
            .rev()
            .find(|v| v.report_step <= report_step)
    }

    pub fn last_defined_step(&self, name: &str) -> Option<usize> {
        self.last_defined.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_set_and_clear() {
        let mut state = QuantityState::new();
        state.set("WUBHP", Some("OP1"), Some(10.0));
        state.set("FUOPR", None, Some(6.0));
        assert_eq!(state.get("WUBHP", Some("OP1")), Some(10.0));
        assert_eq!(state.get("WUBHP", Some("OP2")), None);
        assert_eq!(state.get_or("WUBHP", Some("OP2"), -1.0), -1.0);
        state.set("WUBHP", Some("OP1"), None);
        assert!(!state.has("WUBHP", Some("OP1")));
        state.clear("FUOPR");
        assert!(!state.has("FUOPR", None));
    }

    #[test]
    fn next_runs_once_after_update() {
        let mut history = EvaluationHistory::new();
        let next = UpdateRecord {
            status: UpdateStatus::Next,
            report_step: 2,
        };
        assert!(history.should_define("FU_A", next));
        history.record_define("FU_A", 1, UdqSet::scalar("FU_A", 1.0));
        assert!(history.should_define("FU_A", next));
        history.record_define("FU_A", 2, UdqSet::scalar("FU_A", 2.0));
        assert!(!history.should_define("FU_A", next));
        let off = UpdateRecord {
            status: UpdateStatus::Off,
            report_step: 0,
        };
        assert!(!history.should_define("FU_B", off));
    }

    #[test]
    fn assign_applies_once_per_new_record() {
        let mut history = EvaluationHistory::new();
        assert!(history.should_assign("FU_A", 1));
        history.record_assign("FU_A", 1, 0, UdqSet::scalar("FU_A", 0.0));
        assert!(!history.should_assign("FU_A", 1));
        assert!(history.should_assign("FU_A", 2));
    }

    #[test]
    fn history_is_one_entry_per_step() {
        let mut history = EvaluationHistory::new();
        history.record_define("FU_A", 1, UdqSet::scalar("FU_A", 1.0));
        history.record_define("FU_A", 1, UdqSet::scalar("FU_A", 1.5));
        history.record_define("FU_A", 3, UdqSet::scalar("FU_A", 3.0));
        assert_eq!(history.results("FU_A").len(), 2);
        assert_eq!(
            history.value_at("FU_A", 2).unwrap().set.scalar_value(),
            Some(1.5)
        );
        assert_eq!(history.latest("FU_A").unwrap().report_step, 3);
        assert!(history.results("FU_B").is_empty());
    }
}
