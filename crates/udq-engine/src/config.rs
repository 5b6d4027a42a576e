//! The quantity registry.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use udq_core::{Action, Category, Selector, UdqError, UdqResult, UpdateStatus};
use udq_functions::RandomSource;

use crate::assign::UdqAssign;
use crate::context::{EntityContext, SummarySource};
use crate::define::{SourceLocation, UdqDefine};
use crate::eval::{EvalContext, StepReport};
use crate::params::UdqParams;
use crate::record::UdqRecord;
use crate::state::{EvaluationHistory, QuantityState};

/// Registry entry created the first time a name is assigned or defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityIndex {
    /// Position among all quantities.
    pub insertion_order: usize,
    /// Position among quantities of the same category.
    pub per_category_ordinal: usize,
    /// Most recent ASSIGN or DEFINE; decides whether the definition is live.
    pub action: Action,
    pub category: Category,
}

/// A quantity as seen through its current action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Quantity<'a> {
    Assign(&'a UdqAssign),
    Define(&'a UdqDefine),
}

impl Quantity<'_> {
    pub fn name(&self) -> &str {
        match self {
            Quantity::Assign(a) => a.name(),
            Quantity::Define(d) => d.name(),
        }
    }
}

/// All user quantities of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UdqConfig {
    params: UdqParams,
    definitions: BTreeMap<String, UdqDefine>,
    assignments: BTreeMap<String, UdqAssign>,
    units: BTreeMap<String, String>,
    index: BTreeMap<String, QuantityIndex>,
}

impl UdqConfig {
    pub fn new(params: UdqParams) -> UdqResult<Self> {
        params.validate()?;
        Ok(Self {
            params,
            ..Self::default()
        })
    }

    pub fn params(&self) -> &UdqParams {
        &self.params
    }

    fn add_node(&mut self, name: &str, category: Category, action: Action) {
        if let Some(node) = self.index.get_mut(name) {
            node.action = action;
            return;
        }
        let per_category_ordinal = self
            .index
            .values()
            .filter(|n| n.category == category)
            .count();
        let node = QuantityIndex {
            insertion_order: self.index.len(),
            per_category_ordinal,
            action,
            category,
        };
        self.index.insert(name.to_string(), node);
    }

    /// Add an ASSIGN record. An empty selector or `*` selects every entity.
    pub fn add_assign<S: AsRef<str>>(
        &mut self,
        name: &str,
        selector: &[S],
        value: f64,
        report_step: usize,
    ) -> UdqResult<()> {
        let selector = Selector::from_items(selector);
        match self.assignments.get_mut(name) {
            Some(assign) => assign.add_record(selector, value, report_step)?,
            None => {
                let assign = UdqAssign::new(name, selector, value, report_step)?;
                self.assignments.insert(name.to_string(), assign);
            }
        }
        self.add_node(name, Category::from_name(name), Action::Assign);
        debug!(name, value, report_step, "UDQ ASSIGN added");
        Ok(())
    }

    /// Add or replace the definition of `name`.
    pub fn add_define<S: AsRef<str>>(
        &mut self,
        name: &str,
        location: SourceLocation,
        tokens: &[S],
        report_step: usize,
    ) -> UdqResult<()> {
        let define = UdqDefine::new(name, location, tokens, report_step)?;
        debug!(name, expression = %define.input_string(), report_step, "UDQ DEFINE added");
        self.add_node(name, define.category(), Action::Define);
        self.definitions.insert(name.to_string(), define);
        Ok(())
    }

    /// Attach a unit; a unit cannot change once set.
    pub fn add_unit(&mut self, name: &str, unit: &str) -> UdqResult<()> {
        let unit = unit.trim();
        if let Some(old) = self.units.get(name) {
            if old != unit {
                return Err(UdqError::IllegalUnitChange {
                    name: name.to_string(),
                    old: old.clone(),
                    new: unit.to_string(),
                });
            }
            return Ok(());
        }
        self.units.insert(name.to_string(), unit.to_string());
        Ok(())
    }

    /// Change the update status of an existing definition.
    pub fn add_update(
        &mut self,
        name: &str,
        report_step: usize,
        token: Option<&str>,
    ) -> UdqResult<()> {
        let status = UpdateStatus::parse(name, token)?;
        let define = self
            .definitions
            .get_mut(name)
            .ok_or_else(|| UdqError::UndefinedReference {
                name: name.to_string(),
            })?;
        define.set_update(status, report_step);
        debug!(name, ?status, report_step, "UDQ UPDATE added");
        Ok(())
    }

    /// Dispatch a deck record to the matching `add_*` call.
    pub fn add_record(&mut self, report_step: usize, record: &UdqRecord) -> UdqResult<()> {
        match record {
            UdqRecord::Assign {
                name,
                selector,
                value,
            } => self.add_assign(name, selector.as_slice(), *value, report_step),
            UdqRecord::Define {
                name,
                expression,
                location,
            } => self.add_define(
                name,
                location.clone().unwrap_or_default(),
                expression.as_slice(),
                report_step,
            ),
            UdqRecord::Units { name, unit } => self.add_unit(name, unit),
            UdqRecord::Update { name, status } => {
                self.add_update(name, report_step, status.as_deref())
            }
        }
    }

    pub fn has_keyword(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn has_unit(&self, name: &str) -> bool {
        self.units.contains_key(name)
    }

    pub fn unit(&self, name: &str) -> Option<&str> {
        self.units.get(name).map(String::as_str)
    }

    pub fn index(&self, name: &str) -> Option<&QuantityIndex> {
        self.index.get(name)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn define(&self, name: &str) -> Option<&UdqDefine> {
        self.definitions.get(name)
    }

    pub fn assign(&self, name: &str) -> Option<&UdqAssign> {
        self.assignments.get(name)
    }

    /// The definition of `name` if DEFINE is its current action.
    pub fn active_define(&self, name: &str) -> Option<&UdqDefine> {
        match self.index.get(name)?.action {
            Action::Define => self.definitions.get(name),
            _ => None,
        }
    }

    fn ordered<'s, T>(
        &'s self,
        items: &'s BTreeMap<String, T>,
        keep: impl Fn(&QuantityIndex) -> bool,
    ) -> Vec<&'s T> {
        let mut out: Vec<(usize, &T)> = items
            .iter()
            .filter_map(|(name, item)| {
                let node = self.index.get(name)?;
                keep(node).then_some((node.insertion_order, item))
            })
            .collect();
        out.sort_by_key(|(order, _)| *order);
        out.into_iter().map(|(_, item)| item).collect()
    }

    /// Assignments of `category`, in insertion order.
    pub fn assignments(&self, category: Category) -> Vec<&UdqAssign> {
        self.ordered(&self.assignments, |n| n.category == category)
    }

    /// Live definitions of `category`, in insertion order.
    pub fn definitions(&self, category: Category) -> Vec<&UdqDefine> {
        self.ordered(&self.definitions, |n| {
            n.category == category && n.action == Action::Define
        })
    }

    /// Every stored definition, live or not, in insertion order.
    pub fn all_definitions(&self) -> Vec<&UdqDefine> {
        self.ordered(&self.definitions, |_| true)
    }

    /// Quantity at `insertion_order`, seen through its current action.
    pub fn by_insertion_index(&self, insertion_order: usize) -> Option<Quantity<'_>> {
        let (name, node) = self
            .index
            .iter()
            .find(|(_, n)| n.insertion_order == insertion_order)?;
        match node.action {
            Action::Define => self.definitions.get(name).map(Quantity::Define),
            _ => self.assignments.get(name).map(Quantity::Assign),
        }
    }

    /// Names of every quantity, in insertion order.
    pub fn names(&self) -> Vec<&str> {
        let mut nodes: Vec<(&String, &QuantityIndex)> = self.index.iter().collect();
        nodes.sort_by_key(|(_, n)| n.insertion_order);
        nodes.into_iter().map(|(name, _)| name.as_str()).collect()
    }

    pub(crate) fn unit_entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.units.iter().map(|(name, unit)| (name.as_str(), unit.as_str()))
    }

    pub(crate) fn restore_define(&mut self, define: UdqDefine) {
        self.add_node(define.name(), define.category(), Action::Define);
        self.definitions.insert(define.name().to_string(), define);
    }

    pub(crate) fn restore_assign(&mut self, assign: UdqAssign) {
        self.add_node(assign.name(), assign.category(), Action::Assign);
        self.assignments.insert(assign.name().to_string(), assign);
    }

    /// Summary vectors the host must provide: every name referenced by a
    /// definition that is not itself a user quantity.
    pub fn required_summary_keys(&self) -> BTreeSet<String> {
        self.definitions
            .values()
            .flat_map(UdqDefine::references)
            .filter(|name| !self.has_keyword(name) && !Category::is_quantity_name(name))
            .map(str::to_string)
            .collect()
    }

    /// Evaluate all quantities for `report_step`.
    ///
    /// Pending assignments are applied first, then live definitions, both
    /// category by category (well, group, field, then the rest). A quantity
    /// that fails is left undefined and reported; the rest still run.
    pub fn eval(
        &self,
        report_step: usize,
        entities: &EntityContext,
        summary: &dyn SummarySource,
        state: &mut QuantityState,
        history: &mut EvaluationHistory,
        rng: &mut dyn RandomSource,
    ) -> StepReport {
        let mut ctx = EvalContext::new(self, report_step, entities, summary, state, history, rng);

        for category in Category::EVALUATION_ORDER {
            for assign in self.assignments(category) {
                ctx.apply_assign(assign);
            }
        }
        for category in Category::EVALUATION_ORDER {
            for define in self.definitions(category) {
                // failures are already recorded in the report
                let _ = ctx.run_define(define);
            }
        }

        let report = ctx.into_report();
        info!(
            report_step,
            assigned = report.assigned.len(),
            defined = report.defined.len(),
            failed = report.diagnostics.len(),
            "UDQ step evaluated"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> UdqConfig {
        UdqConfig::new(UdqParams::default()).unwrap()
    }

    #[test]
    fn index_tracks_first_mention() {
        let mut c = config();
        c.add_assign("WU_A", &["*"], 1.0, 0).unwrap();
        c.add_define("FU_B", SourceLocation::default(), &["1"], 0)
            .unwrap();
        c.add_define("WU_C", SourceLocation::default(), &["WOPR"], 0)
            .unwrap();
        c.add_assign("WU_A", &["OP1"], 2.0, 1).unwrap();

        let a = c.index("WU_A").unwrap();
        assert_eq!((a.insertion_order, a.per_category_ordinal), (0, 0));
        let b = c.index("FU_B").unwrap();
        assert_eq!((b.insertion_order, b.per_category_ordinal), (1, 0));
        let w = c.index("WU_C").unwrap();
        assert_eq!((w.insertion_order, w.per_category_ordinal), (2, 1));
        assert_eq!(c.len(), 3);
        assert_eq!(c.names(), vec!["WU_A", "FU_B", "WU_C"]);
        assert_eq!(c.assign("WU_A").unwrap().records().len(), 2);
    }

    #[test]
    fn by_insertion_index_follows_action() {
        let mut c = config();
        c.add_define("FU_A", SourceLocation::default(), &["1"], 0)
            .unwrap();
        assert!(matches!(c.by_insertion_index(0), Some(Quantity::Define(_))));
        c.add_assign("FU_A", &[] as &[&str], 0.0, 1).unwrap();
        assert!(matches!(c.by_insertion_index(0), Some(Quantity::Assign(_))));
        assert!(c.active_define("FU_A").is_none());
        assert!(c.definitions(Category::FieldVar).is_empty());
        assert_eq!(c.all_definitions().len(), 1);
        assert!(c.by_insertion_index(1).is_none());
    }

    #[test]
    fn units_are_fixed_once_set() {
        let mut c = config();
        c.add_unit("FU_A", "SM3/DAY").unwrap();
        c.add_unit("FU_A", "SM3/DAY").unwrap();
        assert!(matches!(
            c.add_unit("FU_A", "BARSA"),
            Err(UdqError::IllegalUnitChange { .. })
        ));
        assert_eq!(c.unit("FU_A"), Some("SM3/DAY"));
        assert!(!c.has_unit("FU_B"));
        // units alone do not register a quantity
        assert!(!c.has_keyword("FU_A"));
    }

    #[test]
    fn update_needs_status_and_definition() {
        let mut c = config();
        c.add_define("FU_A", SourceLocation::default(), &["1"], 0)
            .unwrap();
        assert!(matches!(
            c.add_update("FU_A", 1, None),
            Err(UdqError::MissingUpdateSelector { .. })
        ));
        assert!(matches!(
            c.add_update("FU_B", 1, Some("ON")),
            Err(UdqError::UndefinedReference { .. })
        ));
        c.add_update("FU_A", 2, Some("NEXT")).unwrap();
        assert_eq!(c.define("FU_A").unwrap().update_status(), UpdateStatus::Next);
    }

    #[test]
    fn rejected_records_leave_registry_unchanged() {
        let mut c = config();
        c.add_define("FU_A", SourceLocation::default(), &["1", "FOPR", "+"], 0)
            .unwrap();
        let before = c.clone();
        assert!(c
            .add_define("FU_B", SourceLocation::default(), &["WOPR", "+"], 0)
            .is_err());
        assert!(c.add_assign("TIME", &["*"], 1.0, 0).is_err());
        assert_eq!(c, before);
    }

    #[test]
    fn summary_keys_skip_quantities() {
        let mut c = config();
        c.add_define(
            "FU_PAR1",
            SourceLocation::default(),
            &["TIMESTEP", "FMWPR", "+", "WGLIR", "'OP1'", "+"],
            0,
        )
        .unwrap();
        c.add_define(
            "FU_PAR2",
            SourceLocation::default(),
            &["FU_PAR1", "FOPR", "+", "FU_NEVER", "UADD"],
            0,
        )
        .unwrap();
        let keys: Vec<String> = c.required_summary_keys().into_iter().collect();
        assert_eq!(keys, vec!["FMWPR", "FOPR", "TIMESTEP", "WGLIR"]);
    }
}
