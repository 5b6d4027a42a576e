//! Evaluation context for one report step.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};
use udq_core::{Category, Selector, UdqError, UdqResult, UdqSet};
use udq_functions::RandomSource;

use crate::assign::UdqAssign;
use crate::config::UdqConfig;
use crate::context::{EntityContext, SummarySource};
use crate::define::{SourceLocation, UdqDefine};
use crate::state::{EvaluationHistory, QuantityState};

/// A value on the evaluation stack together with its category.
#[derive(Debug, Clone, PartialEq)]
pub struct Operand {
    pub set: UdqSet,
    pub category: Category,
}

impl Operand {
    pub fn scalar(value: f64) -> Self {
        Self {
            set: UdqSet::scalar(value.to_string(), value),
            category: Category::Scalar,
        }
    }
}

/// A quantity that failed to evaluate at a step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvalDiagnostic {
    pub name: String,
    pub location: Option<SourceLocation>,
    pub message: String,
    #[serde(skip)]
    pub error: UdqError,
}

/// What one call to [`UdqConfig::eval`] did.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StepReport {
    pub report_step: usize,
    /// Assignments applied, in evaluation order.
    pub assigned: Vec<String>,
    /// Definitions evaluated, in evaluation order (failures included).
    pub defined: Vec<String>,
    pub diagnostics: Vec<EvalDiagnostic>,
}

impl StepReport {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Everything a definition needs while it evaluates.
///
/// Tracks the definitions in progress (for cycle detection) and those
/// already finished this step, so each definition runs at most once per
/// step however many others reference it.
pub struct EvalContext<'a> {
    config: &'a UdqConfig,
    report_step: usize,
    entities: &'a EntityContext,
    summary: &'a dyn SummarySource,
    state: &'a mut QuantityState,
    history: &'a mut EvaluationHistory,
    rng: &'a mut dyn RandomSource,
    in_progress: Vec<String>,
    finished: BTreeMap<String, Option<UdqError>>,
    report: StepReport,
}

impl<'a> EvalContext<'a> {
    pub fn new(
        config: &'a UdqConfig,
        report_step: usize,
        entities: &'a EntityContext,
        summary: &'a dyn SummarySource,
        state: &'a mut QuantityState,
        history: &'a mut EvaluationHistory,
        rng: &'a mut dyn RandomSource,
    ) -> Self {
        Self {
            config,
            report_step,
            entities,
            summary,
            state,
            history,
            rng,
            in_progress: Vec::new(),
            finished: BTreeMap::new(),
            report: StepReport {
                report_step,
                ..StepReport::default()
            },
        }
    }

    pub fn report_step(&self) -> usize {
        self.report_step
    }

    pub fn entities(&self) -> &EntityContext {
        self.entities
    }

    pub fn cmp_epsilon(&self) -> f64 {
        self.config.params().cmp_epsilon
    }

    pub fn rng(&mut self) -> &mut dyn RandomSource {
        &mut *self.rng
    }

    pub fn into_report(self) -> StepReport {
        self.report
    }

    /// Resolve a reference token to its value at this step.
    ///
    /// Registry quantities read from the state table, evaluating an active
    /// definition first if it has not run yet. Other names are summary
    /// vectors looked up through the host.
    pub fn resolve(&mut self, name: &str, selector: &[String]) -> UdqResult<Operand> {
        let category = Category::classify(name, selector);
        let selector = Selector::from_items(selector);

        if self.config.has_keyword(name) {
            self.refresh(name)?;
            let set = self.gather(name, &selector, |ctx, entity| ctx.state.get(name, entity));
            return Ok(Operand { set, category });
        }
        if Category::is_quantity_name(name) {
            return Err(UdqError::UndefinedReference {
                name: name.to_string(),
            });
        }

        let set = self.gather(name, &selector, |ctx, entity| {
            ctx.summary.lookup_timeseries(
                Category::from_name(name),
                entity,
                name,
                ctx.report_step,
            )
        });
        Ok(Operand { set, category })
    }

    // Collect the values of `name` for the entities picked by `selector`.
    fn gather(
        &self,
        name: &str,
        selector: &Selector,
        value: impl Fn(&Self, Option<&str>) -> Option<f64>,
    ) -> UdqSet {
        let category = Category::from_name(name);
        if !category.is_entity() {
            return UdqSet::from_values(name, vec![value(self, None)]);
        }
        if matches!(category, Category::WellVar | Category::GroupVar) {
            if let Some(entity) = selector.single_name() {
                return UdqSet::from_values(name, vec![value(self, Some(entity))]);
            }
        }
        let values = self
            .entities
            .names(category)
            .iter()
            .map(|entity| match selector.matches(entity) {
                Some(_) => value(self, Some(entity.as_str())),
                None => None,
            })
            .collect();
        UdqSet::from_values(name, values)
    }

    // Make sure a referenced definition is current before it is read.
    fn refresh(&mut self, name: &str) -> UdqResult<()> {
        let config = self.config;
        let Some(define) = config.active_define(name) else {
            return Ok(());
        };
        if let Some(pos) = self.in_progress.iter().position(|n| n == name) {
            // a definition reading itself sees its previous value
            if pos + 1 == self.in_progress.len() {
                return Ok(());
            }
            let mut chain = self.in_progress[pos..].to_vec();
            chain.push(name.to_string());
            return Err(UdqError::CyclicDefinition { chain });
        }
        match self.run_define(define) {
            Err(e @ UdqError::CyclicDefinition { .. }) => Err(e),
            _ => Ok(()),
        }
    }

    /// Evaluate `define` unless it already ran this step or its update
    /// status holds it back. Failures are recorded and returned.
    pub fn run_define(&mut self, define: &UdqDefine) -> UdqResult<()> {
        let name = define.name();
        if let Some(outcome) = self.finished.get(name) {
            return match outcome {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            };
        }
        if !self.history.should_define(name, define.update()) {
            return Ok(());
        }

        self.in_progress.push(name.to_string());
        let result = define.eval(self);
        self.in_progress.pop();
        self.report.defined.push(name.to_string());

        match result {
            Ok(set) => {
                debug!(
                    name,
                    report_step = self.report_step,
                    defined = set.defined_len(),
                    "evaluated UDQ definition"
                );
                self.store(define.category(), &set);
                self.history.record_define(name, self.report_step, set);
                self.finished.insert(name.to_string(), None);
                Ok(())
            }
            Err(error) => {
                self.fail(name, define.category(), Some(define.location().clone()), &error);
                self.finished.insert(name.to_string(), Some(error.clone()));
                Err(error)
            }
        }
    }

    /// Apply `assign` if it has records not applied yet.
    pub fn apply_assign(&mut self, assign: &UdqAssign) {
        let applicable = assign.applicable_records(self.report_step);
        if !self.history.should_assign(assign.name(), applicable) {
            return;
        }
        let category = assign.category();
        let set = if category.is_entity() {
            assign.eval(self.entities.names(category), self.report_step)
        } else {
            assign.eval_scalar(self.report_step)
        };
        debug!(
            name = assign.name(),
            report_step = self.report_step,
            defined = set.defined_len(),
            "applied UDQ assignment"
        );
        self.store(category, &set);
        self.history
            .record_assign(assign.name(), applicable, self.report_step, set);
        self.report.assigned.push(assign.name().to_string());
    }

    // Write a result into the state table; `set` is sized for `category`.
    fn store(&mut self, category: Category, set: &UdqSet) {
        let name = set.name().to_string();
        if category.is_entity() {
            for (entity, value) in self.entities.names(category).iter().zip(set.iter()) {
                self.state.set(&name, Some(entity.as_str()), value);
            }
        } else {
            self.state.set(&name, None, set.scalar_value());
        }
    }

    fn fail(
        &mut self,
        name: &str,
        category: Category,
        location: Option<SourceLocation>,
        error: &UdqError,
    ) {
        warn!(name, report_step = self.report_step, %error, "UDQ evaluation failed");
        let len = if category.is_entity() {
            self.entities.len(category)
        } else {
            1
        };
        self.state.clear(name);
        self.history
            .record_failure(name, self.report_step, UdqSet::new(name, len));
        self.report.diagnostics.push(EvalDiagnostic {
            name: name.to_string(),
            location,
            message: error.to_string(),
            error: error.clone(),
        });
    }
}
