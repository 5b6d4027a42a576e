//! Step-by-step evaluation of a deck.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::info;
use udq_core::UdqError;
use udq_engine::{EntityContext, EvaluationHistory, QuantityState, StepReport, UdqConfig};
use udq_functions::RandomSource;

use crate::schema::{Deck, StepDef};
use crate::source::DeckSource;
use crate::{DeckError, DeckResult};

/// Value of one quantity after a step: a field/scalar value, or one value
/// per entity in entity order. `None` is undefined.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QuantityValue {
    Scalar(Option<f64>),
    Entities(BTreeMap<String, Option<f64>>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepSnapshot {
    pub report: StepReport,
    pub values: BTreeMap<String, QuantityValue>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeckRun {
    #[serde(skip)]
    pub config: UdqConfig,
    #[serde(skip)]
    pub state: QuantityState,
    #[serde(skip)]
    pub history: EvaluationHistory,
    pub steps: Vec<StepSnapshot>,
}

impl DeckRun {
    pub fn is_clean(&self) -> bool {
        self.steps.iter().all(|s| s.report.is_clean())
    }

    pub fn snapshot(&self, report_step: usize) -> Option<&StepSnapshot> {
        self.steps.iter().find(|s| s.report.report_step == report_step)
    }
}

/// Applies deck steps one at a time against a shared registry and state.
pub struct DeckRunner {
    source: DeckSource,
    run: DeckRun,
}

impl DeckRunner {
    pub fn new(deck: &Deck) -> DeckResult<Self> {
        Ok(Self {
            source: DeckSource::new(deck),
            run: DeckRun {
                config: UdqConfig::new(deck.params)?,
                state: QuantityState::new(),
                history: EvaluationHistory::new(),
                steps: Vec::new(),
            },
        })
    }

    /// Apply the records of `step`, evaluate it and return its snapshot.
    pub fn step(&mut self, step: &StepDef, rng: &mut dyn RandomSource) -> DeckResult<&StepSnapshot> {
        apply_records(&mut self.run.config, step)?;

        let entities = EntityContext::snapshot(&self.source, step.step);
        let report = self.run.config.eval(
            step.step,
            &entities,
            &self.source,
            &mut self.run.state,
            &mut self.run.history,
            rng,
        );
        let values = snapshot_values(&self.run.config, &self.run.state, &entities);
        self.run.steps.push(StepSnapshot { report, values });

        self.run.steps.last().ok_or(DeckError::Engine(UdqError::InvalidArg {
            what: "step snapshot missing after evaluation",
        }))
    }

    pub fn finish(self) -> DeckRun {
        let failed: usize = self
            .run
            .steps
            .iter()
            .map(|s| s.report.diagnostics.len())
            .sum();
        info!(
            steps = self.run.steps.len(),
            quantities = self.run.config.len(),
            failed,
            "Deck run complete"
        );
        self.run
    }
}

fn apply_records(config: &mut UdqConfig, step: &StepDef) -> DeckResult<()> {
    for record in &step.records {
        config
            .add_record(step.step, record)
            .map_err(|source| DeckError::Record {
                step: step.step,
                name: record.name().to_string(),
                source,
            })?;
    }
    Ok(())
}

fn snapshot_values(
    config: &UdqConfig,
    state: &QuantityState,
    entities: &EntityContext,
) -> BTreeMap<String, QuantityValue> {
    config
        .names()
        .into_iter()
        .filter_map(|name| config.index(name).map(|index| (name, index.category)))
        .map(|(name, category)| {
            let value = if category.is_entity() {
                QuantityValue::Entities(
                    entities
                        .names(category)
                        .iter()
                        .map(|e| (e.clone(), state.get(name, Some(e.as_str()))))
                        .collect(),
                )
            } else {
                QuantityValue::Scalar(state.get(name, None))
            };
            (name.to_string(), value)
        })
        .collect()
}

/// Evaluate every step of `deck`, drawing random numbers from `rng`.
pub fn run_deck(deck: &Deck, rng: &mut dyn RandomSource) -> DeckResult<DeckRun> {
    let mut runner = DeckRunner::new(deck)?;
    for step in &deck.steps {
        runner.step(step, rng)?;
    }
    Ok(runner.finish())
}

/// Like [`run_deck`] with a generator seeded from the deck parameters.
/// `seed` overrides the deck's `random_seed`.
pub fn run_seeded(deck: &Deck, seed: Option<u64>) -> DeckResult<DeckRun> {
    let mut params = deck.params;
    if let Some(seed) = seed {
        params.random_seed = seed;
    }
    let mut rng = StdRng::seed_from_u64(params.random_seed);
    let mut runner = DeckRunner::new(deck)?;
    for step in &deck.steps {
        if params.reseed {
            rng = StdRng::seed_from_u64(params.seed_for_step(step.step));
        }
        runner.step(step, &mut rng)?;
    }
    Ok(runner.finish())
}

/// Registry holding every record up to and including `last_step`
/// (all steps when `None`), without evaluating anything.
pub fn registry_at(deck: &Deck, last_step: Option<usize>) -> DeckResult<UdqConfig> {
    let mut config = UdqConfig::new(deck.params)?;
    for step in deck
        .steps
        .iter()
        .filter(|s| last_step.is_none_or(|last| s.step <= last))
    {
        apply_records(&mut config, step)?;
    }
    Ok(config)
}
