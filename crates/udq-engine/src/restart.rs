//! Restart representation of the registry.
//!
//! One record per name: every stored definition and assignment of a
//! quantity, its current action and its unit, plus unit-only records for
//! names that carry nothing else. A registry rebuilt from these records
//! evaluates the same way from the next step on, given the same state table
//! and history.

use serde::{Deserialize, Serialize};
use udq_core::{Action, Category, UdqError, UdqResult};

use crate::assign::{AssignRecord, UdqAssign};
use crate::config::UdqConfig;
use crate::define::{SourceLocation, UdqDefine, UpdateRecord};
use crate::params::{LoadError, UdqParams};
use crate::token::Token;

/// A stored definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestartExpression {
    pub input: String,
    pub tokens: Vec<Token>,
    pub location: SourceLocation,
    pub report_step: usize,
    pub update: UpdateRecord,
}

impl RestartExpression {
    fn from_define(define: &UdqDefine) -> Self {
        Self {
            input: define.input_string(),
            tokens: define.tokens().to_vec(),
            location: define.location().clone(),
            report_step: define.report_step(),
            update: define.update(),
        }
    }

    fn to_define(&self, name: &str) -> UdqResult<UdqDefine> {
        let mut define = UdqDefine::from_tokens(
            name,
            self.location.clone(),
            self.tokens.clone(),
            self.report_step,
        )?;
        define.set_update(self.update.status, self.update.report_step);
        Ok(define)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestartRecord {
    pub name: String,
    pub category: Category,
    /// Current action; `None` for a name that only has a unit.
    pub action: Option<Action>,
    pub insertion_order: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<RestartExpression>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub literal: Option<Vec<AssignRecord>>,
}

impl UdqConfig {
    pub fn to_restart_records(&self) -> Vec<RestartRecord> {
        let quantities = self.names().into_iter().filter_map(|name| {
            let index = self.index(name)?;
            Some(RestartRecord {
                name: name.to_string(),
                category: index.category,
                action: Some(index.action),
                insertion_order: Some(index.insertion_order),
                unit: self.unit(name).map(str::to_string),
                expression: self.define(name).map(RestartExpression::from_define),
                literal: self.assign(name).map(|a| a.records().to_vec()),
            })
        });
        let unit_only = self
            .unit_entries()
            .filter(|(name, _)| !self.has_keyword(name))
            .map(|(name, unit)| RestartRecord {
                name: name.to_string(),
                category: Category::from_name(name),
                action: None,
                insertion_order: None,
                unit: Some(unit.to_string()),
                expression: None,
                literal: None,
            });
        quantities.chain(unit_only).collect()
    }

    pub fn from_restart_records(params: UdqParams, records: &[RestartRecord]) -> UdqResult<Self> {
        let mut ordered: Vec<&RestartRecord> = records.iter().collect();
        ordered.sort_by_key(|r| (r.insertion_order.is_none(), r.insertion_order));

        let mut config = UdqConfig::new(params)?;
        for record in ordered {
            let define = record
                .expression
                .as_ref()
                .map(|e| e.to_define(&record.name))
                .transpose()?;
            let assign = record
                .literal
                .as_ref()
                .map(|r| UdqAssign::from_records(&record.name, r.clone()))
                .transpose()?;

            // the current action is restored last so the index ends on it
            match record.action {
                Some(Action::Define) => {
                    let define = define.ok_or(UdqError::InvalidArg {
                        what: "restart record for a DEFINE has no expression",
                    })?;
                    if let Some(assign) = assign {
                        config.restore_assign(assign);
                    }
                    config.restore_define(define);
                }
                Some(Action::Assign) => {
                    let assign = assign.ok_or(UdqError::InvalidArg {
                        what: "restart record for an ASSIGN has no literal",
                    })?;
                    if let Some(define) = define {
                        config.restore_define(define);
                    }
                    config.restore_assign(assign);
                }
                Some(Action::Units | Action::Update) | None => {}
            }
            if let Some(unit) = &record.unit {
                config.add_unit(&record.name, unit)?;
            }
        }
        Ok(config)
    }

    pub fn restart_to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.to_restart_records())
    }

    pub fn restart_from_json(params: UdqParams, text: &str) -> Result<Self, LoadError> {
        let records: Vec<RestartRecord> = serde_json::from_str(text)?;
        Ok(Self::from_restart_records(params, &records)?)
    }
}
