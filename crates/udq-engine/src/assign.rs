use serde::{Deserialize, Serialize};
use udq_core::{Category, MatchKind, Selector, UdqResult, UdqSet, ensure_finite};

/// One ASSIGN action: a literal for the entities matched by `selector`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignRecord {
    pub selector: Selector,
    pub value: f64,
    pub report_step: usize,
}

/// A literal quantity built up from ASSIGN records over time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UdqAssign {
    name: String,
    category: Category,
    records: Vec<AssignRecord>,
}

impl UdqAssign {
    pub fn new(name: &str, selector: Selector, value: f64, report_step: usize) -> UdqResult<Self> {
        let mut assign = Self {
            name: name.to_string(),
            category: Category::of_quantity(name)?,
            records: Vec::new(),
        };
        assign.add_record(selector, value, report_step)?;
        Ok(assign)
    }

    /// Rebuild from stored records, e.g. when loading a restart.
    pub fn from_records(name: &str, records: Vec<AssignRecord>) -> UdqResult<Self> {
        Ok(Self {
            name: name.to_string(),
            category: Category::of_quantity(name)?,
            records,
        })
    }

    pub fn add_record(&mut self, selector: Selector, value: f64, report_step: usize) -> UdqResult<()> {
        let value = ensure_finite(value, "assigned value")?;
        self.records.push(AssignRecord {
            selector,
            value,
            report_step,
        });
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn records(&self) -> &[AssignRecord] {
        &self.records
    }

    /// Number of records in force at `report_step`.
    pub fn applicable_records(&self, report_step: usize) -> usize {
        self.records
            .iter()
            .filter(|r| r.report_step <= report_step)
            .count()
    }

    /// Resolve the value for one entity (`None` for field quantities).
    ///
    /// Among records in force at `report_step` that match, the most specific
    /// selector wins (exact name, then pattern, then wildcard), then the
    /// latest step, then the later record.
    pub fn value_for(&self, entity: Option<&str>, report_step: usize) -> Option<f64> {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.report_step <= report_step)
            .filter_map(|(i, r)| {
                let kind = match entity {
                    Some(entity) => r.selector.matches(entity)?,
                    None => MatchKind::Wildcard,
                };
                Some(((kind, r.report_step, i), r.value))
            })
            .max_by_key(|(key, _)| *key)
            .map(|(_, value)| value)
    }

    /// Evaluate over the ordered `entities` of this quantity's category.
    pub fn eval(&self, entities: &[String], report_step: usize) -> UdqSet {
        let values = entities
            .iter()
            .map(|e| self.value_for(Some(e), report_step))
            .collect();
        UdqSet::from_values(self.name.clone(), values)
    }

    /// Evaluate a field quantity.
    pub fn eval_scalar(&self, report_step: usize) -> UdqSet {
        UdqSet::from_values(self.name.clone(), vec![self.value_for(None, report_step)])
    }
}
