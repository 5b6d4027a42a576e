//! Deck validation logic.

use std::collections::HashSet;

use udq_core::Category;

use crate::schema::{Deck, EntitiesDef, StepDef};

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Steps out of order: {step} follows {previous}")]
    StepOrder { previous: usize, step: usize },

    #[error("Empty name in {context}")]
    EmptyName { context: String },

    #[error("Duplicate name: {name} in {context}")]
    DuplicateName { name: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

pub fn validate_deck(deck: &Deck) -> Result<(), ValidationError> {
    validate_entities(&deck.entities, "entities")?;

    let mut previous: Option<usize> = None;
    for step in &deck.steps {
        match previous {
            Some(previous) if step.step <= previous => {
                return Err(ValidationError::StepOrder {
                    previous,
                    step: step.step,
                });
            }
            _ => {}
        }
        previous = Some(step.step);
        validate_step(step)?;
    }
    Ok(())
}

fn validate_entities(entities: &EntitiesDef, context: &str) -> Result<(), ValidationError> {
    for (category, names) in entities.listed() {
        let context = format!("{context}.{category}");
        let mut seen = HashSet::new();
        for name in names {
            if name.trim().is_empty() {
                return Err(ValidationError::EmptyName { context });
            }
            if !seen.insert(name) {
                return Err(ValidationError::DuplicateName {
                    name: name.clone(),
                    context,
                });
            }
        }
    }
    Ok(())
}

fn validate_step(step: &StepDef) -> Result<(), ValidationError> {
    if let Some(entities) = &step.entities {
        validate_entities(entities, &format!("step {}", step.step))?;
    }

    for record in &step.records {
        if record.name().trim().is_empty() {
            return Err(ValidationError::EmptyName {
                context: format!("step {} {} record", step.step, record.action()),
            });
        }
    }

    let mut seen = HashSet::new();
    for value in &step.summary {
        let context = format!("step {} summary", step.step);
        let blank_entity = value.entity.as_deref().is_some_and(|e| e.trim().is_empty());
        if value.key.trim().is_empty() || blank_entity {
            return Err(ValidationError::EmptyName { context });
        }
        if !value.value.is_finite() {
            return Err(ValidationError::InvalidValue {
                field: format!("{context} {}", value.key),
                value: value.value.to_string(),
                reason: "must be finite".to_string(),
            });
        }
        if !seen.insert((&value.key, &value.entity)) {
            return Err(ValidationError::DuplicateName {
                name: match &value.entity {
                    Some(entity) => format!("{}:{entity}", value.key),
                    None => value.key.clone(),
                },
                context,
            });
        }
        if let Some(entity) = &value.entity {
            if !Category::from_name(&value.key).is_entity() {
                return Err(ValidationError::InvalidValue {
                    field: format!("{context} {}", value.key),
                    value: entity.clone(),
                    reason: "only entity vectors carry an entity name".to_string(),
                });
            }
        }
    }
    Ok(())
}
