//! udq-deck: scenario decks that drive the UDQ engine end to end.
//!
//! A [`Deck`] lists the entities of a run and, per report step, the UDQ
//! records to apply and the summary values the host reports. [`DeckSource`]
//! serves those values to the engine and [`run_deck`] evaluates every step.

pub mod runner;
pub mod schema;
pub mod source;
pub mod validate;

pub use runner::{DeckRun, DeckRunner, QuantityValue, StepSnapshot, registry_at, run_deck, run_seeded};
pub use schema::*;
pub use source::DeckSource;
pub use validate::{ValidationError, validate_deck};

use std::path::Path;

use udq_core::UdqError;
use udq_engine::LoadError;

pub type DeckResult<T> = Result<T, DeckError>;

#[derive(thiserror::Error, Debug)]
pub enum DeckError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Record {name} at step {step}: {source}")]
    Record {
        step: usize,
        name: String,
        #[source]
        source: UdqError,
    },

    #[error("Engine error: {0}")]
    Engine(#[from] UdqError),

    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Structural checks, then a dry build of the registry so that malformed
/// records are rejected at load time.
fn check(deck: &Deck) -> DeckResult<()> {
    validate_deck(deck)?;
    registry_at(deck, None)?;
    Ok(())
}

pub fn from_yaml_str(text: &str) -> DeckResult<Deck> {
    let deck: Deck = serde_yaml::from_str(text)?;
    check(&deck)?;
    Ok(deck)
}

pub fn from_json_str(text: &str) -> DeckResult<Deck> {
    let deck: Deck = serde_json::from_str(text)?;
    check(&deck)?;
    Ok(deck)
}

pub fn load_yaml(path: &Path) -> DeckResult<Deck> {
    from_yaml_str(&std::fs::read_to_string(path)?)
}

pub fn load_json(path: &Path) -> DeckResult<Deck> {
    from_json_str(&std::fs::read_to_string(path)?)
}

/// Load by extension: `.json` is JSON, anything else YAML.
pub fn load(path: &Path) -> DeckResult<Deck> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => load_json(path),
        _ => load_yaml(path),
    }
}

pub fn save_yaml(path: &Path, deck: &Deck) -> DeckResult<()> {
    check(deck)?;
    std::fs::write(path, serde_yaml::to_string(deck)?)?;
    Ok(())
}

pub fn save_json(path: &Path, deck: &Deck) -> DeckResult<()> {
    check(deck)?;
    std::fs::write(path, serde_json::to_string_pretty(deck)?)?;
    Ok(())
}
