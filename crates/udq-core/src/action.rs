use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::UdqError;

/// Action carried by a configuration record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Assign,
    Define,
    Units,
    Update,
}

impl FromStr for Action {
    type Err = UdqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ASSIGN" => Ok(Action::Assign),
            "DEFINE" => Ok(Action::Define),
            "UNITS" => Ok(Action::Units),
            "UPDATE" => Ok(Action::Update),
            _ => Err(UdqError::UnknownAction {
                token: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Assign => "ASSIGN",
            Action::Define => "DEFINE",
            Action::Units => "UNITS",
            Action::Update => "UPDATE",
        })
    }
}

/// Re-evaluation policy of a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UpdateStatus {
    /// Evaluate at every step.
    #[default]
    On,
    /// Keep the last value.
    Off,
    /// Evaluate once after the UPDATE was issued.
    Next,
}

impl UpdateStatus {
    /// Parse an UPDATE token; `name` is only used for the error.
    pub fn parse(name: &str, token: Option<&str>) -> Result<Self, UdqError> {
        let token = token.map(str::trim).filter(|t| !t.is_empty());
        let Some(token) = token else {
            return Err(UdqError::MissingUpdateSelector {
                name: name.to_string(),
            });
        };
        match token.to_ascii_uppercase().as_str() {
            "ON" => Ok(UpdateStatus::On),
            "OFF" => Ok(UpdateStatus::Off),
            "NEXT" => Ok(UpdateStatus::Next),
            _ => Err(UdqError::InvalidUpdateSelector {
                name: name.to_string(),
                token: token.to_string(),
            }),
        }
    }
}
