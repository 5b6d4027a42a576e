use serde::{Deserialize, Serialize};
use udq_core::Action;

use crate::define::SourceLocation;

/// One configuration record, as read from an input deck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "UPPERCASE")]
pub enum UdqRecord {
    Assign {
        name: String,
        #[serde(default)]
        selector: Vec<String>,
        value: f64,
    },
    Define {
        name: String,
        expression: Vec<String>,
        #[serde(default)]
        location: Option<SourceLocation>,
    },
    Units {
        name: String,
        unit: String,
    },
    Update {
        name: String,
        #[serde(default)]
        status: Option<String>,
    },
}

impl UdqRecord {
    pub fn action(&self) -> Action {
        match self {
            UdqRecord::Assign { .. } => Action::Assign,
            UdqRecord::Define { .. } => Action::Define,
            UdqRecord::Units { .. } => Action::Units,
            UdqRecord::Update { .. } => Action::Update,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            UdqRecord::Assign { name, .. }
            | UdqRecord::Define { name, .. }
            | UdqRecord::Units { name, .. }
            | UdqRecord::Update { name, .. } => name,
        }
    }
}
