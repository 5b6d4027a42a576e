//! Deck file format.

use serde::{Deserialize, Serialize};
use udq_core::Category;
use udq_engine::{UdqParams, UdqRecord};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub params: UdqParams,
    #[serde(default)]
    pub entities: EntitiesDef,
    pub steps: Vec<StepDef>,
}

/// Entity names per category. In a step override, a listed category replaces
/// the previous list from that step on; unlisted categories are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntitiesDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wells: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connections: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segments: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aquifers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocks: Option<Vec<String>>,
}

impl EntitiesDef {
    pub fn names(&self, category: Category) -> Option<&[String]> {
        let list = match category {
            Category::WellVar => &self.wells,
            Category::GroupVar => &self.groups,
            Category::ConnectionVar => &self.connections,
            Category::RegionVar => &self.regions,
            Category::SegmentVar => &self.segments,
            Category::AquiferVar => &self.aquifers,
            Category::BlockVar => &self.blocks,
            Category::FieldVar | Category::Scalar | Category::None => return None,
        };
        list.as_deref()
    }

    /// Listed categories with their names, for validation.
    pub fn listed(&self) -> impl Iterator<Item = (Category, &[String])> {
        Category::EVALUATION_ORDER
            .into_iter()
            .filter_map(|c| self.names(c).map(|names| (c, names)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDef {
    pub step: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entities: Option<EntitiesDef>,
    #[serde(default)]
    pub records: Vec<UdqRecord>,
    #[serde(default)]
    pub summary: Vec<SummaryValue>,
}

/// One raw summary value; `entity` is absent for field values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryValue {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    pub value: f64,
}
