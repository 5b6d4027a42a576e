//! Variable categories and the rules that combine them.
//!
//! Every quantity name carries a category in its first letter. Expressions
//! mixing categories are reconciled with [`Category::coerce`], applied left to
//! right across the operands.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::numeric::parse_literal;
use crate::selector::Selector;
use crate::{UdqError, UdqResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    WellVar,
    GroupVar,
    ConnectionVar,
    RegionVar,
    FieldVar,
    SegmentVar,
    AquiferVar,
    BlockVar,
    Scalar,
    None,
}

impl Category {
    /// Categories a quantity name can live in, in evaluation order.
    pub const EVALUATION_ORDER: [Category; 8] = [
        Category::WellVar,
        Category::GroupVar,
        Category::FieldVar,
        Category::ConnectionVar,
        Category::RegionVar,
        Category::SegmentVar,
        Category::AquiferVar,
        Category::BlockVar,
    ];

    /// Infer the category from the leading character of a name.
    ///
    /// Names that do not start with a category letter fall back to a numeric
    /// literal parse (Scalar) and otherwise to None.
    pub fn from_name(name: &str) -> Category {
        match name.chars().next() {
            Some('W') => Category::WellVar,
            Some('G') => Category::GroupVar,
            Some('C') => Category::ConnectionVar,
            Some('R') => Category::RegionVar,
            Some('F') => Category::FieldVar,
            Some('S') => Category::SegmentVar,
            Some('A') => Category::AquiferVar,
            Some('B') => Category::BlockVar,
            _ if parse_literal(name).is_some() => Category::Scalar,
            _ => Category::None,
        }
    }

    /// Category of a reference once its selector is taken into account.
    ///
    /// A well or group reference naming one concrete entity is a scalar.
    pub fn classify(name: &str, selector: &[String]) -> Category {
        let category = Category::from_name(name);
        match category {
            Category::WellVar | Category::GroupVar => {
                match Selector::from_items(selector).single_name() {
                    Some(_) => Category::Scalar,
                    None => category,
                }
            }
            other => other,
        }
    }

    /// Category of a user quantity name; only entity and field categories can
    /// hold a quantity.
    pub fn of_quantity(name: &str) -> UdqResult<Category> {
        let category = Category::from_name(name);
        if category.is_entity() || category == Category::FieldVar {
            Ok(category)
        } else {
            Err(UdqError::InvalidName {
                name: name.to_string(),
            })
        }
    }

    /// True for names with the shape of a user quantity: a category letter
    /// followed by `U`, e.g. `FUOPR` or `WU_RATE`.
    pub fn is_quantity_name(name: &str) -> bool {
        let mut chars = name.chars();
        let first = chars.next();
        let second = chars.next();
        second == Some('U')
            && first.is_some_and(|c| matches!(c, 'W' | 'G' | 'C' | 'R' | 'F' | 'S' | 'A' | 'B'))
    }

    /// Categories that evaluate to one value per named entity.
    pub fn is_entity(self) -> bool {
        matches!(
            self,
            Category::WellVar
                | Category::GroupVar
                | Category::ConnectionVar
                | Category::RegionVar
                | Category::SegmentVar
                | Category::AquiferVar
                | Category::BlockVar
        )
    }

    /// Categories that evaluate to a single value.
    pub fn is_scalar_like(self) -> bool {
        matches!(self, Category::FieldVar | Category::Scalar | Category::None)
    }

    fn class(self) -> u8 {
        match self {
            Category::WellVar | Category::GroupVar => 3,
            Category::ConnectionVar
            | Category::RegionVar
            | Category::SegmentVar
            | Category::AquiferVar
            | Category::BlockVar => 2,
            Category::FieldVar | Category::Scalar => 1,
            Category::None => 0,
        }
    }

    /// Combine the categories of a binary operation's operands.
    ///
    /// Identical categories pass through and well/group never mix. Otherwise
    /// the operand of the higher class wins (well/group, then the other
    /// entity categories, then field/scalar, then none) and the left operand
    /// wins a tie.
    pub fn coerce(self, rhs: Category) -> UdqResult<Category> {
        if self == rhs {
            return Ok(self);
        }
        if matches!(
            (self, rhs),
            (Category::WellVar, Category::GroupVar) | (Category::GroupVar, Category::WellVar)
        ) {
            return Err(UdqError::CategoryConflict { lhs: self, rhs });
        }
        if rhs.class() > self.class() {
            Ok(rhs)
        } else {
            Ok(self)
        }
    }

    /// Left fold of [`Category::coerce`]; an empty chain is None.
    pub fn coerce_all<I>(categories: I) -> UdqResult<Category>
    where
        I: IntoIterator<Item = Category>,
    {
        categories
            .into_iter()
            .try_fold(Category::None, |acc, next| acc.coerce(next))
    }

    /// Whether a value of category `value` may be stored in a quantity of
    /// category `self`. Scalar-like values broadcast over any target.
    pub fn accepts(self, value: Category) -> bool {
        value.is_scalar_like() || value == self
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Category::WellVar => "well",
            Category::GroupVar => "group",
            Category::ConnectionVar => "connection",
            Category::RegionVar => "region",
            Category::FieldVar => "field",
            Category::SegmentVar => "segment",
            Category::AquiferVar => "aquifer",
            Category::BlockVar => "block",
            Category::Scalar => "scalar",
            Category::None => "none",
        };
        f.write_str(label)
    }
}
