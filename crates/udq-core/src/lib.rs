//! udq-core: stable foundation for the UDQ engine.
//!
//! Contains:
//! - category (variable categories, name inference, coercion)
//! - action (record actions and update status)
//! - selector (entity selectors and glob matching)
//! - numeric (Real + epsilon-tolerant comparison)
//! - set (UdqSet, the nullable vector every quantity evaluates to)
//! - error (shared error types)

pub mod action;
pub mod category;
pub mod error;
pub mod numeric;
pub mod selector;
pub mod set;

// Re-exports: nice ergonomics for downstream crates
pub use action::{Action, UpdateStatus};
pub use category::Category;
pub use error::{UdqError, UdqResult};
pub use numeric::*;
pub use selector::{MatchKind, Selector};
pub use set::UdqSet;
