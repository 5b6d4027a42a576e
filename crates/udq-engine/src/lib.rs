//! UDQ registry and per-step evaluation.
//!
//! A [`UdqConfig`] owns every user quantity of a run: literal assignments,
//! expression definitions, units and update policies. Once per report step
//! the host calls [`UdqConfig::eval`], which writes results into a
//! caller-owned [`QuantityState`] and appends them to an
//! [`EvaluationHistory`].
//!
//! # Architecture
//!
//! - Records arrive in step order through `add_assign`, `add_define`,
//!   `add_unit` and `add_update` (or the generic [`UdqRecord`])
//! - Definitions are postfix token lists checked for shape and category when
//!   they are added
//! - Evaluation applies pending assignments first, then active definitions,
//!   category by category; definitions pull their dependencies on demand
//! - The host supplies entity names and summary vectors through the
//!   [`EntitySource`] and [`SummarySource`] traits, and random draws through
//!   a [`RandomSource`](udq_functions::RandomSource)
//!
//! A failing quantity never aborts the step: it is left undefined and
//! reported as an [`EvalDiagnostic`].

pub mod assign;
pub mod config;
pub mod context;
pub mod define;
pub mod eval;
pub mod params;
pub mod record;
pub mod restart;
pub mod state;
pub mod token;

pub use assign::{AssignRecord, UdqAssign};
pub use config::{Quantity, QuantityIndex, UdqConfig};
pub use context::{EntityContext, EntitySource, SummarySource};
pub use define::{SourceLocation, UdqDefine, UpdateRecord};
pub use eval::{EvalContext, EvalDiagnostic, Operand, StepReport};
pub use params::{LoadError, UdqParams};
pub use record::UdqRecord;
pub use restart::{RestartExpression, RestartRecord};
pub use state::{EvaluationHistory, QuantityState, StepValue};
pub use token::Token;
