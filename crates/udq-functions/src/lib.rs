//! Function library for UDQ expressions.
//!
//! Functions are looked up by name (or operator symbol) in a flat table that
//! is built once per process and shared read-only afterwards.
//!
//! # Architecture
//!
//! Every function belongs to one of three families with a fixed signature:
//! - **Scalar**: reduce a set to a single value (`SUM`, `AVEG`, `NORM2`, ...)
//! - **Unary**: map a set elementwise to a set of the same length (`ABS`,
//!   `SORTA`, `RANDN`, ...)
//! - **Binary**: combine two equally sized sets (`+`, `EQ`, `UADD`, ...)
//!
//! Random draws come from a [`RandomSource`] supplied by the caller; the
//! library holds no generator of its own.

pub mod binary;
pub mod function;
pub mod random;
pub mod scalar;
pub mod unary;

pub use function::{BinaryFn, FunctionTable, ScalarFn, UdqFunction, UnaryFn};
pub use random::RandomSource;
