//! Function families and the name table.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use udq_core::{UdqError, UdqResult, UdqSet};

use crate::random::RandomSource;
use crate::{binary, scalar, unary};

/// Reduce a set to one value; returns an empty set when nothing is defined.
pub type ScalarFn = fn(&UdqSet) -> UdqResult<UdqSet>;

/// Elementwise map; the generator is only drawn from by `RANDN`/`RANDU`.
pub type UnaryFn = fn(&UdqSet, &mut dyn RandomSource) -> UdqResult<UdqSet>;

/// Combine two equally sized sets; the epsilon is used by the tolerant
/// comparisons.
pub type BinaryFn = fn(&UdqSet, &UdqSet, f64) -> UdqResult<UdqSet>;

#[derive(Debug, Clone, Copy)]
pub enum UdqFunction {
    Scalar(ScalarFn),
    Unary(UnaryFn),
    Binary(BinaryFn),
}

impl UdqFunction {
    /// Number of operands popped from the evaluation stack.
    pub fn arity(&self) -> usize {
        match self {
            UdqFunction::Scalar(_) | UdqFunction::Unary(_) => 1,
            UdqFunction::Binary(_) => 2,
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, UdqFunction::Scalar(_))
    }
}

/// Flat, case-sensitive name -> function table.
#[derive(Debug)]
pub struct FunctionTable {
    functions: BTreeMap<&'static str, UdqFunction>,
}

impl FunctionTable {
    /// The process-wide table; built on first use, read-only afterwards.
    pub fn global() -> &'static FunctionTable {
        static TABLE: OnceLock<FunctionTable> = OnceLock::new();
        TABLE.get_or_init(FunctionTable::build)
    }

    fn build() -> Self {
        use UdqFunction::{Binary, Scalar, Unary};

        let entries: [(&'static str, UdqFunction); 48] = [
            ("SUM", Scalar(scalar::sum)),
            ("PROD", Scalar(scalar::prod)),
            ("MIN", Scalar(scalar::min)),
            ("MAX", Scalar(scalar::max)),
            ("AVEA", Scalar(scalar::avea)),
            ("AVEG", Scalar(scalar::aveg)),
            ("AVEH", Scalar(scalar::aveh)),
            ("NORM1", Scalar(scalar::norm1)),
            ("NORM2", Scalar(scalar::norm2)),
            ("NORMI", Scalar(scalar::normi)),
            ("ABS", Unary(unary::abs)),
            ("EXP", Unary(unary::exp)),
            ("LN", Unary(unary::ln)),
            ("LOG", Unary(unary::log)),
            ("NINT", Unary(unary::nint)),
            ("DEF", Unary(unary::def)),
            ("UNDEF", Unary(unary::undef)),
            ("IDV", Unary(unary::idv)),
            ("SORTA", Unary(unary::sorta)),
            ("SORTD", Unary(unary::sortd)),
            ("RANDN", Unary(unary::randn)),
            ("RANDU", Unary(unary::randu)),
            ("ADD", Binary(binary::add)),
            ("SUB", Binary(binary::sub)),
            ("MUL", Binary(binary::mul)),
            ("DIV", Binary(binary::div)),
            ("POW", Binary(binary::pow)),
            ("GT", Binary(binary::gt)),
            ("LT", Binary(binary::lt)),
            ("LE", Binary(binary::le)),
            ("GE", Binary(binary::ge)),
            ("EQ", Binary(binary::eq)),
            ("NE", Binary(binary::ne)),
            ("UADD", Binary(binary::uadd)),
            ("UMUL", Binary(binary::umul)),
            ("UMIN", Binary(binary::umin)),
            ("UMAX", Binary(binary::umax)),
            ("+", Binary(binary::add)),
            ("-", Binary(binary::sub)),
            ("*", Binary(binary::mul)),
            ("/", Binary(binary::div)),
            ("^", Binary(binary::pow)),
            (">", Binary(binary::gt)),
            ("<", Binary(binary::lt)),
            ("<=", Binary(binary::le)),
            (">=", Binary(binary::ge)),
            ("==", Binary(binary::eq)),
            ("!=", Binary(binary::ne)),
        ];

        Self {
            functions: entries.into_iter().collect(),
        }
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn get(&self, name: &str) -> UdqResult<UdqFunction> {
        self.functions
            .get(name)
            .copied()
            .ok_or_else(|| UdqError::UnknownFunction {
                name: name.to_string(),
            })
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.functions.keys().copied()
    }
}
