use crate::UdqError;

/// Floating point type used throughout system
pub type Real = f64;

/// Default relative epsilon for the tolerant comparisons (EQ, NE, LE, GE).
pub const DEFAULT_CMP_EPSILON: Real = 1e-4;

/// Epsilon-tolerant equality on the relative difference `(lhs - rhs) / lhs`.
///
/// An exact-zero difference is always equal, so `0 == 0` never divides by
/// zero. A zero `lhs` against a non-zero `rhs` yields an infinite relative
/// difference and compares unequal.
pub fn relative_eq(lhs: Real, rhs: Real, epsilon: Real) -> bool {
    let diff = lhs - rhs;
    if diff == 0.0 {
        return true;
    }
    (diff / lhs).abs() <= epsilon
}

/// Parse a token as a numeric literal.
///
/// Only tokens that start like a number are accepted, so names such as
/// `INF` or `NAN` stay names.
pub fn parse_literal(token: &str) -> Option<Real> {
    let token = token.trim();
    let body = token.strip_prefix(['+', '-']).unwrap_or(token);
    match body.chars().next() {
        Some(c) if c.is_ascii_digit() || c == '.' => token.parse::<Real>().ok(),
        _ => None,
    }
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, UdqError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(UdqError::InvalidArg { what })
    }
}
