//! Binary functions: strict arithmetic, comparisons and union arithmetic.
//!
//! `GT` and `LT` compare the raw values. `EQ`, `NE`, `LE` and `GE` go through
//! [`relative_eq`] with the configured epsilon, so two values within the
//! relative tolerance are equal and therefore also `LE` and `GE`.

use udq_core::{UdqResult, UdqSet, relative_eq};

fn flag(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

pub fn add(lhs: &UdqSet, rhs: &UdqSet, _eps: f64) -> UdqResult<UdqSet> {
    lhs.binary(rhs, |a, b| a + b)
}

pub fn sub(lhs: &UdqSet, rhs: &UdqSet, _eps: f64) -> UdqResult<UdqSet> {
    lhs.binary(rhs, |a, b| a - b)
}

pub fn mul(lhs: &UdqSet, rhs: &UdqSet, _eps: f64) -> UdqResult<UdqSet> {
    lhs.binary(rhs, |a, b| a * b)
}

pub fn div(lhs: &UdqSet, rhs: &UdqSet, _eps: f64) -> UdqResult<UdqSet> {
    lhs.binary(rhs, |a, b| a / b)
}

pub fn pow(lhs: &UdqSet, rhs: &UdqSet, _eps: f64) -> UdqResult<UdqSet> {
    lhs.binary(rhs, f64::powf)
}

pub fn gt(lhs: &UdqSet, rhs: &UdqSet, _eps: f64) -> UdqResult<UdqSet> {
    lhs.binary(rhs, |a, b| flag(a > b))
}

pub fn lt(lhs: &UdqSet, rhs: &UdqSet, _eps: f64) -> UdqResult<UdqSet> {
    lhs.binary(rhs, |a, b| flag(a < b))
}

pub fn eq(lhs: &UdqSet, rhs: &UdqSet, eps: f64) -> UdqResult<UdqSet> {
    lhs.binary(rhs, |a, b| flag(relative_eq(a, b, eps)))
}

pub fn ne(lhs: &UdqSet, rhs: &UdqSet, eps: f64) -> UdqResult<UdqSet> {
    lhs.binary(rhs, |a, b| flag(!relative_eq(a, b, eps)))
}

pub fn le(lhs: &UdqSet, rhs: &UdqSet, eps: f64) -> UdqResult<UdqSet> {
    lhs.binary(rhs, |a, b| flag(relative_eq(a, b, eps) || a < b))
}

pub fn ge(lhs: &UdqSet, rhs: &UdqSet, eps: f64) -> UdqResult<UdqSet> {
    lhs.binary(rhs, |a, b| flag(relative_eq(a, b, eps) || a > b))
}

pub fn uadd(lhs: &UdqSet, rhs: &UdqSet, _eps: f64) -> UdqResult<UdqSet> {
    lhs.union(rhs, |a, b| a + b)
}

pub fn umul(lhs: &UdqSet, rhs: &UdqSet, _eps: f64) -> UdqResult<UdqSet> {
    lhs.union(rhs, |a, b| a * b)
}

pub fn umin(lhs: &UdqSet, rhs: &UdqSet, _eps: f64) -> UdqResult<UdqSet> {
    lhs.union(rhs, f64::min)
}

pub fn umax(lhs: &UdqSet, rhs: &UdqSet, _eps: f64) -> UdqResult<UdqSet> {
    lhs.union(rhs, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use udq_core::{DEFAULT_CMP_EPSILON, UdqError};

    fn sparse(values: &[Option<f64>]) -> UdqSet {
        UdqSet::from_values("S", values.to_vec())
    }

    fn lhs() -> UdqSet {
        sparse(&[Some(1.0), None, Some(2.0), None, Some(4.0)])
    }

    fn rhs() -> UdqSet {
        sparse(&[Some(0.9), None, Some(2.5), None, Some(4.0)])
    }

    #[test]
    fn eq_uses_relative_epsilon() {
        let strict = eq(&lhs(), &rhs(), 0.0).unwrap();
        assert_eq!(strict.defined_values(), vec![0.0, 0.0, 1.0]);
        let loose = eq(&lhs(), &rhs(), 0.20).unwrap();
        assert_eq!(loose.defined_values(), vec![1.0, 0.0, 1.0]);
        let ne_loose = ne(&lhs(), &rhs(), 0.20).unwrap();
        assert_eq!(ne_loose.defined_values(), vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn ge_and_le_include_tolerant_equality() {
        let ge_wide = ge(&lhs(), &rhs(), 1.0).unwrap();
        assert_eq!(ge_wide.defined_values(), vec![1.0, 1.0, 1.0]);
        let le_default = le(&lhs(), &rhs(), DEFAULT_CMP_EPSILON).unwrap();
        assert_eq!(le_default.defined_values(), vec![0.0, 1.0, 1.0]);
    }

    #[test]
    fn gt_lt_are_unscaled() {
        let g = gt(&lhs(), &rhs(), 1.0).unwrap();
        assert_eq!(g.defined_values(), vec![1.0, 0.0, 0.0]);
        let l = lt(&lhs(), &rhs(), 1.0).unwrap();
        assert_eq!(l.defined_values(), vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn zero_equals_zero() {
        let z = UdqSet::scalar("Z", 0.0);
        assert_eq!(eq(&z, &z, DEFAULT_CMP_EPSILON).unwrap().scalar_value(), Some(1.0));
    }

    #[test]
    fn union_family() {
        let a = sparse(&[Some(1.0), None, Some(2.0), None, None]);
        let b = sparse(&[Some(1.0), None, None, Some(3.0), None]);
        let sum = uadd(&a, &b, 0.0).unwrap();
        assert_eq!(sum.values(), &[Some(2.0), None, Some(2.0), Some(3.0), None]);
        assert_eq!(sum.defined_len(), 3);
        assert_eq!(umul(&a, &b, 0.0).unwrap().values()[0], Some(1.0));
        assert_eq!(umin(&a, &b, 0.0).unwrap().values()[3], Some(3.0));
        assert_eq!(umax(&a, &b, 0.0).unwrap().values()[2], Some(2.0));
    }

    #[test]
    fn strict_arithmetic() {
        let a = sparse(&[Some(2.0), Some(3.0), None]);
        let b = sparse(&[Some(3.0), None, Some(1.0)]);
        assert_eq!(pow(&a, &b, 0.0).unwrap().values(), &[Some(8.0), None, None]);
        assert_eq!(sub(&a, &b, 0.0).unwrap().values(), &[Some(-1.0), None, None]);
        assert!(matches!(
            add(&a, &UdqSet::new("X", 2), 0.0),
            Err(UdqError::SizeMismatch { lhs: 3, rhs: 2 })
        ));
    }
}
