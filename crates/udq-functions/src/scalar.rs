//! Scalar-reducing functions.
//!
//! Each reduces the defined entries of a set to a length-one set. With no
//! defined input the result is the empty set, which callers must not read as
//! zero.

use udq_core::{UdqError, UdqResult, UdqSet};

fn reduce(set: &UdqSet, f: impl Fn(&[f64]) -> UdqResult<f64>) -> UdqResult<UdqSet> {
    let values = set.defined_values();
    if values.is_empty() {
        return Ok(UdqSet::empty(set.name()));
    }
    Ok(UdqSet::scalar(set.name(), f(&values)?))
}

pub fn sum(set: &UdqSet) -> UdqResult<UdqSet> {
    reduce(set, |v| Ok(v.iter().sum()))
}

pub fn prod(set: &UdqSet) -> UdqResult<UdqSet> {
    reduce(set, |v| Ok(v.iter().product()))
}

pub fn min(set: &UdqSet) -> UdqResult<UdqSet> {
    reduce(set, |v| Ok(v.iter().copied().fold(f64::INFINITY, f64::min)))
}

pub fn max(set: &UdqSet) -> UdqResult<UdqSet> {
    reduce(set, |v| Ok(v.iter().copied().fold(f64::NEG_INFINITY, f64::max)))
}

/// Arithmetic mean.
pub fn avea(set: &UdqSet) -> UdqResult<UdqSet> {
    reduce(set, |v| Ok(v.iter().sum::<f64>() / v.len() as f64))
}

/// Geometric mean, computed as the exponential of the mean logarithm.
pub fn aveg(set: &UdqSet) -> UdqResult<UdqSet> {
    reduce(set, |v| {
        let mut log_sum = 0.0;
        for &x in v {
            if x <= 0.0 {
                return Err(UdqError::DomainError {
                    function: "AVEG",
                    value: x,
                });
            }
            log_sum += x.ln();
        }
        Ok((log_sum / v.len() as f64).exp())
    })
}

/// Harmonic mean.
pub fn aveh(set: &UdqSet) -> UdqResult<UdqSet> {
    reduce(set, |v| Ok(v.len() as f64 / v.iter().map(|x| 1.0 / x).sum::<f64>()))
}

pub fn norm1(set: &UdqSet) -> UdqResult<UdqSet> {
    reduce(set, |v| Ok(v.iter().map(|x| x.abs()).sum()))
}

pub fn norm2(set: &UdqSet) -> UdqResult<UdqSet> {
    reduce(set, |v| Ok(v.iter().map(|x| x * x).sum::<f64>().sqrt()))
}

pub fn normi(set: &UdqSet) -> UdqResult<UdqSet> {
    reduce(set, |v| Ok(v.iter().fold(0.0, |acc: f64, x| acc.max(x.abs()))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> UdqSet {
        UdqSet::from_values("S", vec![Some(1.0), None, Some(4.0), Some(4.0), None])
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn reductions_skip_undefined() {
        let s = sample();
        assert_eq!(sum(&s).unwrap().scalar_value(), Some(9.0));
        assert_eq!(prod(&s).unwrap().scalar_value(), Some(16.0));
        assert_eq!(min(&s).unwrap().scalar_value(), Some(1.0));
        assert_eq!(max(&s).unwrap().scalar_value(), Some(4.0));
        assert_eq!(avea(&s).unwrap().scalar_value(), Some(3.0));
    }

    #[test]
    fn means_and_norms() {
        let s = sample();
        assert!(close(aveg(&s).unwrap().scalar_value().unwrap(), 16f64.powf(1.0 / 3.0)));
        assert!(close(aveh(&s).unwrap().scalar_value().unwrap(), 2.0));
        let n = UdqSet::from_values("N", vec![Some(-3.0), Some(4.0), None]);
        assert_eq!(norm1(&n).unwrap().scalar_value(), Some(7.0));
        assert_eq!(norm2(&n).unwrap().scalar_value(), Some(5.0));
        assert_eq!(normi(&n).unwrap().scalar_value(), Some(4.0));
    }

    #[test]
    fn nothing_defined_gives_empty() {
        let s = UdqSet::new("S", 4);
        for f in [sum, prod, min, max, avea, aveg, aveh, norm1, norm2, normi] {
            let r = f(&s).unwrap();
            assert!(r.is_empty());
            assert_eq!(r.name(), "S");
        }
    }

    #[test]
    fn aveg_rejects_non_positive() {
        let s = UdqSet::from_values("S", vec![Some(1.0), Some(0.0)]);
        assert!(matches!(
            aveg(&s),
            Err(UdqError::DomainError { function: "AVEG", .. })
        ));
    }
}
