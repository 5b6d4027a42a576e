//! Elementwise unary functions.

use udq_core::{UdqError, UdqResult, UdqSet};

use crate::random::RandomSource;

pub fn abs(set: &UdqSet, _rng: &mut dyn RandomSource) -> UdqResult<UdqSet> {
    Ok(set.map_defined(f64::abs))
}

pub fn exp(set: &UdqSet, _rng: &mut dyn RandomSource) -> UdqResult<UdqSet> {
    Ok(set.map_defined(f64::exp))
}

fn positive(function: &'static str, value: f64) -> UdqResult<f64> {
    if value > 0.0 {
        Ok(value)
    } else {
        Err(UdqError::DomainError { function, value })
    }
}

pub fn ln(set: &UdqSet, _rng: &mut dyn RandomSource) -> UdqResult<UdqSet> {
    set.try_map_defined(|v| positive("LN", v).map(f64::ln))
}

/// Base-10 logarithm.
pub fn log(set: &UdqSet, _rng: &mut dyn RandomSource) -> UdqResult<UdqSet> {
    set.try_map_defined(|v| positive("LOG", v).map(f64::log10))
}

/// Nearest integer, halves away from zero.
pub fn nint(set: &UdqSet, _rng: &mut dyn RandomSource) -> UdqResult<UdqSet> {
    Ok(set.map_defined(f64::round))
}

/// 1 where the input is defined.
pub fn def(set: &UdqSet, _rng: &mut dyn RandomSource) -> UdqResult<UdqSet> {
    Ok(set.map_defined(|_| 1.0))
}

/// 1 where the input is undefined; undefined where it was defined.
pub fn undef(set: &UdqSet, _rng: &mut dyn RandomSource) -> UdqResult<UdqSet> {
    let values = set
        .iter()
        .map(|v| match v {
            Some(_) => None,
            None => Some(1.0),
        })
        .collect();
    Ok(UdqSet::from_values(set.name(), values))
}

/// Definedness mask: 1 if defined, 0 otherwise. Never undefined.
pub fn idv(set: &UdqSet, _rng: &mut dyn RandomSource) -> UdqResult<UdqSet> {
    let values = set
        .iter()
        .map(|v| Some(if v.is_some() { 1.0 } else { 0.0 }))
        .collect();
    Ok(UdqSet::from_values(set.name(), values))
}

fn rank(set: &UdqSet, descending: bool) -> UdqResult<UdqSet> {
    let mut defined: Vec<(usize, f64)> = set
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i, v)))
        .collect();
    // stable: equal values keep their positional order
    if descending {
        defined.sort_by(|a, b| b.1.total_cmp(&a.1));
    } else {
        defined.sort_by(|a, b| a.1.total_cmp(&b.1));
    }

    let mut out = UdqSet::new(set.name(), set.len());
    for (position, (index, _)) in defined.into_iter().enumerate() {
        out.assign(index, (position + 1) as f64)?;
    }
    Ok(out)
}

/// 1-based ascending rank of each defined entry.
pub fn sorta(set: &UdqSet, _rng: &mut dyn RandomSource) -> UdqResult<UdqSet> {
    rank(set, false)
}

/// 1-based descending rank of each defined entry.
pub fn sortd(set: &UdqSet, _rng: &mut dyn RandomSource) -> UdqResult<UdqSet> {
    rank(set, true)
}

fn draw(set: &UdqSet, mut sample: impl FnMut() -> f64) -> UdqSet {
    let values = set.iter().map(|v| v.map(|_| sample())).collect();
    UdqSet::from_values(set.name(), values)
}

/// Standard normal draw for each defined entry.
pub fn randn(set: &UdqSet, rng: &mut dyn RandomSource) -> UdqResult<UdqSet> {
    Ok(draw(set, || rng.standard_normal()))
}

/// Uniform draw in `[-1, 1)` for each defined entry.
pub fn randu(set: &UdqSet, rng: &mut dyn RandomSource) -> UdqResult<UdqSet> {
    Ok(draw(set, || rng.uniform()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(1)
    }

    fn sparse(values: &[Option<f64>]) -> UdqSet {
        UdqSet::from_values("S", values.to_vec())
    }

    #[test]
    fn log_and_ln_reject_non_positive() {
        let s = sparse(&[Some(-1.0), None, None]);
        assert!(matches!(
            ln(&s, &mut rng()),
            Err(UdqError::DomainError { function: "LN", .. })
        ));
        assert!(matches!(
            log(&s, &mut rng()),
            Err(UdqError::DomainError { function: "LOG", .. })
        ));
        let ok = sparse(&[Some(100.0), None]);
        assert_eq!(log(&ok, &mut rng()).unwrap().values(), &[Some(2.0), None]);
    }

    #[test]
    fn nint_rounds_to_nearest() {
        let s = sparse(&[Some(0.75), Some(1.25), Some(-2.5), None]);
        assert_eq!(
            nint(&s, &mut rng()).unwrap().values(),
            &[Some(1.0), Some(1.0), Some(-3.0), None]
        );
    }

    #[test]
    fn def_undef_idv_masks() {
        let s = sparse(&[Some(5.0), None, Some(0.0)]);
        assert_eq!(
            def(&s, &mut rng()).unwrap().values(),
            &[Some(1.0), None, Some(1.0)]
        );
        assert_eq!(
            undef(&s, &mut rng()).unwrap().values(),
            &[None, Some(1.0), None]
        );
        assert_eq!(
            idv(&s, &mut rng()).unwrap().values(),
            &[Some(1.0), Some(0.0), Some(1.0)]
        );
    }

    #[test]
    fn sort_ranks_are_stable() {
        let s = sparse(&[None, Some(3.0), Some(1.0), Some(3.0)]);
        assert_eq!(
            sorta(&s, &mut rng()).unwrap().values(),
            &[None, Some(2.0), Some(1.0), Some(3.0)]
        );
        assert_eq!(
            sortd(&s, &mut rng()).unwrap().values(),
            &[None, Some(1.0), Some(3.0), Some(2.0)]
        );
    }

    #[test]
    fn sort_matches_reference_vectors() {
        let s = sparse(&[Some(1.0), None, Some(2.0), None, Some(4.0)]);
        assert_eq!(
            sorta(&s, &mut rng()).unwrap().values(),
            &[Some(1.0), None, Some(2.0), None, Some(3.0)]
        );
        assert_eq!(
            sortd(&s, &mut rng()).unwrap().values(),
            &[Some(3.0), None, Some(2.0), None, Some(1.0)]
        );
    }

    #[test]
    fn random_draws_only_defined_entries() {
        let s = sparse(&[Some(0.0), None, Some(0.0)]);
        let n = randn(&s, &mut rng()).unwrap();
        assert_eq!(n.defined_len(), 2);
        assert!(n.values()[1].is_none());
        let u = randu(&s, &mut rng()).unwrap();
        assert!(u.defined_values().iter().all(|v| (-1.0..1.0).contains(v)));
    }

    #[test]
    fn seeded_draws_repeat() {
        assert!(randn(&UdqSet::empty("S"), &mut rng()).unwrap().is_empty());
        let t = sparse(&[Some(1.0), Some(1.0)]);
        assert_eq!(randn(&t, &mut rng()).unwrap(), randn(&t, &mut rng()).unwrap());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn idv_is_total_mask(values in prop::collection::vec(prop::option::of(-10.0f64..10.0), 0..16)) {
                let s = UdqSet::from_values("S", values.clone());
                let mask = idv(&s, &mut rng()).unwrap();
                prop_assert_eq!(mask.defined_len(), values.len());
                for (m, v) in mask.iter().zip(&values) {
                    prop_assert_eq!(m, Some(if v.is_some() { 1.0 } else { 0.0 }));
                }
            }

            #[test]
            fn sort_ranks_form_permutation(values in prop::collection::vec(prop::option::of(-10.0f64..10.0), 0..16)) {
                let s = UdqSet::from_values("S", values.clone());
                for ranks in [sorta(&s, &mut rng()).unwrap(), sortd(&s, &mut rng()).unwrap()] {
                    let mut r: Vec<usize> = ranks.defined_values().iter().map(|v| *v as usize).collect();
                    r.sort_unstable();
                    let expected: Vec<usize> = (1..=s.defined_len()).collect();
                    prop_assert_eq!(r, expected);
                }
            }
        }
    }
}
