//! Nullable value vectors.
//!
//! A [`UdqSet`] is what every quantity evaluates to: a named, ordered
//! sequence of optional doubles. Position `i` means whatever the entity
//! snapshot of the current step says it means; a scalar is a set of length
//! one. Undefined is distinct from zero and propagates through arithmetic
//! according to two regimes:
//!
//! - strict: the result is defined only where both operands are defined;
//! - union: the result is defined where either operand is defined.

use serde::{Deserialize, Serialize};

use crate::{Real, UdqError, UdqResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UdqSet {
    name: String,
    values: Vec<Option<Real>>,
}

impl UdqSet {
    /// Set of `len` undefined values.
    pub fn new(name: impl Into<String>, len: usize) -> Self {
        Self {
            name: name.into(),
            values: vec![None; len],
        }
    }

    /// Set with no entries; what a scalar reduction returns when nothing was
    /// defined.
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, 0)
    }

    pub fn scalar(name: impl Into<String>, value: Real) -> Self {
        Self::from_values(name, vec![Some(value)])
    }

    pub fn from_values(name: impl Into<String>, values: Vec<Option<Real>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Option<Real>] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<Real>> + '_ {
        self.values.iter().copied()
    }

    pub fn get(&self, index: usize) -> UdqResult<Option<Real>> {
        self.values
            .get(index)
            .copied()
            .ok_or(UdqError::IndexOob {
                what: "UdqSet::get",
                index,
                len: self.values.len(),
            })
    }

    /// Set entry `index` and mark it defined.
    pub fn assign(&mut self, index: usize, value: Real) -> UdqResult<()> {
        let len = self.values.len();
        let slot = self.values.get_mut(index).ok_or(UdqError::IndexOob {
            what: "UdqSet::assign",
            index,
            len,
        })?;
        *slot = Some(value);
        Ok(())
    }

    /// Mark entry `index` undefined.
    pub fn clear(&mut self, index: usize) -> UdqResult<()> {
        let len = self.values.len();
        let slot = self.values.get_mut(index).ok_or(UdqError::IndexOob {
            what: "UdqSet::clear",
            index,
            len,
        })?;
        *slot = None;
        Ok(())
    }

    /// Defined values in positional order.
    pub fn defined_values(&self) -> Vec<Real> {
        self.values.iter().flatten().copied().collect()
    }

    pub fn defined_len(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// The single value of a length-one set, `None` if empty or undefined.
    pub fn scalar_value(&self) -> Option<Real> {
        match self.values.as_slice() {
            [v] => *v,
            _ => None,
        }
    }

    /// Apply `f` to every defined entry; undefined entries stay undefined.
    pub fn map_defined(&self, f: impl Fn(Real) -> Real) -> UdqSet {
        UdqSet {
            name: self.name.clone(),
            values: self.values.iter().map(|v| v.map(&f)).collect(),
        }
    }

    /// Fallible [`UdqSet::map_defined`]; the first error aborts.
    pub fn try_map_defined(&self, f: impl Fn(Real) -> UdqResult<Real>) -> UdqResult<UdqSet> {
        let values = self
            .values
            .iter()
            .map(|v| v.map(&f).transpose())
            .collect::<UdqResult<Vec<_>>>()?;
        Ok(UdqSet {
            name: self.name.clone(),
            values,
        })
    }

    fn check_len(&self, rhs: &UdqSet) -> UdqResult<()> {
        if self.len() == rhs.len() {
            Ok(())
        } else {
            Err(UdqError::SizeMismatch {
                lhs: self.len(),
                rhs: rhs.len(),
            })
        }
    }

    /// Strict elementwise combination: defined iff both sides are defined.
    pub fn binary(&self, rhs: &UdqSet, f: impl Fn(Real, Real) -> Real) -> UdqResult<UdqSet> {
        self.check_len(rhs)?;
        let values = self
            .values
            .iter()
            .zip(&rhs.values)
            .map(|(a, b)| match (a, b) {
                (Some(a), Some(b)) => Some(f(*a, *b)),
                _ => None,
            })
            .collect();
        Ok(UdqSet {
            name: self.name.clone(),
            values,
        })
    }

    /// Union elementwise combination: a lone defined side passes through.
    pub fn union(&self, rhs: &UdqSet, f: impl Fn(Real, Real) -> Real) -> UdqResult<UdqSet> {
        self.check_len(rhs)?;
        let values = self
            .values
            .iter()
            .zip(&rhs.values)
            .map(|(a, b)| match (a, b) {
                (Some(a), Some(b)) => Some(f(*a, *b)),
                (Some(v), None) | (None, Some(v)) => Some(*v),
                (None, None) => None,
            })
            .collect();
        Ok(UdqSet {
            name: self.name.clone(),
            values,
        })
    }

    /// Stretch a scalar (length 0 or 1) over `len` entries.
    ///
    /// An empty set broadcasts to all undefined. A set that already has
    /// `len` entries is returned unchanged.
    pub fn broadcast(&self, len: usize) -> UdqResult<UdqSet> {
        match self.values.len() {
            n if n == len => Ok(self.clone()),
            0 => Ok(UdqSet::new(self.name.clone(), len)),
            1 => Ok(UdqSet {
                name: self.name.clone(),
                values: vec![self.values[0]; len],
            }),
            n => Err(UdqError::SizeMismatch { lhs: n, rhs: len }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sparse(values: &[Option<f64>]) -> UdqSet {
        UdqSet::from_values("S", values.to_vec())
    }

    #[test]
    fn assign_marks_defined() {
        let mut s = UdqSet::new("S", 3);
        assert_eq!(s.defined_len(), 0);
        s.assign(1, 2.0).unwrap();
        assert_eq!(s.get(1).unwrap(), Some(2.0));
        assert_eq!(s.defined_values(), vec![2.0]);
        assert!(s.assign(3, 1.0).is_err());
        assert!(s.get(7).is_err());
        s.clear(1).unwrap();
        assert_eq!(s.defined_len(), 0);
    }

    #[test]
    fn strict_requires_both() {
        let a = sparse(&[Some(1.0), None, Some(2.0), None, Some(4.0)]);
        let b = sparse(&[Some(1.0), None, None, Some(3.0), Some(4.0)]);
        let c = a.binary(&b, |x, y| x + y).unwrap();
        assert_eq!(c.values(), &[Some(2.0), None, None, None, Some(8.0)]);
    }

    #[test]
    fn union_passes_lone_side() {
        let a = sparse(&[Some(1.0), None, Some(2.0), None, None]);
        let b = sparse(&[Some(1.0), None, None, Some(3.0), None]);
        let c = a.union(&b, |x, y| x + y).unwrap();
        assert_eq!(c.values(), &[Some(2.0), None, Some(2.0), Some(3.0), None]);
        assert_eq!(c.defined_len(), 3);
    }

    #[test]
    fn length_mismatch_rejected() {
        let a = UdqSet::new("A", 2);
        let b = UdqSet::new("B", 3);
        assert_eq!(
            a.binary(&b, |x, y| x * y).unwrap_err(),
            UdqError::SizeMismatch { lhs: 2, rhs: 3 }
        );
        assert!(a.union(&b, |x, y| x * y).is_err());
    }

    #[test]
    fn division_by_zero_stays_ieee() {
        let a = UdqSet::scalar("A", 1.0);
        let b = UdqSet::scalar("B", 0.0);
        let c = a.binary(&b, |x, y| x / y).unwrap();
        assert_eq!(c.scalar_value(), Some(f64::INFINITY));
    }

    #[test]
    fn broadcast_scalars() {
        let s = UdqSet::scalar("S", 3.0).broadcast(3).unwrap();
        assert_eq!(s.defined_values(), vec![3.0, 3.0, 3.0]);
        let e = UdqSet::empty("E").broadcast(2).unwrap();
        assert_eq!(e.len(), 2);
        assert_eq!(e.defined_len(), 0);
        assert!(UdqSet::new("V", 2).broadcast(3).is_err());
    }

    #[test]
    fn try_map_stops_on_error() {
        let s = sparse(&[Some(1.0), None, Some(-1.0)]);
        let r = s.try_map_defined(|v| {
            if v > 0.0 {
                Ok(v.ln())
            } else {
                Err(UdqError::DomainError {
                    function: "LN",
                    value: v,
                })
            }
        });
        assert!(matches!(r, Err(UdqError::DomainError { .. })));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn pair() -> impl Strategy<Value = (Vec<Option<f64>>, Vec<Option<f64>>)> {
            (0usize..12).prop_flat_map(|n| {
                let entry = prop::option::of(-1e3f64..1e3);
                (
                    prop::collection::vec(entry.clone(), n),
                    prop::collection::vec(entry, n),
                )
            })
        }

        proptest! {
            #[test]
            fn strict_definedness_closure((a, b) in pair()) {
                let sa = UdqSet::from_values("A", a.clone());
                let sb = UdqSet::from_values("B", b.clone());
                let ops: [fn(f64, f64) -> f64; 4] =
                    [|x, y| x + y, |x, y| x - y, |x, y| x * y, |x, y| x / y];
                for op in ops {
                    let r = sa.binary(&sb, op).unwrap();
                    for i in 0..a.len() {
                        let defined = a[i].is_some() && b[i].is_some();
                        prop_assert_eq!(r.values()[i].is_some(), defined);
                    }
                }
            }

            #[test]
            fn union_definedness_closure((a, b) in pair()) {
                let sa = UdqSet::from_values("A", a.clone());
                let sb = UdqSet::from_values("B", b.clone());
                let r = sa.union(&sb, |x, y| x.min(y)).unwrap();
                for i in 0..a.len() {
                    prop_assert_eq!(r.values()[i].is_some(), a[i].is_some() || b[i].is_some());
                    if let (Some(x), None) = (a[i], b[i]) {
                        prop_assert_eq!(r.values()[i], Some(x));
                    }
                }
            }
        }
    }
}
