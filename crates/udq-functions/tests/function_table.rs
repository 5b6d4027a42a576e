//! Integration tests for dispatch through the shared function table.

use rand::SeedableRng;
use rand::rngs::StdRng;
use udq_core::{DEFAULT_CMP_EPSILON, UdqError, UdqSet};
use udq_functions::{FunctionTable, UdqFunction};

fn apply(name: &str, args: &[&UdqSet]) -> Result<UdqSet, UdqError> {
    let mut rng = StdRng::seed_from_u64(42);
    match FunctionTable::global().get(name)? {
        UdqFunction::Scalar(f) => f(args[0]),
        UdqFunction::Unary(f) => f(args[0], &mut rng),
        UdqFunction::Binary(f) => f(args[0], args[1], DEFAULT_CMP_EPSILON),
    }
}

#[test]
fn operator_symbols_alias_named_functions() {
    let a = UdqSet::from_values("A", vec![Some(6.0), Some(2.0), None]);
    let b = UdqSet::from_values("B", vec![Some(3.0), Some(2.0), Some(1.0)]);
    for (symbol, name) in [
        ("+", "ADD"),
        ("-", "SUB"),
        ("*", "MUL"),
        ("/", "DIV"),
        ("^", "POW"),
        (">", "GT"),
        ("<", "LT"),
        (">=", "GE"),
        ("<=", "LE"),
        ("==", "EQ"),
        ("!=", "NE"),
    ] {
        assert_eq!(apply(symbol, &[&a, &b]).unwrap(), apply(name, &[&a, &b]).unwrap());
    }
}

#[test]
fn unknown_name_fails_lookup() {
    let s = UdqSet::scalar("S", 1.0);
    assert_eq!(
        apply("MEDIAN", &[&s]).unwrap_err(),
        UdqError::UnknownFunction {
            name: "MEDIAN".into()
        }
    );
}

#[test]
fn reduction_after_elemental() {
    let s = UdqSet::from_values("S", vec![Some(-1.0), None, Some(-3.0)]);
    let abs = apply("ABS", &[&s]).unwrap();
    let sum = apply("SUM", &[&abs]).unwrap();
    assert_eq!(sum.scalar_value(), Some(4.0));
    let idv = apply("IDV", &[&s]).unwrap();
    assert_eq!(apply("SUM", &[&idv]).unwrap().scalar_value(), Some(2.0));
}

#[test]
fn random_functions_follow_generator() {
    let s = UdqSet::from_values("S", vec![Some(1.0); 5]);
    let first = apply("RANDN", &[&s]).unwrap();
    let second = apply("RANDN", &[&s]).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.defined_len(), 5);
}
