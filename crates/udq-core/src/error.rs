use thiserror::Error;

use crate::Category;

pub type UdqResult<T> = Result<T, UdqError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum UdqError {
    #[error("Unknown function: {name}")]
    UnknownFunction { name: String },

    #[error("Domain error in {function}: argument {value} is out of range")]
    DomainError { function: &'static str, value: f64 },

    #[error("Size mismatch: lhs has {lhs} elements, rhs has {rhs}")]
    SizeMismatch { lhs: usize, rhs: usize },

    #[error("Category conflict: cannot combine {lhs} with {rhs}")]
    CategoryConflict { lhs: Category, rhs: Category },

    #[error("Illegal unit change for {name}: {old} -> {new}")]
    IllegalUnitChange {
        name: String,
        old: String,
        new: String,
    },

    #[error("Cyclic definition: {}", chain.join(" -> "))]
    CyclicDefinition { chain: Vec<String> },

    #[error("Undefined reference: {name}")]
    UndefinedReference { name: String },

    #[error("UPDATE for {name} needs one of ON, OFF or NEXT")]
    MissingUpdateSelector { name: String },

    #[error("Invalid UPDATE selector for {name}: {token}")]
    InvalidUpdateSelector { name: String, token: String },

    #[error("Malformed expression for {name}: {what}")]
    MalformedExpression { name: String, what: String },

    #[error("Invalid quantity name: {name}")]
    InvalidName { name: String },

    #[error("Unknown action: {token}")]
    UnknownAction { token: String },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Index out of bounds: {what} (index={index}, len={len})")]
    IndexOob {
        what: &'static str,
        index: usize,
        len: usize,
    },
}
