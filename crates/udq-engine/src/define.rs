//! Expression definitions.
//!
//! A definition binds a quantity name to a postfix token list. The list is
//! checked when the definition is added: it must reduce to exactly one
//! operand, and the category of that operand must fit the target quantity.
//! Evaluation walks the tokens with an operand stack, resolving references
//! through the [`EvalContext`].

use std::fmt;

use serde::{Deserialize, Serialize};
use udq_core::{Category, UdqError, UdqResult, UdqSet, UpdateStatus};
use udq_functions::{FunctionTable, UdqFunction};

use crate::eval::{EvalContext, Operand};
use crate::token::Token;

/// Where a record came from, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub keyword: String,
    pub file: String,
    pub line: usize,
}

impl SourceLocation {
    pub fn new(keyword: impl Into<String>, file: impl Into<String>, line: usize) -> Self {
        Self {
            keyword: keyword.into(),
            file: file.into(),
            line,
        }
    }
}

impl Default for SourceLocation {
    fn default() -> Self {
        Self::new("UDQ", "<memory>", 0)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {}:{}", self.keyword, self.file, self.line)
    }
}

/// Update status and the step at which it was set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRecord {
    pub status: UpdateStatus,
    pub report_step: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UdqDefine {
    name: String,
    category: Category,
    report_step: usize,
    location: SourceLocation,
    tokens: Vec<Token>,
    update: UpdateRecord,
}

impl UdqDefine {
    /// Tokenize and check a raw postfix expression.
    pub fn new<S: AsRef<str>>(
        name: &str,
        location: SourceLocation,
        raw_tokens: &[S],
        report_step: usize,
    ) -> UdqResult<Self> {
        let tokens = Token::tokenize(name, raw_tokens, FunctionTable::global())?;
        Self::from_tokens(name, location, tokens, report_step)
    }

    /// Build from already classified tokens.
    pub fn from_tokens(
        name: &str,
        location: SourceLocation,
        tokens: Vec<Token>,
        report_step: usize,
    ) -> UdqResult<Self> {
        let category = Category::of_quantity(name)?;
        let expression = expression_category(name, &tokens, FunctionTable::global())?;
        if !category.accepts(expression) {
            return Err(UdqError::CategoryConflict {
                lhs: category,
                rhs: expression,
            });
        }
        Ok(Self {
            name: name.to_string(),
            category,
            report_step,
            location,
            tokens,
            update: UpdateRecord {
                status: UpdateStatus::On,
                report_step,
            },
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn report_step(&self) -> usize {
        self.report_step
    }

    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn update(&self) -> UpdateRecord {
        self.update
    }

    pub fn update_status(&self) -> UpdateStatus {
        self.update.status
    }

    pub fn set_update(&mut self, status: UpdateStatus, report_step: usize) {
        self.update = UpdateRecord {
            status,
            report_step,
        };
    }

    /// Token list rendered back to text, space separated.
    pub fn input_string(&self) -> String {
        self.tokens
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Names of everything the expression reads.
    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().filter_map(Token::reference_name)
    }

    /// Evaluate against the current step. The result is named after this
    /// definition and sized for its category: one entry per entity, or a
    /// single entry for field quantities.
    pub fn eval(&self, ctx: &mut EvalContext<'_>) -> UdqResult<UdqSet> {
        let table = FunctionTable::global();
        let mut stack: Vec<Operand> = Vec::with_capacity(self.tokens.len());

        for token in &self.tokens {
            let operand = match token {
                Token::Number { value } => Operand::scalar(*value),
                Token::Reference { name, selector } => ctx.resolve(name, selector)?,
                Token::Function { name } => match table.get(name)? {
                    UdqFunction::Scalar(f) => {
                        let arg = pop(&self.name, &mut stack)?;
                        Operand {
                            set: f(&arg.set)?,
                            category: Category::Scalar,
                        }
                    }
                    UdqFunction::Unary(f) => {
                        let arg = pop(&self.name, &mut stack)?;
                        Operand {
                            set: f(&arg.set, ctx.rng())?,
                            category: arg.category,
                        }
                    }
                    UdqFunction::Binary(f) => {
                        let rhs = pop(&self.name, &mut stack)?;
                        let lhs = pop(&self.name, &mut stack)?;
                        let category = lhs.category.coerce(rhs.category)?;
                        let (l, r) = align(lhs, rhs)?;
                        Operand {
                            set: f(&l, &r, ctx.cmp_epsilon())?,
                            category,
                        }
                    }
                },
            };
            stack.push(operand);
        }

        let result = pop(&self.name, &mut stack)?;
        if !stack.is_empty() {
            return Err(leftover(&self.name, stack.len() + 1));
        }
        self.shape(result, ctx.entities().len(self.category))
    }

    fn shape(&self, result: Operand, entity_count: usize) -> UdqResult<UdqSet> {
        let Operand { set, category } = result;
        let set = if self.category.is_entity() {
            if category.is_scalar_like() {
                set.broadcast(entity_count)?
            } else if set.len() == entity_count {
                set
            } else {
                return Err(UdqError::SizeMismatch {
                    lhs: entity_count,
                    rhs: set.len(),
                });
            }
        } else if set.len() <= 1 {
            set.broadcast(1)?
        } else {
            return Err(UdqError::CategoryConflict {
                lhs: self.category,
                rhs: category,
            });
        };
        Ok(set.with_name(self.name.clone()))
    }
}

fn pop(owner: &str, stack: &mut Vec<Operand>) -> UdqResult<Operand> {
    stack.pop().ok_or_else(|| UdqError::MalformedExpression {
        name: owner.to_string(),
        what: "operator is missing an operand".into(),
    })
}

fn leftover(owner: &str, count: usize) -> UdqError {
    UdqError::MalformedExpression {
        name: owner.to_string(),
        what: format!("expression leaves {count} operands"),
    }
}

/// Bring two operands to a common length, broadcasting scalar-like ones.
fn align(lhs: Operand, rhs: Operand) -> UdqResult<(UdqSet, UdqSet)> {
    let (l, r) = (lhs.set.len(), rhs.set.len());
    if l == r {
        return Ok((lhs.set, rhs.set));
    }
    let lhs_scalar = lhs.category.is_scalar_like() && l <= 1;
    let rhs_scalar = rhs.category.is_scalar_like() && r <= 1;
    match (lhs_scalar, rhs_scalar) {
        (true, true) => {
            let n = l.max(r);
            Ok((lhs.set.broadcast(n)?, rhs.set.broadcast(n)?))
        }
        (false, true) => Ok((lhs.set, rhs.set.broadcast(l)?)),
        (true, false) => Ok((lhs.set.broadcast(r)?, rhs.set)),
        (false, false) => Err(UdqError::SizeMismatch { lhs: l, rhs: r }),
    }
}

/// Category an expression evaluates to, checking its shape on the way.
fn expression_category(owner: &str, tokens: &[Token], table: &FunctionTable) -> UdqResult<Category> {
    // each entry remembers the summary key that produced it, if any
    let mut stack: Vec<(Category, Option<&str>)> = Vec::new();
    let missing = || UdqError::MalformedExpression {
        name: owner.to_string(),
        what: "operator is missing an operand".into(),
    };

    for token in tokens {
        let entry = match token {
            Token::Number { .. } => (Category::Scalar, None),
            Token::Reference { name, selector } => {
                let key = (!Category::is_quantity_name(name)).then_some(name.as_str());
                (Category::classify(name, selector), key)
            }
            Token::Function { name } => match table.get(name)? {
                UdqFunction::Scalar(_) => {
                    stack.pop().ok_or_else(missing)?;
                    (Category::Scalar, None)
                }
                UdqFunction::Unary(_) => (stack.pop().ok_or_else(missing)?.0, None),
                UdqFunction::Binary(_) => {
                    let (rhs, _) = stack.pop().ok_or_else(missing)?;
                    let (lhs, _) = stack.pop().ok_or_else(missing)?;
                    (lhs.coerce(rhs)?, None)
                }
            },
        };
        stack.push(entry);
    }

    match stack.as_slice() {
        [(category, _)] => Ok(*category),
        [] => Err(missing()),
        [_, rest @ ..] => {
            // a key left over where an operator belongs is a misspelt function
            match rest.iter().rev().find_map(|(_, key)| *key) {
                Some(name) => Err(UdqError::UnknownFunction {
                    name: name.to_string(),
                }),
                None => Err(leftover(owner, stack.len())),
            }
        }
    }
}
