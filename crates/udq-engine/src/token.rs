//! Postfix expression tokens.

use std::fmt;

use serde::{Deserialize, Serialize};
use udq_core::{UdqError, UdqResult, parse_literal};
use udq_functions::FunctionTable;

/// One element of a postfix expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Token {
    /// Numeric literal.
    Number { value: f64 },

    /// Function name or operator symbol.
    Function { name: String },

    /// Quantity or summary vector, optionally restricted to entities.
    Reference {
        name: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        selector: Vec<String>,
    },
}

impl Token {
    /// Classify raw postfix tokens.
    ///
    /// A quoted token (`'OP*'`) is a selector and attaches to the reference
    /// right before it. `owner` names the expression in errors.
    pub fn tokenize<S: AsRef<str>>(
        owner: &str,
        raw: &[S],
        table: &FunctionTable,
    ) -> UdqResult<Vec<Token>> {
        let mut tokens: Vec<Token> = Vec::with_capacity(raw.len());
        for item in raw {
            let item = item.as_ref().trim();
            if item.is_empty() {
                continue;
            }
            if let Some(quoted) = item.strip_prefix('\'') {
                let entity = quoted.strip_suffix('\'').unwrap_or(quoted).to_string();
                match tokens.last_mut() {
                    Some(Token::Reference { selector, .. }) => selector.push(entity),
                    _ => {
                        return Err(UdqError::MalformedExpression {
                            name: owner.to_string(),
                            what: format!("selector {item} does not follow a reference"),
                        });
                    }
                }
                continue;
            }

            let token = if let Some(value) = parse_literal(item) {
                Token::Number { value }
            } else if table.has_function(item) {
                Token::Function {
                    name: item.to_string(),
                }
            } else {
                Token::Reference {
                    name: item.to_string(),
                    selector: Vec::new(),
                }
            };
            tokens.push(token);
        }
        Ok(tokens)
    }

    pub fn reference_name(&self) -> Option<&str> {
        match self {
            Token::Reference { name, .. } => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number { value } => write!(f, "{value}"),
            Token::Function { name } => f.write_str(name),
            Token::Reference { name, selector } => {
                f.write_str(name)?;
                for entity in selector {
                    write!(f, " '{entity}'")?;
                }
                Ok(())
            }
        }
    }
}
