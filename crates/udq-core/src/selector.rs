//! Entity selectors used by assignments and selector-qualified references.

use serde::{Deserialize, Serialize};

/// How specifically a selector matched an entity name.
///
/// Ordered from least to most specific, so `max` picks the strongest match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchKind {
    Wildcard,
    Pattern,
    Exact,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "names")]
pub enum Selector {
    /// Every entity of the category.
    #[default]
    All,
    /// Explicit names and glob patterns (`*`, `?`).
    Names(Vec<String>),
}

impl Selector {
    /// Build a selector from raw items. No items, or a lone `*`, select all.
    pub fn from_items<S: AsRef<str>>(items: &[S]) -> Self {
        let names: Vec<String> = items
            .iter()
            .map(|s| s.as_ref().trim().trim_matches('\'').to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if names.is_empty() || (names.len() == 1 && names[0] == "*") {
            Selector::All
        } else {
            Selector::Names(names)
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selector::All)
    }

    /// The entity name when the selector names exactly one concrete entity.
    pub fn single_name(&self) -> Option<&str> {
        match self {
            Selector::Names(names) if names.len() == 1 && !is_pattern(&names[0]) => {
                Some(names[0].as_str())
            }
            _ => None,
        }
    }

    /// Strongest way this selector matches `name`, if at all.
    pub fn matches(&self, name: &str) -> Option<MatchKind> {
        match self {
            Selector::All => Some(MatchKind::Wildcard),
            Selector::Names(items) => items
                .iter()
                .filter_map(|item| {
                    if item == name {
                        Some(MatchKind::Exact)
                    } else if item == "*" {
                        Some(MatchKind::Wildcard)
                    } else if is_pattern(item) && glob_match(item, name) {
                        Some(MatchKind::Pattern)
                    } else {
                        None
                    }
                })
                .max(),
        }
    }

    pub fn items(&self) -> &[String] {
        match self {
            Selector::All => &[],
            Selector::Names(names) => names,
        }
    }
}

pub fn is_pattern(item: &str) -> bool {
    item.contains(['*', '?'])
}

/// Shell-style match supporting `*` (any run) and `?` (any single char).
pub fn glob_match(pattern: &str, name: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let n: Vec<char> = name.chars().collect();
    let (mut pi, mut ni) = (0usize, 0usize);
    let mut star: Option<(usize, usize)> = None;

    while ni < n.len() {
        if pi < p.len() && (p[pi] == '?' || p[pi] == n[ni]) {
            pi += 1;
            ni += 1;
        } else if pi < p.len() && p[pi] == '*' {
            star = Some((pi, ni));
            pi += 1;
        } else if let Some((sp, sn)) = star {
            // backtrack: let the last star swallow one more char
            pi = sp + 1;
            ni = sn + 1;
            star = Some((sp, sn + 1));
        } else {
            return false;
        }
    }
    p[pi..].iter().all(|&c| c == '*')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glob_basics() {
        assert!(glob_match("P*", "PROD1"));
        assert!(glob_match("*", ""));
        assert!(glob_match("OP?", "OP1"));
        assert!(!glob_match("OP?", "OP12"));
        assert!(glob_match("*1", "OP1"));
        assert!(glob_match("O*P*2", "OXXPYY2"));
        assert!(!glob_match("I*", "PROD"));
    }

    #[test]
    fn from_items_normalizes() {
        assert!(Selector::from_items::<&str>(&[]).is_all());
        assert!(Selector::from_items(&["*"]).is_all());
        assert!(Selector::from_items(&["'*'"]).is_all());
        assert_eq!(Selector::from_items(&["'OP1'"]).single_name(), Some("OP1"));
        assert_eq!(Selector::from_items(&["OP*"]).single_name(), None);
        assert_eq!(Selector::from_items(&["OP1", "OP2"]).single_name(), None);
    }

    #[test]
    fn match_kind_prefers_exact() {
        let sel = Selector::from_items(&["P*", "PROD1"]);
        assert_eq!(sel.matches("PROD1"), Some(MatchKind::Exact));
        assert_eq!(sel.matches("PROD2"), Some(MatchKind::Pattern));
        assert_eq!(sel.matches("INJ"), None);
        assert_eq!(Selector::All.matches("INJ"), Some(MatchKind::Wildcard));
    }
}
