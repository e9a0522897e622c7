//! Variable representation for rule patterns and templates

use std::fmt;
use std::sync::Arc;

/// A named variable, scoped to the rule it appears in
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable {
    name: Arc<str>,
}

impl Variable {
    /// Create a variable; a leading `?` is stripped
    pub fn new(name: String) -> Self {
        let name = if name.starts_with('?') { name[1..].to_string() } else { name };
        Variable { name: Arc::from(name) }
    }

    /// Get the variable name (without the `?`)
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl From<&str> for Variable {
    fn from(s: &str) -> Self {
        Variable::new(s.to_string())
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}", self.name)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}", self.name)
    }
}
