//! URI (IRI) representation

use std::fmt;

/// A URI reference
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Uri {
    value: String,
}

impl Uri {
    /// Create a new URI
    pub fn new(value: String) -> Self {
        Uri { value }
    }

    /// Get the URI as a string slice
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Get the local name (fragment or last path segment)
    pub fn local_name(&self) -> &str {
        if let Some(pos) = self.value.rfind('#') {
            &self.value[pos + 1..]
        } else if let Some(pos) = self.value.rfind('/') {
            &self.value[pos + 1..]
        } else {
            &self.value
        }
    }
}

impl fmt::Debug for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.value)
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.value)
    }
}

impl From<&str> for Uri {
    fn from(s: &str) -> Self {
        Uri::new(s.to_string())
    }
}

impl From<String> for Uri {
    fn from(s: String) -> Self {
        Uri::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_name() {
        let uri = Uri::new("http://example.org/foo#bar".into());
        assert_eq!(uri.local_name(), "bar");

        let uri2 = Uri::new("http://example.org/path/name".into());
        assert_eq!(uri2.local_name(), "name");
    }

    #[test]
    fn test_display() {
        let uri = Uri::from("http://example.org/a");
        assert_eq!(uri.to_string(), "<http://example.org/a>");
    }
}
