//! Literal value representation

use std::fmt;

use crate::core::ns;

/// Datatype for a literal
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Datatype {
    /// Plain literal (no datatype)
    Plain,
    /// Language-tagged literal
    Language(String),
    /// Typed literal with datatype URI
    Typed(String),
}

/// An RDF literal value
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Literal {
    value: String,
    datatype: Datatype,
}

/// XSD datatypes whose lexical forms are read as integers
const INTEGER_TYPES: &[&str] = &[
    "integer", "long", "int", "short", "byte",
    "nonNegativeInteger", "positiveInteger", "nonPositiveInteger", "negativeInteger",
    "unsignedLong", "unsignedInt", "unsignedShort", "unsignedByte",
];

/// XSD datatypes whose lexical forms are read as floating point
const DECIMAL_TYPES: &[&str] = &["decimal", "double", "float"];

impl Literal {
    /// Create a plain literal
    pub fn plain(value: String) -> Self {
        Literal {
            value,
            datatype: Datatype::Plain,
        }
    }

    /// Create a typed literal
    pub fn typed(value: String, datatype: String) -> Self {
        Literal {
            value,
            datatype: Datatype::Typed(datatype),
        }
    }

    /// Create a language-tagged literal
    pub fn with_language(value: String, lang: String) -> Self {
        Literal {
            value,
            datatype: Datatype::Language(lang.to_lowercase()),
        }
    }

    /// Get the lexical value
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Get the datatype
    pub fn datatype(&self) -> &Datatype {
        &self.datatype
    }

    /// Check if this is a plain literal
    pub fn is_plain(&self) -> bool {
        matches!(self.datatype, Datatype::Plain)
    }

    /// Get the language tag if present
    pub fn language(&self) -> Option<&str> {
        match &self.datatype {
            Datatype::Language(lang) => Some(lang),
            _ => None,
        }
    }

    /// Get the datatype URI if present
    pub fn datatype_uri(&self) -> Option<&str> {
        match &self.datatype {
            Datatype::Typed(uri) => Some(uri),
            _ => None,
        }
    }

    /// The XSD local name of the datatype, if the datatype is in the XSD namespace
    fn xsd_type(&self) -> Option<&str> {
        self.datatype_uri().and_then(|dt| ns::local_name(dt, ns::XSD))
    }

    /// Check if this is a simple string (plain or `xsd:string`)
    pub fn is_string(&self) -> bool {
        self.is_plain() || self.xsd_type() == Some("string")
    }

    /// Check if this literal has a numeric XSD datatype
    pub fn is_numeric(&self) -> bool {
        self.xsd_type()
            .map(|t| INTEGER_TYPES.contains(&t) || DECIMAL_TYPES.contains(&t))
            .unwrap_or(false)
    }

    /// Read as an integer, if the datatype is an XSD integer type
    pub fn as_integer(&self) -> Option<i64> {
        match self.xsd_type() {
            Some(t) if INTEGER_TYPES.contains(&t) => self.value.trim().parse().ok(),
            _ => None,
        }
    }

    /// Read as a float, if the datatype is any XSD numeric type
    pub fn as_float(&self) -> Option<f64> {
        if self.is_numeric() {
            self.value.trim().parse().ok()
        } else {
            None
        }
    }

    /// Read as a boolean, if the datatype is `xsd:boolean`
    pub fn as_boolean(&self) -> Option<bool> {
        if self.xsd_type() != Some("boolean") {
            return None;
        }
        match self.value.as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        }
    }
}

impl fmt::Debug for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.datatype {
            Datatype::Plain => write!(f, "\"{}\"", self.value),
            Datatype::Language(lang) => write!(f, "\"{}\"@{}", self.value, lang),
            Datatype::Typed(dt) => write!(f, "\"{}\"^^<{}>", self.value, dt),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_literal() {
        let lit = Literal::plain("hello".into());
        assert_eq!(lit.value(), "hello");
        assert!(lit.is_plain());
        assert!(lit.is_string());
        assert_eq!(format!("{}", lit), "\"hello\"");
    }

    #[test]
    fn test_typed_literal() {
        let lit = Literal::typed("42".into(), "http://www.w3.org/2001/XMLSchema#integer".into());
        assert_eq!(lit.as_integer(), Some(42));
        assert_eq!(lit.as_float(), Some(42.0));
        assert!(!lit.is_plain());
        assert!(lit.is_numeric());
    }

    #[test]
    fn test_plain_digits_are_not_numeric() {
        let lit = Literal::plain("42".into());
        assert_eq!(lit.as_integer(), None);
        assert!(!lit.is_numeric());
    }

    #[test]
    fn test_boolean_literal() {
        let lit = Literal::typed("true".into(), "http://www.w3.org/2001/XMLSchema#boolean".into());
        assert_eq!(lit.as_boolean(), Some(true));
        assert_eq!(Literal::plain("true".into()).as_boolean(), None);
    }

    #[test]
    fn test_lang_literal() {
        let lit = Literal::with_language("hello".into(), "EN".into());
        assert_eq!(lit.language(), Some("en"));
        assert_eq!(format!("{}", lit), "\"hello\"@en");
    }
}
