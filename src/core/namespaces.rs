//! Standard RDF namespace URI constants
//!
//! Used by the term model (XSD datatypes of literals) and by the
//! expression functions when classifying terms.

/// Standard namespace URI constants
pub mod ns {
    /// RDF namespace
    pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    /// RDF Schema namespace
    pub const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";
    /// XML Schema Datatypes namespace
    pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";

    /// Helper to construct a full URI from namespace and local name
    #[inline]
    pub fn uri(namespace: &str, local: &str) -> String {
        format!("{}{}", namespace, local)
    }

    /// Check if a URI belongs to a namespace
    #[inline]
    pub fn in_namespace(uri: &str, namespace: &str) -> bool {
        uri.starts_with(namespace)
    }

    /// Extract local name from a URI given its namespace
    #[inline]
    pub fn local_name<'a>(uri: &'a str, namespace: &str) -> Option<&'a str> {
        uri.strip_prefix(namespace)
    }
}

#[cfg(test)]
mod tests {
    use super::ns;

    #[test]
    fn test_uri_construction() {
        assert_eq!(
            ns::uri(ns::XSD, "integer"),
            "http://www.w3.org/2001/XMLSchema#integer"
        );
        assert_eq!(
            ns::uri(ns::RDF, "type"),
            "http://www.w3.org/1999/02/22-rdf-syntax-ns#type"
        );
    }

    #[test]
    fn test_namespace_check() {
        assert!(ns::in_namespace("http://www.w3.org/2000/01/rdf-schema#label", ns::RDFS));
        assert!(!ns::in_namespace("http://www.w3.org/2001/XMLSchema#string", ns::RDFS));
    }

    #[test]
    fn test_local_name() {
        assert_eq!(
            ns::local_name("http://www.w3.org/2001/XMLSchema#decimal", ns::XSD),
            Some("decimal")
        );
        assert_eq!(ns::local_name("http://www.w3.org/2001/XMLSchema#decimal", ns::RDF), None);
    }
}
