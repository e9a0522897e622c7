//! Named functions callable from expressions
//!
//! Functions are plain `fn` pointers registered by name, grouped the same way
//! throughout: string functions, term tests, numeric functions. Names are
//! matched case-insensitively so `isIRI` and `isiri` are the same function.

use std::collections::HashMap;
use std::fmt;

use regex::RegexBuilder;

use super::{EvalError, Numeric};
use crate::term::{Literal, Term};

/// A function over already-evaluated arguments
pub type ExprFn = fn(&[Term]) -> Result<Term, EvalError>;

/// Accepted argument counts for a function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    Range(usize, usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Arity::Exact(n) => count == n,
            Arity::Range(min, max) => (min..=max).contains(&count),
            Arity::AtLeast(min) => count >= min,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{}", n),
            Arity::Range(min, max) => write!(f, "{} to {}", min, max),
            Arity::AtLeast(min) => write!(f, "at least {}", min),
        }
    }
}

/// Registry of expression functions
pub struct FunctionRegistry {
    functions: HashMap<String, (Arity, ExprFn)>,
}

impl FunctionRegistry {
    /// Create a registry with the standard functions
    pub fn new() -> Self {
        let mut registry = FunctionRegistry::empty();
        registry.register_string();
        registry.register_term_tests();
        registry.register_numeric();
        registry
    }

    /// Create a registry with no functions at all
    pub fn empty() -> Self {
        FunctionRegistry {
            functions: HashMap::new(),
        }
    }

    /// Register a function, replacing any previous one with the same name
    pub fn register(&mut self, name: &str, arity: Arity, f: ExprFn) {
        self.functions.insert(name.to_lowercase(), (arity, f));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Call a function by name
    pub fn call(&self, name: &str, args: &[Term]) -> Result<Term, EvalError> {
        let (arity, f) = self
            .functions
            .get(&name.to_lowercase())
            .ok_or_else(|| EvalError::UnknownFunction(name.to_string()))?;

        if !arity.accepts(args.len()) {
            return Err(EvalError::Arity {
                function: name.to_string(),
                expected: *arity,
                found: args.len(),
            });
        }
        f(args)
    }

    fn register_string(&mut self) {
        // str(x) - lexical form of a literal, or the IRI of a named node
        self.register("str", Arity::Exact(1), |args| match &args[0] {
            Term::Uri(uri) => Ok(Term::literal(uri.as_str())),
            Term::Literal(lit) => Ok(Term::literal(lit.value())),
            other => Err(type_error("str", other)),
        });

        // strlen(s) - number of characters
        self.register("strlen", Arity::Exact(1), |args| {
            let lit = string_arg("strlen", &args[0])?;
            Ok(Term::integer(lit.value().chars().count() as i64))
        });

        // concat(s, ...) - joined lexical forms
        self.register("concat", Arity::AtLeast(1), |args| {
            let mut out = String::new();
            for arg in args {
                out.push_str(string_arg("concat", arg)?.value());
            }
            Ok(Term::literal(out))
        });

        // ucase(s) / lcase(s) keep a language tag
        self.register("ucase", Arity::Exact(1), |args| {
            let lit = string_arg("ucase", &args[0])?;
            Ok(same_kind(lit, lit.value().to_uppercase()))
        });

        self.register("lcase", Arity::Exact(1), |args| {
            let lit = string_arg("lcase", &args[0])?;
            Ok(same_kind(lit, lit.value().to_lowercase()))
        });

        self.register("contains", Arity::Exact(2), |args| {
            let text = string_arg("contains", &args[0])?;
            let needle = string_arg("contains", &args[1])?;
            Ok(Term::boolean(text.value().contains(needle.value())))
        });

        self.register("strstarts", Arity::Exact(2), |args| {
            let text = string_arg("strstarts", &args[0])?;
            let prefix = string_arg("strstarts", &args[1])?;
            Ok(Term::boolean(text.value().starts_with(prefix.value())))
        });

        // regex(text, pattern [, flags]) - flags as in SPARQL: i, m, s, x
        self.register("regex", Arity::Range(2, 3), |args| {
            let text = string_arg("regex", &args[0])?;
            let pattern = string_arg("regex", &args[1])?;

            let mut builder = RegexBuilder::new(pattern.value());
            if let Some(flags) = args.get(2) {
                for flag in string_arg("regex", flags)?.value().chars() {
                    match flag {
                        'i' => builder.case_insensitive(true),
                        'm' => builder.multi_line(true),
                        's' => builder.dot_matches_new_line(true),
                        'x' => builder.ignore_whitespace(true),
                        other => {
                            return Err(invalid("regex", format!("unknown flag '{}'", other)));
                        }
                    };
                }
            }

            let re = builder
                .build()
                .map_err(|e| invalid("regex", e.to_string()))?;
            Ok(Term::boolean(re.is_match(text.value())))
        });
    }

    fn register_term_tests(&mut self) {
        self.register("isIRI", Arity::Exact(1), |args| {
            Ok(Term::boolean(matches!(args[0], Term::Uri(_))))
        });

        self.register("isLiteral", Arity::Exact(1), |args| {
            Ok(Term::boolean(matches!(args[0], Term::Literal(_))))
        });

        self.register("isBlank", Arity::Exact(1), |args| {
            Ok(Term::boolean(matches!(args[0], Term::BlankNode(_))))
        });

        // localname(iri) - text after the last '#' or '/'
        self.register("localname", Arity::Exact(1), |args| match &args[0] {
            Term::Uri(uri) => Ok(Term::literal(uri.local_name())),
            other => Err(type_error("localname", other)),
        });

        // iri(s) - named node from a string; a named node is returned as is
        self.register("iri", Arity::Exact(1), |args| match &args[0] {
            Term::Uri(_) => Ok(args[0].clone()),
            Term::Literal(lit) if lit.is_string() => {
                if lit.value().is_empty() {
                    Err(invalid("iri", "empty IRI".to_string()))
                } else {
                    Ok(Term::uri(lit.value()))
                }
            }
            other => Err(type_error("iri", other)),
        });
    }

    fn register_numeric(&mut self) {
        self.register("abs", Arity::Exact(1), |args| {
            match Numeric::from_term(&args[0]) {
                Some(Numeric::Integer(i)) => i
                    .checked_abs()
                    .map(Term::integer)
                    .ok_or(EvalError::Overflow),
                Some(Numeric::Decimal(d)) => Ok(Numeric::Decimal(d.abs()).into_term()),
                None => Err(type_error("abs", &args[0])),
            }
        });
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.functions.keys().collect();
        names.sort();
        f.debug_struct("FunctionRegistry").field("functions", &names).finish()
    }
}

// ============================================================================
// Argument Helpers
// ============================================================================

fn type_error(function: &str, term: &Term) -> EvalError {
    EvalError::TypeError(format!("{}() cannot take {}", function, term))
}

fn invalid(function: &str, message: String) -> EvalError {
    EvalError::InvalidArgument {
        function: function.to_string(),
        message,
    }
}

/// A string literal argument (plain, `xsd:string` or language-tagged)
fn string_arg<'a>(function: &str, term: &'a Term) -> Result<&'a Literal, EvalError> {
    match term {
        Term::Literal(lit) if lit.is_string() || lit.language().is_some() => Ok(lit),
        other => Err(type_error(function, other)),
    }
}

/// A new string with the same language tag as `lit`, if any
fn same_kind(lit: &Literal, value: String) -> Term {
    match lit.language() {
        Some(lang) => Term::lang_literal(value, lang),
        None => Term::literal(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, args: &[Term]) -> Result<Term, EvalError> {
        FunctionRegistry::new().call(name, args)
    }

    #[test]
    fn test_standard_functions_registered() {
        let registry = FunctionRegistry::new();
        for name in [
            "str", "strlen", "concat", "ucase", "lcase", "contains", "strstarts", "regex",
            "isIRI", "isLiteral", "isBlank", "localname", "abs", "iri",
        ] {
            assert!(registry.contains(name), "missing {}", name);
        }
        assert!(FunctionRegistry::empty().is_empty());
    }

    #[test]
    fn test_string_functions() {
        assert_eq!(call("strlen", &[Term::literal("héllo")]), Ok(Term::integer(5)));
        assert_eq!(
            call("concat", &[Term::literal("a"), Term::literal("b"), Term::literal("c")]),
            Ok(Term::literal("abc"))
        );
        assert_eq!(
            call("ucase", &[Term::lang_literal("chat", "fr")]),
            Ok(Term::lang_literal("CHAT", "fr"))
        );
        assert_eq!(
            call("strstarts", &[Term::literal("foobar"), Term::literal("foo")]),
            Ok(Term::boolean(true))
        );
        assert_eq!(
            call("str", &[Term::uri("http://example.org/x")]),
            Ok(Term::literal("http://example.org/x"))
        );
    }

    #[test]
    fn test_regex_with_flags() {
        assert_eq!(
            call("regex", &[Term::literal("Alice"), Term::literal("^al")]),
            Ok(Term::boolean(false))
        );
        assert_eq!(
            call("regex", &[Term::literal("Alice"), Term::literal("^al"), Term::literal("i")]),
            Ok(Term::boolean(true))
        );
        assert!(matches!(
            call("regex", &[Term::literal("x"), Term::literal("(")]),
            Err(EvalError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_term_tests_and_names() {
        let iri = Term::uri("http://example.org/ns#thing");
        assert_eq!(call("ISIRI", &[iri.clone()]), Ok(Term::boolean(true)));
        assert_eq!(call("isBlank", &[iri.clone()]), Ok(Term::boolean(false)));
        assert_eq!(call("localname", &[iri]), Ok(Term::literal("thing")));
        assert_eq!(
            call("iri", &[Term::literal("http://example.org/y")]),
            Ok(Term::uri("http://example.org/y"))
        );
    }

    #[test]
    fn test_abs() {
        assert_eq!(call("abs", &[Term::integer(-4)]), Ok(Term::integer(4)));
        assert_eq!(call("abs", &[Term::decimal(-1.5)]), Ok(Term::decimal(1.5)));
        assert!(call("abs", &[Term::literal("x")]).is_err());
    }

    #[test]
    fn test_arity_and_unknown_function() {
        assert!(matches!(
            call("strlen", &[]),
            Err(EvalError::Arity { found: 0, .. })
        ));
        assert_eq!(
            call("nope", &[]),
            Err(EvalError::UnknownFunction("nope".to_string()))
        );
    }

    #[test]
    fn test_custom_registration() {
        let mut registry = FunctionRegistry::empty();
        registry.register("twice", Arity::Exact(1), |args| {
            let lit = string_arg("twice", &args[0])?;
            Ok(Term::literal(lit.value().repeat(2)))
        });
        assert_eq!(registry.call("twice", &[Term::literal("ab")]), Ok(Term::literal("abab")));
    }
}
