//! Expression language for rule conditions and assignments
//!
//! Expressions are small trees over terms and variables. The engine never
//! inspects them; it hands them to an [`ExprEvaluator`] together with the
//! current binding. [`StandardEvaluator`] is the implementation used by
//! default:
//! - logical connectives with SPARQL-style error tolerance
//! - comparisons over numbers, strings and terms
//! - integer and decimal arithmetic
//! - named function calls dispatched through a [`FunctionRegistry`]

mod functions;

pub use functions::{Arity, ExprFn, FunctionRegistry};

use std::fmt;

use thiserror::Error;

use crate::core::ExprEvaluator;
use crate::term::{Binding, Term, Variable};

/// Errors raised while evaluating an expression
///
/// These never abort an evaluation run: a failing condition filters its
/// binding out and a failing assignment drops its binding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("unbound variable {0}")]
    UnboundVariable(Variable),

    #[error("type error: {0}")]
    TypeError(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("integer overflow")]
    Overflow,

    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    #[error("{function}() expects {expected} argument(s), found {found}")]
    Arity {
        function: String,
        expected: Arity,
        found: usize,
    },

    #[error("invalid argument to {function}(): {message}")]
    InvalidArgument { function: String, message: String },
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }

    fn holds(&self, ordering: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::*;
        match self {
            CompareOp::Eq => ordering == Equal,
            CompareOp::Ne => ordering != Equal,
            CompareOp::Lt => ordering == Less,
            CompareOp::Le => ordering != Greater,
            CompareOp::Gt => ordering == Greater,
            CompareOp::Ge => ordering != Less,
        }
    }
}

/// Arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithOp {
    fn symbol(&self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
        }
    }
}

/// An expression over terms and rule variables
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A constant term
    Constant(Term),
    /// The value bound to a variable
    Var(Variable),
    /// Logical negation of the effective boolean value
    Not(Box<Expr>),
    /// Logical conjunction
    And(Box<Expr>, Box<Expr>),
    /// Logical disjunction
    Or(Box<Expr>, Box<Expr>),
    /// Binary comparison
    Compare(CompareOp, Box<Expr>, Box<Expr>),
    /// Binary arithmetic
    Arith(ArithOp, Box<Expr>, Box<Expr>),
    /// Named function call
    Call(String, Vec<Expr>),
}

impl Expr {
    /// A term operand; a variable term becomes a variable read
    pub fn constant(term: Term) -> Self {
        Expr::from(term)
    }

    pub fn var(name: impl Into<String>) -> Self {
        Expr::Var(Variable::new(name.into()))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(expr: Expr) -> Self {
        Expr::Not(Box::new(expr))
    }

    pub fn and(left: Expr, right: Expr) -> Self {
        Expr::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Expr, right: Expr) -> Self {
        Expr::Or(Box::new(left), Box::new(right))
    }

    pub fn compare(op: CompareOp, left: Expr, right: Expr) -> Self {
        Expr::Compare(op, Box::new(left), Box::new(right))
    }

    pub fn eq(left: Expr, right: Expr) -> Self {
        Expr::compare(CompareOp::Eq, left, right)
    }

    pub fn ne(left: Expr, right: Expr) -> Self {
        Expr::compare(CompareOp::Ne, left, right)
    }

    pub fn lt(left: Expr, right: Expr) -> Self {
        Expr::compare(CompareOp::Lt, left, right)
    }

    pub fn gt(left: Expr, right: Expr) -> Self {
        Expr::compare(CompareOp::Gt, left, right)
    }

    pub fn arith(op: ArithOp, left: Expr, right: Expr) -> Self {
        Expr::Arith(op, Box::new(left), Box::new(right))
    }

    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Call(name.into(), args)
    }

    /// Every variable mentioned in this expression, in left-to-right order
    ///
    /// A variable mentioned twice appears twice.
    pub fn variables(&self) -> Vec<&Variable> {
        let mut out = Vec::new();
        self.collect_variables(&mut out);
        out
    }

    fn collect_variables<'a>(&'a self, out: &mut Vec<&'a Variable>) {
        match self {
            Expr::Constant(Term::Variable(v)) | Expr::Var(v) => out.push(v),
            Expr::Constant(_) => {}
            Expr::Not(e) => e.collect_variables(out),
            Expr::And(l, r) | Expr::Or(l, r) | Expr::Compare(_, l, r) | Expr::Arith(_, l, r) => {
                l.collect_variables(out);
                r.collect_variables(out);
            }
            Expr::Call(_, args) => {
                for arg in args {
                    arg.collect_variables(out);
                }
            }
        }
    }
}

impl From<Term> for Expr {
    fn from(term: Term) -> Self {
        match term {
            Term::Variable(v) => Expr::Var(v),
            other => Expr::Constant(other),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Constant(t) => write!(f, "{}", t),
            Expr::Var(v) => write!(f, "{}", v),
            Expr::Not(e) => write!(f, "!({})", e),
            Expr::And(l, r) => write!(f, "({} && {})", l, r),
            Expr::Or(l, r) => write!(f, "({} || {})", l, r),
            Expr::Compare(op, l, r) => write!(f, "({} {} {})", l, op.symbol(), r),
            Expr::Arith(op, l, r) => write!(f, "({} {} {})", l, op.symbol(), r),
            Expr::Call(name, args) => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Coerce a term to its effective boolean value
///
/// Booleans are themselves, numbers are true when non-zero, strings are true
/// when non-empty. Any other term is a type error.
pub fn effective_boolean_value(term: &Term) -> Result<bool, EvalError> {
    let lit = match term {
        Term::Literal(lit) => lit,
        other => return Err(EvalError::TypeError(format!("no boolean value for {}", other))),
    };

    if let Some(b) = lit.as_boolean() {
        return Ok(b);
    }
    if let Some(n) = lit.as_float() {
        return Ok(n != 0.0 && !n.is_nan());
    }
    if lit.is_string() || lit.language().is_some() {
        return Ok(!lit.value().is_empty());
    }
    Err(EvalError::TypeError(format!("no boolean value for {}", lit)))
}

// ============================================================================
// Numeric Values
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Numeric {
    Integer(i64),
    Decimal(f64),
}

impl Numeric {
    pub(crate) fn from_term(term: &Term) -> Option<Numeric> {
        let lit = term.as_literal()?;
        if let Some(i) = lit.as_integer() {
            Some(Numeric::Integer(i))
        } else {
            lit.as_float().map(Numeric::Decimal)
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Numeric::Integer(i) => i as f64,
            Numeric::Decimal(d) => d,
        }
    }

    pub(crate) fn into_term(self) -> Term {
        match self {
            Numeric::Integer(i) => Term::integer(i),
            Numeric::Decimal(d) => Term::decimal(d),
        }
    }
}

fn arithmetic(op: ArithOp, left: Numeric, right: Numeric) -> Result<Numeric, EvalError> {
    if let (Numeric::Integer(a), Numeric::Integer(b)) = (left, right) {
        let result = match op {
            ArithOp::Add => a.checked_add(b),
            ArithOp::Sub => a.checked_sub(b),
            ArithOp::Mul => a.checked_mul(b),
            ArithOp::Div => {
                if b == 0 {
                    return Err(EvalError::DivisionByZero);
                }
                return Ok(Numeric::Decimal(a as f64 / b as f64));
            }
        };
        return result.map(Numeric::Integer).ok_or(EvalError::Overflow);
    }

    let (a, b) = (left.as_f64(), right.as_f64());
    let result = match op {
        ArithOp::Add => a + b,
        ArithOp::Sub => a - b,
        ArithOp::Mul => a * b,
        ArithOp::Div => {
            if b == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            a / b
        }
    };
    Ok(Numeric::Decimal(result))
}

fn compare(op: CompareOp, left: &Term, right: &Term) -> Result<bool, EvalError> {
    if let (Some(a), Some(b)) = (Numeric::from_term(left), Numeric::from_term(right)) {
        return match a.as_f64().partial_cmp(&b.as_f64()) {
            Some(ordering) => Ok(op.holds(ordering)),
            // NaN compares unequal to everything
            None => Ok(op == CompareOp::Ne),
        };
    }

    if let (Some(a), Some(b)) = (left.as_literal(), right.as_literal()) {
        if a.is_string() && b.is_string() {
            return Ok(op.holds(a.value().cmp(b.value())));
        }
    }

    match op {
        CompareOp::Eq => Ok(left == right),
        CompareOp::Ne => Ok(left != right),
        _ => Err(EvalError::TypeError(format!("cannot order {} and {}", left, right))),
    }
}

// ============================================================================
// Standard Evaluator
// ============================================================================

/// The default expression evaluator
pub struct StandardEvaluator {
    functions: FunctionRegistry,
}

impl StandardEvaluator {
    /// Create an evaluator with the standard function library
    pub fn new() -> Self {
        StandardEvaluator {
            functions: FunctionRegistry::new(),
        }
    }

    /// Create an evaluator with a custom function registry
    pub fn with_functions(functions: FunctionRegistry) -> Self {
        StandardEvaluator { functions }
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    pub fn functions_mut(&mut self) -> &mut FunctionRegistry {
        &mut self.functions
    }
}

impl Default for StandardEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl ExprEvaluator for StandardEvaluator {
    fn eval(&self, expr: &Expr, binding: &Binding) -> Result<Term, EvalError> {
        match expr {
            Expr::Constant(Term::Variable(var)) | Expr::Var(var) => binding
                .get(var)
                .cloned()
                .ok_or_else(|| EvalError::UnboundVariable(var.clone())),
            Expr::Constant(term) => Ok(term.clone()),
            Expr::Not(inner) => {
                let value = self.eval_condition(inner, binding)?;
                Ok(Term::boolean(!value))
            }
            // An error on one side is absorbed when the other side decides the result
            Expr::And(l, r) => {
                match (self.eval_condition(l, binding), self.eval_condition(r, binding)) {
                    (Ok(false), _) | (_, Ok(false)) => Ok(Term::boolean(false)),
                    (Ok(true), Ok(true)) => Ok(Term::boolean(true)),
                    (Err(e), _) | (_, Err(e)) => Err(e),
                }
            }
            Expr::Or(l, r) => {
                match (self.eval_condition(l, binding), self.eval_condition(r, binding)) {
                    (Ok(true), _) | (_, Ok(true)) => Ok(Term::boolean(true)),
                    (Ok(false), Ok(false)) => Ok(Term::boolean(false)),
                    (Err(e), _) | (_, Err(e)) => Err(e),
                }
            }
            Expr::Compare(op, l, r) => {
                let left = self.eval(l, binding)?;
                let right = self.eval(r, binding)?;
                compare(*op, &left, &right).map(Term::boolean)
            }
            Expr::Arith(op, l, r) => {
                let left = self.eval(l, binding)?;
                let right = self.eval(r, binding)?;
                match (Numeric::from_term(&left), Numeric::from_term(&right)) {
                    (Some(a), Some(b)) => arithmetic(*op, a, b).map(Numeric::into_term),
                    _ => Err(EvalError::TypeError(format!(
                        "non-numeric operand to {}: {} {} {}",
                        op.symbol(),
                        left,
                        op.symbol(),
                        right
                    ))),
                }
            }
            Expr::Call(name, args) => {
                let values = args
                    .iter()
                    .map(|arg| self.eval(arg, binding))
                    .collect::<Result<Vec<_>, _>>()?;
                self.functions.call(name, &values)
            }
        }
    }
}
