//! Core abstractions and common definitions
//!
//! This module provides:
//! - `traits`: Collaborator trait abstractions (Graph, ExprEvaluator, EvaluationHook)
//! - `namespaces`: Standard RDF namespace URI constants

pub mod traits;
pub mod namespaces;

pub use traits::*;
pub use namespaces::ns;
