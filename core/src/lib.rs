//! kubeaudit-core: unit loading, parsing and resolution for kubeaudit
//!
//! This crate is the input boundary of the audit engine. It discovers Go
//! source trees, parses them with tree-sitter, groups files into semantic
//! units (one per package directory), and provides:
//!
//! - an import-table based symbol/type resolver with an explicit
//!   precise-vs-name-only distinction,
//! - a generic depth-first traversal engine that tracks the enclosing
//!   function and loop nesting depth for its visitors.
//!
//! No rule logic lives here; the rule catalog is in `kubeaudit-analysis`.

pub mod error;
pub mod loader;
pub mod parse;
pub mod resolve;
pub mod types;
pub mod unit;
pub mod walk;

pub use error::{LoadError, ParseError};
pub use loader::{load_units, unit_from_sources, LoadDiagnostic, LoadOutcome};
pub use parse::ast::{AstLocation, FileId, ParsedFile, TextRange};
pub use resolve::{CallTarget, QualifiedSymbol, QualifiedType, Resolver, TypeTarget};
pub use types::SourceFile;
pub use unit::{ImportTable, SemanticUnit, UnitFile};
pub use walk::{walk, Flow, FunctionRef, ScopeFrame, Visitor};
