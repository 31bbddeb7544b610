//! kubeaudit-analysis: rule evaluation engine for kubeaudit
//!
//! This crate holds the audit rule catalog (26 built-in rules for Kubernetes
//! client usage anti-patterns), the registry with allow/deny selection, and
//! the engine that runs selected rules over loaded semantic units.
//!
//! Rules are pure: they inspect a `SemanticUnit` through the resolver and the
//! traversal engine and return findings. They hold no state between runs, so
//! re-running the catalog on an unchanged unit yields the same finding set.

pub mod engine;
pub mod error;
pub mod finding;
pub mod hotpath;
pub mod rules;
pub mod watchlists;

pub use engine::{AuditReport, Engine, RuleFailure, RuleSelection};
pub use error::{EngineError, RuleError};
pub use finding::{Finding, RuleFinding};
pub use rules::registry::RuleRegistry;
pub use rules::Rule;
