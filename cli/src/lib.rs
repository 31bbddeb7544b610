//! # kubeaudit CLI
//!
//! Audits Go source trees for Kubernetes client usage anti-patterns:
//! client-construction churn, API-server overload, missing backoff, unscoped
//! queries, leaked watch channels and unsafe defaults.
//!
//! ## Usage
//!
//! ```bash
//! # Scan one or more source trees
//! kubeaudit scan ./sources
//!
//! # List the rule catalog
//! kubeaudit rules
//!
//! # Mirror a GitHub organization for scanning
//! kubeaudit clone-org --org konflux-ci --dest sources
//! ```

pub mod commands;
pub mod exit_codes;
pub mod github;
pub mod gitops;
pub mod output;
