pub mod helpers;
pub mod registry;
pub mod templates;

pub mod client_reuse;
pub mod config_churn;
pub mod discovery_flood;
pub mod dynamic_overuse;
pub mod ignoring_429;
pub mod large_pages;
pub mod leaky_watch;
pub mod list_in_loop;
pub mod manual_polling;
pub mod missing_context;
pub mod missing_informer;
pub mod no_resync;
pub mod no_retry_transient;
pub mod no_selectors;
pub mod qps_burst;
pub mod rbac_scope;
pub mod requeue_backoff;
pub mod rest_config_defaults;
pub mod restmapper_not_cached;
pub mod tight_error_loops;
pub mod unbounded_queue;
pub mod unstructured_everywhere;
pub mod webhook_no_context;
pub mod webhook_timeouts;
pub mod wide_namespace;

use std::fmt::Debug;

use async_trait::async_trait;

use kubeaudit_core::SemanticUnit;

use crate::finding::RuleFinding;

/// A single audit rule.
///
/// Rules are pure: they inspect one semantic unit through the resolver and
/// the traversal engine and return findings, in traversal order. They hold no
/// state between evaluations and never mutate engine state.
#[async_trait]
pub trait Rule: Send + Sync + Debug {
    /// Stable catalog-unique ID, e.g. "K8S001".
    fn id(&self) -> &'static str;
    fn title(&self) -> &'static str;
    fn suggestion(&self) -> &'static str;

    /// Evaluate the rule against one unit.
    async fn evaluate(&self, unit: &SemanticUnit) -> Vec<RuleFinding>;
}
