use std::collections::HashSet;
use std::sync::Arc;

use crate::rules::client_reuse::ClientReuseRule;
use crate::rules::config_churn::ConfigChurnRule;
use crate::rules::discovery_flood::DiscoveryFloodRule;
use crate::rules::dynamic_overuse::DynamicOveruseRule;
use crate::rules::ignoring_429::Ignoring429Rule;
use crate::rules::large_pages::LargePagesRule;
use crate::rules::leaky_watch::LeakyWatchRule;
use crate::rules::list_in_loop::ListInLoopRule;
use crate::rules::manual_polling::ManualPollingRule;
use crate::rules::missing_context::MissingContextRule;
use crate::rules::missing_informer::MissingInformerRule;
use crate::rules::no_resync::NoResyncRule;
use crate::rules::no_retry_transient::NoRetryTransientRule;
use crate::rules::no_selectors::NoSelectorsRule;
use crate::rules::qps_burst::QpsBurstRule;
use crate::rules::rbac_scope::{ExcessiveClusterScopeRule, WildcardVerbsRule};
use crate::rules::requeue_backoff::RequeueBackoffRule;
use crate::rules::rest_config_defaults::RestConfigDefaultsRule;
use crate::rules::restmapper_not_cached::RestMapperNotCachedRule;
use crate::rules::tight_error_loops::TightErrorLoopsRule;
use crate::rules::unbounded_queue::UnboundedQueueRule;
use crate::rules::unstructured_everywhere::UnstructuredEverywhereRule;
use crate::rules::webhook_no_context::WebhookNoContextRule;
use crate::rules::webhook_timeouts::WebhookTimeoutsRule;
use crate::rules::wide_namespace::WideNamespaceRule;
use crate::rules::Rule;

/// Rules disabled unless explicitly selected: the two most prone to false
/// positives (loose identifier heuristics, unconditional context-constructor
/// flagging).
pub const DEFAULT_DISABLED: &[&str] = &["K8S031", "K8S061"];

#[derive(Debug, Default, Clone)]
pub struct RuleRegistry {
    rules: Vec<Arc<dyn Rule>>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn register(&mut self, rule: Arc<dyn Rule>) {
        debug_assert!(
            !self.contains(rule.id()),
            "duplicate rule id {}",
            rule.id()
        );
        self.rules.push(rule);
    }

    pub fn all(&self) -> &[Arc<dyn Rule>] {
        &self.rules
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn Rule>> {
        self.rules.iter().find(|r| r.id() == id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.rules.iter().any(|r| r.id() == id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Select rules to run: a non-empty allow-list wins; otherwise the full
    /// catalog minus the deny-list.
    pub fn select(&self, allow: &[String], deny: &[String]) -> Vec<Arc<dyn Rule>> {
        if !allow.is_empty() {
            let wanted: HashSet<&str> = allow.iter().map(String::as_str).collect();
            return self
                .rules
                .iter()
                .filter(|r| wanted.contains(r.id()))
                .cloned()
                .collect();
        }
        let denied: HashSet<&str> = deny.iter().map(String::as_str).collect();
        self.rules
            .iter()
            .filter(|r| !denied.contains(r.id()))
            .cloned()
            .collect()
    }

    /// The full built-in catalog.
    pub fn with_builtin_rules() -> Self {
        let mut registry = RuleRegistry::new();

        // Client construction and reuse
        registry.register(Arc::new(ClientReuseRule::new()));
        registry.register(Arc::new(QpsBurstRule::new()));
        registry.register(Arc::new(ConfigChurnRule::new()));

        // Informers, caches and controllers
        registry.register(Arc::new(MissingInformerRule::new()));
        registry.register(Arc::new(ListInLoopRule::new()));
        registry.register(Arc::new(ManualPollingRule::new()));
        registry.register(Arc::new(UnboundedQueueRule::new()));
        registry.register(Arc::new(RequeueBackoffRule::new()));

        // List/Watch usage
        registry.register(Arc::new(NoSelectorsRule::new()));
        registry.register(Arc::new(WideNamespaceRule::new()));
        registry.register(Arc::new(LargePagesRule::new()));

        // Error handling and rate limiting
        registry.register(Arc::new(Ignoring429Rule::new()));
        registry.register(Arc::new(NoRetryTransientRule::new()));
        registry.register(Arc::new(TightErrorLoopsRule::new()));

        // Watch handling
        registry.register(Arc::new(NoResyncRule::new()));
        registry.register(Arc::new(MissingContextRule::new()));
        registry.register(Arc::new(LeakyWatchRule::new()));

        // client-go specifics
        registry.register(Arc::new(RestConfigDefaultsRule::new()));
        registry.register(Arc::new(DynamicOveruseRule::new()));
        registry.register(Arc::new(UnstructuredEverywhereRule::new()));

        // Admission webhooks
        registry.register(Arc::new(WebhookTimeoutsRule::new()));
        registry.register(Arc::new(WebhookNoContextRule::new()));

        // Discovery and RESTMapper
        registry.register(Arc::new(DiscoveryFloodRule::new()));
        registry.register(Arc::new(RestMapperNotCachedRule::new()));

        // RBAC
        registry.register(Arc::new(ExcessiveClusterScopeRule::new()));
        registry.register(Arc::new(WildcardVerbsRule::new()));

        registry
    }
}
