use std::sync::Arc;

use arc_swap::ArcSwap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use kubeaudit_core::SemanticUnit;

use crate::finding::Finding;
use crate::rules::registry::{RuleRegistry, DEFAULT_DISABLED};

/// Which rules to run.
///
/// A non-empty allow-list runs exactly those rules; otherwise the whole
/// catalog runs minus the deny-list. The default deny-list disables the rules
/// most prone to false positives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSelection {
    pub allow: Vec<String>,
    pub deny: Vec<String>,
}

impl Default for RuleSelection {
    fn default() -> Self {
        Self {
            allow: Vec::new(),
            deny: DEFAULT_DISABLED.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl RuleSelection {
    /// Run every rule in the catalog, including the default-disabled ones.
    pub fn all() -> Self {
        Self {
            allow: Vec::new(),
            deny: Vec::new(),
        }
    }

    pub fn allow_only(ids: impl IntoIterator<Item = String>) -> Self {
        Self {
            allow: ids.into_iter().collect(),
            deny: Vec::new(),
        }
    }
}

/// A rule that was skipped for one unit because it panicked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleFailure {
    pub rule_id: String,
    pub unit: String,
}

/// The aggregated result of one audit run.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    pub findings: Vec<Finding>,
    pub rule_failures: Vec<RuleFailure>,
}

/// The audit engine: holds the rule registry and runs selected rules over
/// loaded units.
///
/// Stateless between calls; each `audit` invocation is independent and
/// idempotent. The registry sits behind an `ArcSwap` so embedders can swap in
/// a custom catalog without locking.
pub struct Engine {
    registry: ArcSwap<RuleRegistry>,
}

impl Engine {
    pub fn new(registry: RuleRegistry) -> Self {
        Self {
            registry: ArcSwap::from_pointee(registry),
        }
    }

    pub fn with_builtin_rules() -> Self {
        Self::new(RuleRegistry::with_builtin_rules())
    }

    pub fn registry(&self) -> Arc<RuleRegistry> {
        self.registry.load_full()
    }

    pub fn swap_registry(&self, registry: RuleRegistry) {
        self.registry.store(Arc::new(registry));
    }

    /// Run the selected rules over every unit and collect findings.
    ///
    /// Findings within one rule-on-one-unit execution keep traversal order;
    /// ordering across rules or units is unspecified. A rule that panics is
    /// skipped for that unit and recorded in `rule_failures`; everything else
    /// proceeds.
    pub async fn audit(&self, units: &[Arc<SemanticUnit>], selection: &RuleSelection) -> AuditReport {
        let registry = self.registry.load_full();
        let rules = registry.select(&selection.allow, &selection.deny);

        let mut report = AuditReport::default();
        for unit in units {
            debug!(
                "auditing unit {} ({} files, {} rules)",
                unit.dir,
                unit.files.len(),
                rules.len()
            );
            for rule in &rules {
                let rule_id = rule.id();
                let title = rule.title();
                let suggestion = rule.suggestion();
                let task_rule = Arc::clone(rule);
                let task_unit = Arc::clone(unit);

                // Each rule runs as its own task so a panicking rule only
                // loses its own results for this unit.
                let handle =
                    tokio::spawn(async move { task_rule.evaluate(task_unit.as_ref()).await });
                match handle.await {
                    Ok(rule_findings) => {
                        report.findings.extend(
                            rule_findings
                                .into_iter()
                                .map(|rf| Finding::from_rule(rule_id, title, suggestion, rf)),
                        );
                    }
                    Err(join_err) if join_err.is_panic() => {
                        warn!("rule {rule_id} panicked on {}; skipping", unit.dir);
                        report.rule_failures.push(RuleFailure {
                            rule_id: rule_id.to_string(),
                            unit: unit.dir.clone(),
                        });
                    }
                    Err(join_err) => {
                        warn!("rule {rule_id} cancelled on {}: {join_err}", unit.dir);
                        report.rule_failures.push(RuleFailure {
                            rule_id: rule_id.to_string(),
                            unit: unit.dir.clone(),
                        });
                    }
                }
            }
        }
        report
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::with_builtin_rules()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use kubeaudit_core::{unit_from_sources, SourceFile};

    use crate::finding::RuleFinding;
    use crate::rules::Rule;

    fn arc_unit(code: &str) -> Arc<SemanticUnit> {
        Arc::new(unit_from_sources(&[SourceFile::new("test.go", code)]).unwrap())
    }

    const LOOPED_CLIENT: &str = r#"
package main

import "k8s.io/client-go/kubernetes"

func run(cfg *rest.Config) {
    for i := 0; i < 3; i++ {
        kubernetes.NewForConfig(cfg)
    }
}
"#;

    #[tokio::test]
    async fn audit_produces_findings_with_rule_metadata() {
        let engine = Engine::with_builtin_rules();
        let units = vec![arc_unit(LOOPED_CLIENT)];
        let report = engine.audit(&units, &RuleSelection::default()).await;
        let client_findings: Vec<_> = report
            .findings
            .iter()
            .filter(|f| f.rule_id == "K8S001")
            .collect();
        assert_eq!(client_findings.len(), 1);
        assert_eq!(client_findings[0].title, "Client constructed in loop or hot path");
        assert_eq!(client_findings[0].suggestion, "Reuse a singleton client");
    }

    #[tokio::test]
    async fn default_selection_skips_denied_rules() {
        let engine = Engine::with_builtin_rules();
        let units = vec![arc_unit(
            r#"
package main

import "context"

func admit() {
    work(context.Background())
}
"#,
        )];
        let report = engine.audit(&units, &RuleSelection::default()).await;
        assert!(
            report.findings.iter().all(|f| f.rule_id != "K8S061"),
            "default-denied rule must not run"
        );

        let report_all = engine.audit(&units, &RuleSelection::all()).await;
        assert!(report_all.findings.iter().any(|f| f.rule_id == "K8S061"));
    }

    #[tokio::test]
    async fn allow_list_runs_only_those_rules() {
        let engine = Engine::with_builtin_rules();
        let units = vec![arc_unit(LOOPED_CLIENT)];
        let selection = RuleSelection::allow_only(["K8S002".to_string()]);
        let report = engine.audit(&units, &selection).await;
        assert!(report.findings.iter().all(|f| f.rule_id == "K8S002"));
    }

    #[tokio::test]
    async fn audit_is_idempotent() {
        let engine = Engine::with_builtin_rules();
        let units = vec![arc_unit(LOOPED_CLIENT)];
        let mut first = engine
            .audit(&units, &RuleSelection::default())
            .await
            .findings;
        let mut second = engine
            .audit(&units, &RuleSelection::default())
            .await
            .findings;
        let key = |f: &Finding| (f.rule_id.clone(), f.file.clone(), f.line, f.column, f.message.clone());
        first.sort_by_key(key);
        second.sort_by_key(key);
        assert_eq!(first, second);
    }

    #[derive(Debug)]
    struct PanickingRule;

    #[async_trait]
    impl Rule for PanickingRule {
        fn id(&self) -> &'static str {
            "K8S998"
        }
        fn title(&self) -> &'static str {
            "Panics"
        }
        fn suggestion(&self) -> &'static str {
            "n/a"
        }
        async fn evaluate(&self, _unit: &SemanticUnit) -> Vec<RuleFinding> {
            panic!("rule blew up");
        }
    }

    #[tokio::test]
    async fn panicking_rule_is_isolated() {
        let mut registry = RuleRegistry::with_builtin_rules();
        registry.register(Arc::new(PanickingRule));
        let engine = Engine::new(registry);

        let units = vec![arc_unit(LOOPED_CLIENT)];
        let report = engine.audit(&units, &RuleSelection::all()).await;

        // The faulty rule is recorded and everything else still reports.
        assert_eq!(report.rule_failures.len(), 1);
        assert_eq!(report.rule_failures[0].rule_id, "K8S998");
        assert!(report.findings.iter().any(|f| f.rule_id == "K8S001"));
    }
}
