//! K8S001: flags Kubernetes client construction inside loops or hot paths.
//!
//! Clients are designed to be long-lived; constructing one per iteration or
//! per request re-reads config, rebuilds transports and defeats connection
//! reuse.

use async_trait::async_trait;

use kubeaudit_core::SemanticUnit;

use crate::finding::RuleFinding;
use crate::rules::templates::flag_constructions;
use crate::rules::Rule;
use crate::watchlists::{ResolutionTier, CLIENT_CONSTRUCTORS};

#[derive(Debug, Default)]
pub struct ClientReuseRule;

impl ClientReuseRule {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Rule for ClientReuseRule {
    fn id(&self) -> &'static str {
        "K8S001"
    }

    fn title(&self) -> &'static str {
        "Client constructed in loop or hot path"
    }

    fn suggestion(&self) -> &'static str {
        "Reuse a singleton client"
    }

    async fn evaluate(&self, unit: &SemanticUnit) -> Vec<RuleFinding> {
        flag_constructions(
            unit,
            &CLIENT_CONSTRUCTORS,
            ResolutionTier::PreciseOrName,
            "client constructed inside loop; reuse a singleton client",
            "client constructed in hot path; reuse a singleton client",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::helpers::testutil::unit;

    #[tokio::test]
    async fn flags_construction_inside_loop() {
        let rule = ClientReuseRule::new();
        let unit = unit(
            r#"
package main

import "k8s.io/client-go/kubernetes"

func run(cfg *rest.Config) {
    for i := 0; i < 3; i++ {
        kubernetes.NewForConfig(cfg)
    }
}
"#,
        );
        let findings = rule.evaluate(&unit).await;
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("inside loop"));
        assert_eq!(findings[0].line, 8);
    }

    #[tokio::test]
    async fn flags_construction_in_reconcile_hot_path() {
        let rule = ClientReuseRule::new();
        let unit = unit(
            r#"
package main

import (
    "k8s.io/client-go/kubernetes"
    "sigs.k8s.io/controller-runtime/pkg/reconcile"
)

func (r *PodReconciler) Reconcile(ctx context.Context, req reconcile.Request) (reconcile.Result, error) {
    clientset, err := kubernetes.NewForConfig(r.cfg)
    _ = clientset
    _ = err
    return reconcile.Result{}, nil
}
"#,
        );
        let findings = rule.evaluate(&unit).await;
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("hot path"));
    }

    #[tokio::test]
    async fn init_is_exempt() {
        let rule = ClientReuseRule::new();
        let unit = unit(
            r#"
package main

import "k8s.io/client-go/kubernetes"

func init() {
    kubernetes.NewForConfig(cfg)
}
"#,
        );
        assert!(rule.evaluate(&unit).await.is_empty());
    }

    #[tokio::test]
    async fn top_level_setup_is_clean() {
        let rule = ClientReuseRule::new();
        let unit = unit(
            r#"
package main

import "k8s.io/client-go/kubernetes"

func setup() {
    kubernetes.NewForConfig(cfg)
}
"#,
        );
        assert!(rule.evaluate(&unit).await.is_empty());
    }

    #[tokio::test]
    async fn same_name_from_unrelated_package_is_ignored() {
        let rule = ClientReuseRule::new();
        let unit = unit(
            r#"
package main

import "github.com/acme/fakeclients"

func worker() {
    for {
        fakeclients.NewForConfig(cfg)
    }
}
"#,
        );
        // Precise resolution disagrees with the watch list, so the name
        // fallback must not fire.
        assert!(rule.evaluate(&unit).await.is_empty());
    }

    #[tokio::test]
    async fn aliased_import_still_resolves() {
        let rule = ClientReuseRule::new();
        let unit = unit(
            r#"
package main

import cs "k8s.io/client-go/kubernetes"

func handleRequest() {
    cs.NewForConfigOrDie(cfg)
}
"#,
        );
        let findings = rule.evaluate(&unit).await;
        assert_eq!(findings.len(), 1);
    }
}
