//! K8S014: flags reconcile results that requeue immediately without a
//! RequeueAfter delay.

use async_trait::async_trait;
use tree_sitter::Node;

use kubeaudit_core::{walk, Flow, ScopeFrame, SemanticUnit, TypeTarget, UnitFile, Visitor};

use crate::finding::RuleFinding;
use crate::rules::helpers::keyed_fields;
use crate::rules::Rule;
use crate::watchlists::paths;

#[derive(Debug, Default)]
pub struct RequeueBackoffRule;

impl RequeueBackoffRule {
    pub fn new() -> Self {
        Self
    }
}

struct RequeueVisitor<'t, 'a> {
    file: &'t UnitFile,
    findings: &'a mut Vec<RuleFinding>,
}

impl<'t, 'a> RequeueVisitor<'t, 'a> {
    fn is_reconcile_result(&self, lit: Node<'t>) -> bool {
        match self.file.resolver().resolve_literal_type(lit) {
            TypeTarget::Resolved(t) => {
                t.name == "Result"
                    && (t.package == paths::CR_RECONCILE || t.package == paths::CONTROLLER_RUNTIME)
            }
            TypeTarget::Named { qualifier, name } => {
                name == "Result"
                    && matches!(qualifier.as_deref(), Some("reconcile") | Some("ctrl"))
            }
            TypeTarget::Unknown => false,
        }
    }
}

impl<'t> Visitor<'t> for RequeueVisitor<'t, '_> {
    fn enter(&mut self, node: Node<'t>, _scope: &ScopeFrame) -> Flow {
        if node.kind() != "return_statement" {
            return Flow::Continue;
        }
        for i in 0..node.child_count() {
            let Some(child) = node.child(i) else { continue };
            if child.kind() != "expression_list" {
                continue;
            }
            for j in 0..child.child_count() {
                let Some(expr) = child.child(j) else { continue };
                if expr.kind() != "composite_literal" || !self.is_reconcile_result(expr) {
                    continue;
                }
                let mut has_requeue = false;
                let mut has_requeue_after = false;
                for (key, _) in keyed_fields(&self.file.parsed, expr) {
                    match key.as_str() {
                        "Requeue" => has_requeue = true,
                        "RequeueAfter" => has_requeue_after = true,
                        _ => {}
                    }
                }
                if has_requeue && !has_requeue_after {
                    self.findings.push(RuleFinding::at(
                        &self.file.parsed,
                        &node,
                        "controller-runtime Requeue without backoff; prefer RequeueAfter with delay or rate-limited queue",
                    ));
                }
            }
        }
        Flow::Continue
    }
}

#[async_trait]
impl Rule for RequeueBackoffRule {
    fn id(&self) -> &'static str {
        "K8S014"
    }

    fn title(&self) -> &'static str {
        "Requeue without backoff"
    }

    fn suggestion(&self) -> &'static str {
        "Use RequeueAfter or rate-limited queues"
    }

    async fn evaluate(&self, unit: &SemanticUnit) -> Vec<RuleFinding> {
        let mut findings = Vec::new();
        for file in &unit.files {
            let mut visitor = RequeueVisitor {
                file,
                findings: &mut findings,
            };
            walk(&file.parsed, &mut visitor);
        }
        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::helpers::testutil::unit;

    #[tokio::test]
    async fn requeue_without_after_is_flagged() {
        let rule = RequeueBackoffRule::new();
        let unit = unit(
            r#"
package main

import "sigs.k8s.io/controller-runtime/pkg/reconcile"

func (r *R) Reconcile(ctx context.Context, req reconcile.Request) (reconcile.Result, error) {
    return reconcile.Result{Requeue: true}, nil
}
"#,
        );
        assert_eq!(rule.evaluate(&unit).await.len(), 1);
    }

    #[tokio::test]
    async fn requeue_after_is_clean() {
        let rule = RequeueBackoffRule::new();
        let unit = unit(
            r#"
package main

import "sigs.k8s.io/controller-runtime/pkg/reconcile"

func (r *R) Reconcile(ctx context.Context, req reconcile.Request) (reconcile.Result, error) {
    return reconcile.Result{Requeue: true, RequeueAfter: 30 * time.Second}, nil
}
"#,
        );
        assert!(rule.evaluate(&unit).await.is_empty());
    }

    #[tokio::test]
    async fn empty_result_is_clean() {
        let rule = RequeueBackoffRule::new();
        let unit = unit(
            r#"
package main

import "sigs.k8s.io/controller-runtime/pkg/reconcile"

func (r *R) Reconcile(ctx context.Context, req reconcile.Request) (reconcile.Result, error) {
    return reconcile.Result{}, nil
}
"#,
        );
        assert!(rule.evaluate(&unit).await.is_empty());
    }

    #[tokio::test]
    async fn ctrl_alias_result_is_recognized() {
        let rule = RequeueBackoffRule::new();
        let unit = unit(
            r#"
package main

import ctrl "sigs.k8s.io/controller-runtime"

func (r *R) Reconcile(ctx context.Context, req ctrl.Request) (ctrl.Result, error) {
    return ctrl.Result{Requeue: true}, nil
}
"#,
        );
        assert_eq!(rule.evaluate(&unit).await.len(), 1);
    }

    #[tokio::test]
    async fn unrelated_result_literal_is_ignored() {
        let rule = RequeueBackoffRule::new();
        let unit = unit(
            r#"
package main

func f() Result {
    return Result{Requeue: true}
}
"#,
        );
        assert!(rule.evaluate(&unit).await.is_empty());
    }
}
