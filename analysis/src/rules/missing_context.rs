//! K8S041: flags client API calls whose context argument is a fresh
//! `context.Background()`/`context.TODO()` instead of a propagated context.

use async_trait::async_trait;
use tree_sitter::Node;

use kubeaudit_core::{walk, CallTarget, Flow, ScopeFrame, SemanticUnit, UnitFile, Visitor};

use crate::finding::RuleFinding;
use crate::rules::helpers::{call_args, callee_node, chain_has_resource_name, is_noop_context_call};
use crate::rules::Rule;
use crate::watchlists::is_kubernetes_path;

const CLIENT_VERBS: &[&str] = &["Get", "List", "Create", "Update", "Patch", "Delete"];

#[derive(Debug, Default)]
pub struct MissingContextRule;

impl MissingContextRule {
    pub fn new() -> Self {
        Self
    }
}

struct ContextVisitor<'t, 'a> {
    file: &'t UnitFile,
    unit_uses_kubernetes: bool,
    findings: &'a mut Vec<RuleFinding>,
}

impl<'t> Visitor<'t> for ContextVisitor<'t, '_> {
    fn enter(&mut self, node: Node<'t>, _scope: &ScopeFrame) -> Flow {
        if node.kind() != "call_expression" {
            return Flow::Continue;
        }
        let parsed = &self.file.parsed;
        let target = self.file.resolver().resolve_call_target(node);
        let accepted = match &target {
            CallTarget::Resolved(sym) => {
                CLIENT_VERBS.contains(&sym.name.as_str()) && is_kubernetes_path(&sym.package)
            }
            CallTarget::Method { name } => {
                CLIENT_VERBS.contains(&name.as_str())
                    && (self
                        .file
                        .resolver()
                        .call_receiver(node)
                        .is_some_and(|r| chain_has_resource_name(parsed, r))
                        || self.unit_uses_kubernetes)
            }
            _ => false,
        };
        if !accepted {
            return Flow::Continue;
        }
        let args = call_args(node);
        let Some(first) = args.first() else {
            return Flow::Continue;
        };
        if is_noop_context_call(parsed, *first) {
            self.findings.push(RuleFinding::at(
                parsed,
                &callee_node(node),
                "client call uses context.Background/TODO; propagate a request context instead",
            ));
        }
        Flow::Continue
    }
}

#[async_trait]
impl Rule for MissingContextRule {
    fn id(&self) -> &'static str {
        "K8S041"
    }

    fn title(&self) -> &'static str {
        "Client call uses context.Background/TODO"
    }

    fn suggestion(&self) -> &'static str {
        "Propagate a request context"
    }

    async fn evaluate(&self, unit: &SemanticUnit) -> Vec<RuleFinding> {
        let unit_uses_kubernetes = unit.imports_any(is_kubernetes_path);
        let mut findings = Vec::new();
        for file in &unit.files {
            let mut visitor = ContextVisitor {
                file,
                unit_uses_kubernetes,
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
    async fn background_context_in_get_is_flagged() {
        let rule = MissingContextRule::new();
        let unit = unit(
            r#"
package main

import (
    "context"

    metav1 "k8s.io/apimachinery/pkg/apis/meta/v1"
)

func fetch(c PodInterface) {
    c.Get(context.Background(), name, metav1.GetOptions{})
}
"#,
        );
        assert_eq!(rule.evaluate(&unit).await.len(), 1);
    }

    #[tokio::test]
    async fn todo_context_in_typed_chain_is_flagged() {
        let rule = MissingContextRule::new();
        let unit = unit(
            r#"
package main

import "context"

func fetch(cs Clientset) {
    cs.CoreV1().Pods("prod").List(context.TODO(), opts)
}
"#,
        );
        assert_eq!(rule.evaluate(&unit).await.len(), 1);
    }

    #[tokio::test]
    async fn propagated_context_is_clean() {
        let rule = MissingContextRule::new();
        let unit = unit(
            r#"
package main

import metav1 "k8s.io/apimachinery/pkg/apis/meta/v1"

func fetch(ctx context.Context, c PodInterface) {
    c.Get(ctx, name, metav1.GetOptions{})
}
"#,
        );
        assert!(rule.evaluate(&unit).await.is_empty());
    }

    #[tokio::test]
    async fn non_kubernetes_call_is_ignored() {
        let rule = MissingContextRule::new();
        let unit = unit(
            r#"
package main

import "context"

func fetch(db Database) {
    db.Get(context.Background(), key)
}
"#,
        );
        assert!(rule.evaluate(&unit).await.is_empty());
    }
}
