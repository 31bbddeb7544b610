//! K8S022: flags all-namespaces listing: `client.InNamespace("")` options and
//! typed chains like `cs.CoreV1().Pods("").List(...)`.

use async_trait::async_trait;
use tree_sitter::Node;

use kubeaudit_core::{walk, CallTarget, Flow, ScopeFrame, SemanticUnit, UnitFile, Visitor};

use crate::finding::RuleFinding;
use crate::rules::helpers::{
    call_args, callee_node, chain_has_empty_namespace_arg, chain_has_resource_name,
    is_empty_string,
};
use crate::rules::Rule;
use crate::watchlists::is_kubernetes_path;

#[derive(Debug, Default)]
pub struct WideNamespaceRule;

impl WideNamespaceRule {
    pub fn new() -> Self {
        Self
    }
}

struct WideNamespaceVisitor<'t, 'a> {
    file: &'t UnitFile,
    unit_uses_kubernetes: bool,
    findings: &'a mut Vec<RuleFinding>,
}

impl<'t> Visitor<'t> for WideNamespaceVisitor<'t, '_> {
    fn enter(&mut self, node: Node<'t>, _scope: &ScopeFrame) -> Flow {
        if node.kind() != "call_expression" {
            return Flow::Continue;
        }
        let parsed = &self.file.parsed;
        let target = self.file.resolver().resolve_call_target(node);

        match target.name() {
            Some("InNamespace") => {
                let accepted = match &target {
                    CallTarget::Resolved(sym) => is_kubernetes_path(&sym.package),
                    CallTarget::Method { .. } | CallTarget::Local(_) => self.unit_uses_kubernetes,
                    CallTarget::Unresolved => false,
                };
                let args = call_args(node);
                if accepted && args.len() == 1 && is_empty_string(parsed, args[0]) {
                    self.findings.push(RuleFinding::at(
                        parsed,
                        &callee_node(node),
                        "all-namespaces list; scope to a namespace if possible",
                    ));
                }
            }
            Some("List") | Some("Watch") => {
                // Typed client chain with an empty namespace argument and a
                // known resource selector, e.g. Pods("").List(ctx, opts).
                if let Some(receiver) = self.file.resolver().call_receiver(node) {
                    if chain_has_empty_namespace_arg(parsed, receiver)
                        && chain_has_resource_name(parsed, receiver)
                    {
                        self.findings.push(RuleFinding::at(
                            parsed,
                            &callee_node(node),
                            "all-namespaces list; scope to a namespace if possible",
                        ));
                    }
                }
            }
            _ => {}
        }
        Flow::Continue
    }
}

#[async_trait]
impl Rule for WideNamespaceRule {
    fn id(&self) -> &'static str {
        "K8S022"
    }

    fn title(&self) -> &'static str {
        "All-namespaces list"
    }

    fn suggestion(&self) -> &'static str {
        "Scope to a specific namespace"
    }

    async fn evaluate(&self, unit: &SemanticUnit) -> Vec<RuleFinding> {
        let unit_uses_kubernetes = unit.imports_any(is_kubernetes_path);
        let mut findings = Vec::new();
        for file in &unit.files {
            let mut visitor = WideNamespaceVisitor {
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
    async fn flags_in_namespace_empty_string() {
        let rule = WideNamespaceRule::new();
        let unit = unit(
            r#"
package main

import "sigs.k8s.io/controller-runtime/pkg/client"

func dump(c client.Client) {
    c.List(ctx, &pods, client.InNamespace(""))
}
"#,
        );
        let findings = rule.evaluate(&unit).await;
        assert_eq!(findings.len(), 1);
    }

    #[tokio::test]
    async fn scoped_in_namespace_is_clean() {
        let rule = WideNamespaceRule::new();
        let unit = unit(
            r#"
package main

import "sigs.k8s.io/controller-runtime/pkg/client"

func dump(c client.Client) {
    c.List(ctx, &pods, client.InNamespace("prod"))
}
"#,
        );
        assert!(rule.evaluate(&unit).await.is_empty());
    }

    #[tokio::test]
    async fn flags_typed_chain_with_empty_namespace() {
        let rule = WideNamespaceRule::new();
        let unit = unit(
            r#"
package main

import "k8s.io/client-go/kubernetes"

func dump(cs kubernetes.Interface) {
    cs.CoreV1().Pods("").List(ctx, opts)
}
"#,
        );
        let findings = rule.evaluate(&unit).await;
        assert_eq!(findings.len(), 1);
    }

    #[tokio::test]
    async fn typed_chain_with_namespace_is_clean() {
        let rule = WideNamespaceRule::new();
        let unit = unit(
            r#"
package main

import "k8s.io/client-go/kubernetes"

func dump(cs kubernetes.Interface) {
    cs.CoreV1().Pods("prod").List(ctx, opts)
}
"#,
        );
        assert!(rule.evaluate(&unit).await.is_empty());
    }

    #[tokio::test]
    async fn empty_string_without_resource_chain_is_clean() {
        let rule = WideNamespaceRule::new();
        let unit = unit(
            r#"
package main

func dump(s Store) {
    s.Bucket("").List()
}
"#,
        );
        assert!(rule.evaluate(&unit).await.is_empty());
    }
}
