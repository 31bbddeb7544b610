//! K8S051: flags dynamic client construction in units that also build a typed
//! clientset. Whole-unit scope: the typed constructor is the evidence that a
//! typed client was available.

use async_trait::async_trait;
use tree_sitter::Node;

use kubeaudit_core::{walk, Flow, ScopeFrame, SemanticUnit, UnitFile, Visitor};

use crate::finding::RuleFinding;
use crate::rules::helpers::callee_node;
use crate::rules::Rule;
use crate::watchlists::{ResolutionTier, DYNAMIC_CLIENT_CONSTRUCTORS, TYPED_CLIENT_CONSTRUCTORS};

#[derive(Debug, Default)]
pub struct DynamicOveruseRule;

impl DynamicOveruseRule {
    pub fn new() -> Self {
        Self
    }
}

struct DynamicScan<'t, 'a> {
    file: &'t UnitFile,
    has_typed: &'a mut bool,
    dynamic_calls: &'a mut Vec<RuleFinding>,
}

impl<'t> Visitor<'t> for DynamicScan<'t, '_> {
    fn enter(&mut self, node: Node<'t>, _scope: &ScopeFrame) -> Flow {
        if node.kind() != "call_expression" {
            return Flow::Continue;
        }
        let target = self.file.resolver().resolve_call_target(node);
        if TYPED_CLIENT_CONSTRUCTORS.matches(&target, ResolutionTier::Precise) {
            *self.has_typed = true;
        } else if DYNAMIC_CLIENT_CONSTRUCTORS.matches(&target, ResolutionTier::Precise) {
            self.dynamic_calls.push(RuleFinding::at(
                &self.file.parsed,
                &callee_node(node),
                "prefer typed client over dynamic/unstructured when available",
            ));
        }
        Flow::Continue
    }
}

#[async_trait]
impl Rule for DynamicOveruseRule {
    fn id(&self) -> &'static str {
        "K8S051"
    }

    fn title(&self) -> &'static str {
        "Overuse of dynamic/unstructured clients"
    }

    fn suggestion(&self) -> &'static str {
        "Prefer typed clients when available"
    }

    async fn evaluate(&self, unit: &SemanticUnit) -> Vec<RuleFinding> {
        let mut has_typed = false;
        let mut dynamic_calls = Vec::new();
        for file in &unit.files {
            let mut visitor = DynamicScan {
                file,
                has_typed: &mut has_typed,
                dynamic_calls: &mut dynamic_calls,
            };
            walk(&file.parsed, &mut visitor);
        }
        if has_typed {
            dynamic_calls
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::helpers::testutil::{unit, unit_of};

    #[tokio::test]
    async fn dynamic_alongside_typed_is_flagged() {
        let rule = DynamicOveruseRule::new();
        let unit = unit(
            r#"
package main

import (
    "k8s.io/client-go/dynamic"
    "k8s.io/client-go/kubernetes"
)

func setup(cfg *rest.Config) {
    kubernetes.NewForConfig(cfg)
    dynamic.NewForConfig(cfg)
}
"#,
        );
        let findings = rule.evaluate(&unit).await;
        assert_eq!(findings.len(), 1);
    }

    #[tokio::test]
    async fn dynamic_alone_is_clean() {
        let rule = DynamicOveruseRule::new();
        let unit = unit(
            r#"
package main

import "k8s.io/client-go/dynamic"

func setup(cfg *rest.Config) {
    dynamic.NewForConfig(cfg)
}
"#,
        );
        assert!(rule.evaluate(&unit).await.is_empty());
    }

    #[tokio::test]
    async fn typed_constructor_in_sibling_file_counts() {
        let rule = DynamicOveruseRule::new();
        let unit = unit_of(&[
            (
                "typed.go",
                r#"
package main

import "k8s.io/client-go/kubernetes"

func typed(cfg *rest.Config) {
    kubernetes.NewForConfig(cfg)
}
"#,
            ),
            (
                "dynamic.go",
                r#"
package main

import "k8s.io/client-go/dynamic"

func dyn(cfg *rest.Config) {
    dynamic.NewForConfig(cfg)
}
"#,
            ),
        ]);
        assert_eq!(rule.evaluate(&unit).await.len(), 1);
    }
}
