//! K8S070: flags discovery client or RESTMapper setup inside loops.
//!
//! Discovery enumerates every API group/version; rebuilding it per iteration
//! floods the API server.

use async_trait::async_trait;
use tree_sitter::Node;

use kubeaudit_core::{walk, Flow, ScopeFrame, SemanticUnit, UnitFile, Visitor};

use crate::finding::RuleFinding;
use crate::rules::Rule;
use crate::watchlists::{ResolutionTier, DISCOVERY_SETUP};

#[derive(Debug, Default)]
pub struct DiscoveryFloodRule;

impl DiscoveryFloodRule {
    pub fn new() -> Self {
        Self
    }
}

struct FloodVisitor<'t, 'a> {
    file: &'t UnitFile,
    /// One entry per enclosing loop: did it contain a discovery setup call?
    loop_stack: Vec<bool>,
    findings: &'a mut Vec<RuleFinding>,
}

impl<'t> Visitor<'t> for FloodVisitor<'t, '_> {
    fn enter(&mut self, node: Node<'t>, _scope: &ScopeFrame) -> Flow {
        match node.kind() {
            "for_statement" => self.loop_stack.push(false),
            "call_expression" => {
                if !self.loop_stack.is_empty() {
                    let target = self.file.resolver().resolve_call_target(node);
                    if DISCOVERY_SETUP.matches(&target, ResolutionTier::Precise) {
                        if let Some(top) = self.loop_stack.last_mut() {
                            *top = true;
                        }
                    }
                }
            }
            _ => {}
        }
        Flow::Continue
    }

    fn leave(&mut self, node: Node<'t>, _scope: &ScopeFrame) {
        if node.kind() == "for_statement" {
            if self.loop_stack.pop() == Some(true) {
                self.findings.push(RuleFinding::at(
                    &self.file.parsed,
                    &node,
                    "repeated discovery/RESTMapper setup inside loop; cache and reuse to avoid API server flood",
                ));
            }
        }
    }
}

#[async_trait]
impl Rule for DiscoveryFloodRule {
    fn id(&self) -> &'static str {
        "K8S070"
    }

    fn title(&self) -> &'static str {
        "Discovery/RESTMapper flood"
    }

    fn suggestion(&self) -> &'static str {
        "Cache and reuse discovery/RESTMapper"
    }

    async fn evaluate(&self, unit: &SemanticUnit) -> Vec<RuleFinding> {
        let mut findings = Vec::new();
        for file in &unit.files {
            let mut visitor = FloodVisitor {
                file,
                loop_stack: Vec::new(),
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
    async fn flags_discovery_client_in_loop() {
        let rule = DiscoveryFloodRule::new();
        let unit = unit(
            r#"
package main

import "k8s.io/client-go/discovery"

func resolveAll(cfg *rest.Config, gvks []string) {
    for range gvks {
        discovery.NewDiscoveryClientForConfig(cfg)
    }
}
"#,
        );
        let findings = rule.evaluate(&unit).await;
        assert_eq!(findings.len(), 1);
    }

    #[tokio::test]
    async fn flags_deferred_mapper_in_loop() {
        let rule = DiscoveryFloodRule::new();
        let unit = unit(
            r#"
package main

import "k8s.io/client-go/restmapper"

func mapAll(dc DiscoveryInterface, items []Item) {
    for _, it := range items {
        m := restmapper.NewDeferredDiscoveryRESTMapper(dc)
        _ = m
        _ = it
    }
}
"#,
        );
        let findings = rule.evaluate(&unit).await;
        assert_eq!(findings.len(), 1);
    }

    #[tokio::test]
    async fn setup_outside_loop_is_clean() {
        let rule = DiscoveryFloodRule::new();
        let unit = unit(
            r#"
package main

import "k8s.io/client-go/discovery"

func setup(cfg *rest.Config) {
    discovery.NewDiscoveryClientForConfig(cfg)
}
"#,
        );
        assert!(rule.evaluate(&unit).await.is_empty());
    }

    #[tokio::test]
    async fn unresolved_same_name_is_ignored() {
        let rule = DiscoveryFloodRule::new();
        let unit = unit(
            r#"
package main

func resolveAll(items []Item) {
    for _, it := range items {
        NewDeferredDiscoveryRESTMapper(it)
    }
}
"#,
        );
        // Precise-tier rule: a bare name never matches.
        assert!(rule.evaluate(&unit).await.is_empty());
    }
}
