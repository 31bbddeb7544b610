//! K8S011: flags List/Watch calls inside loops.
//!
//! Listing or watching per iteration hammers the API server; an informer or
//! a cache answers the same question locally.

use async_trait::async_trait;
use tree_sitter::Node;

use kubeaudit_core::{walk, CallTarget, Flow, ScopeFrame, SemanticUnit, UnitFile, Visitor};

use crate::finding::RuleFinding;
use crate::rules::helpers::callee_node;
use crate::rules::Rule;
use crate::watchlists::is_kubernetes_path;

#[derive(Debug, Default)]
pub struct ListInLoopRule;

impl ListInLoopRule {
    pub fn new() -> Self {
        Self
    }
}

struct ListInLoopVisitor<'t, 'a> {
    file: &'t UnitFile,
    unit_uses_kubernetes: bool,
    findings: &'a mut Vec<RuleFinding>,
}

impl<'t> Visitor<'t> for ListInLoopVisitor<'t, '_> {
    fn enter(&mut self, node: Node<'t>, scope: &ScopeFrame) -> Flow {
        if node.kind() != "call_expression" || scope.loop_depth == 0 {
            return Flow::Continue;
        }
        let target = self.file.resolver().resolve_call_target(node);
        let flagged = match &target {
            CallTarget::Resolved(sym) => {
                (sym.name == "List" || sym.name == "Watch") && is_kubernetes_path(&sym.package)
            }
            // Name tier: method calls on client values, accepted only when
            // the unit demonstrably uses the Kubernetes client stack.
            CallTarget::Method { name } => {
                (name == "List" || name == "Watch") && self.unit_uses_kubernetes
            }
            _ => false,
        };
        if flagged {
            self.findings.push(RuleFinding::at(
                &self.file.parsed,
                &callee_node(node),
                "List/Watch call inside loop; prefer informers/cache or move calls outside loops",
            ));
        }
        Flow::Continue
    }
}

#[async_trait]
impl Rule for ListInLoopRule {
    fn id(&self) -> &'static str {
        "K8S011"
    }

    fn title(&self) -> &'static str {
        "List/Watch call inside loop"
    }

    fn suggestion(&self) -> &'static str {
        "Prefer informers/cache or move calls outside loops"
    }

    async fn evaluate(&self, unit: &SemanticUnit) -> Vec<RuleFinding> {
        let unit_uses_kubernetes = unit.imports_any(is_kubernetes_path);
        let mut findings = Vec::new();
        for file in &unit.files {
            let mut visitor = ListInLoopVisitor {
                file,
                unit_uses_kubernetes,
                findings: &mut findings,
            };
            walk(&file.parsed, &mut visitor);
        }
        findings
    }
}
