//! K8S012: flags manual polling loops that pair a Kubernetes List call with a
//! sleep instead of using a watch or an informer.

use async_trait::async_trait;
use tree_sitter::Node;

use kubeaudit_core::{walk, CallTarget, Flow, ScopeFrame, SemanticUnit, UnitFile, Visitor};

use crate::finding::RuleFinding;
use crate::rules::Rule;
use crate::watchlists::is_kubernetes_path;

#[derive(Debug, Default)]
pub struct ManualPollingRule;

impl ManualPollingRule {
    pub fn new() -> Self {
        Self
    }
}

struct PollingVisitor<'t, 'a> {
    file: &'t UnitFile,
    unit_uses_kubernetes: bool,
    /// State for the outermost loop currently being traversed.
    saw_list: bool,
    saw_sleep: bool,
    findings: &'a mut Vec<RuleFinding>,
}

impl<'t> Visitor<'t> for PollingVisitor<'t, '_> {
    fn enter(&mut self, node: Node<'t>, scope: &ScopeFrame) -> Flow {
        match node.kind() {
            // Depth is already incremented when we see the loop node.
            "for_statement" if scope.loop_depth == 1 => {
                self.saw_list = false;
                self.saw_sleep = false;
            }
            "call_expression" if scope.loop_depth > 0 => {
                let target = self.file.resolver().resolve_call_target(node);
                match &target {
                    CallTarget::Resolved(sym) => {
                        if sym.package == "time" && sym.name == "Sleep" {
                            self.saw_sleep = true;
                        } else if sym.name == "List" && is_kubernetes_path(&sym.package) {
                            self.saw_list = true;
                        }
                    }
                    CallTarget::Method { name } => {
                        if name == "List" && self.unit_uses_kubernetes {
                            self.saw_list = true;
                        }
                    }
                    _ => {}
                }
            }
            _ => {}
        }
        Flow::Continue
    }

    fn leave(&mut self, node: Node<'t>, scope: &ScopeFrame) {
        if node.kind() == "for_statement" && scope.loop_depth == 1 && self.saw_list && self.saw_sleep
        {
            self.findings.push(RuleFinding::at(
                &self.file.parsed,
                &node,
                "manual polling with Kubernetes List and sleep/ticker; prefer Watch or shared informers",
            ));
            self.saw_list = false;
            self.saw_sleep = false;
        }
    }
}

#[async_trait]
impl Rule for ManualPollingRule {
    fn id(&self) -> &'static str {
        "K8S012"
    }

    fn title(&self) -> &'static str {
        "Manual polling with List + sleep"
    }

    fn suggestion(&self) -> &'static str {
        "Use Watch or informers instead of polling"
    }

    async fn evaluate(&self, unit: &SemanticUnit) -> Vec<RuleFinding> {
        let unit_uses_kubernetes = unit.imports_any(is_kubernetes_path);
        let mut findings = Vec::new();
        for file in &unit.files {
            let mut visitor = PollingVisitor {
                file,
                unit_uses_kubernetes,
                saw_list: false,
                saw_sleep: false,
                findings: &mut findings,
            };
            walk(&file.parsed, &mut visitor);
        }
        findings
    }
}
