//! K8S042: flags watch channels that are consumed but never stopped.
//!
//! Mitigation scope is deliberately the enclosing function (not the unit): a
//! `ResultChan()` call counts as leaky only when the same function never
//! calls `Stop`/`Cancel`.

use async_trait::async_trait;
use tree_sitter::Node;

use kubeaudit_core::{walk, Flow, ScopeFrame, SemanticUnit, UnitFile, Visitor};

use crate::finding::RuleFinding;
use crate::rules::helpers::callee_node;
use crate::rules::Rule;
use crate::watchlists::{is_kubernetes_path, STOP_NAMES};

#[derive(Debug, Default)]
pub struct LeakyWatchRule;

impl LeakyWatchRule {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Default)]
struct FunctionState {
    result_chans: Vec<RuleFinding>,
    has_stop: bool,
}

struct LeakVisitor<'t, 'a> {
    file: &'t UnitFile,
    unit_uses_kubernetes: bool,
    stack: Vec<FunctionState>,
    findings: &'a mut Vec<RuleFinding>,
}

impl<'t> Visitor<'t> for LeakVisitor<'t, '_> {
    fn enter(&mut self, node: Node<'t>, _scope: &ScopeFrame) -> Flow {
        match node.kind() {
            "function_declaration" | "method_declaration" => {
                self.stack.push(FunctionState::default());
            }
            "call_expression" => {
                let Some(state) = self.stack.last_mut() else {
                    return Flow::Continue;
                };
                let target = self.file.resolver().resolve_call_target(node);
                match target.name() {
                    Some("ResultChan") if self.unit_uses_kubernetes => {
                        state.result_chans.push(RuleFinding::at(
                            &self.file.parsed,
                            &callee_node(node),
                            "Kubernetes watch channel may not be stopped; ensure Stop()/Cancel() is called",
                        ));
                    }
                    Some(name) if STOP_NAMES.contains(&name) => {
                        state.has_stop = true;
                    }
                    _ => {}
                }
            }
            _ => {}
        }
        Flow::Continue
    }

    fn leave(&mut self, node: Node<'t>, _scope: &ScopeFrame) {
        if matches!(node.kind(), "function_declaration" | "method_declaration") {
            if let Some(state) = self.stack.pop() {
                if !state.has_stop {
                    self.findings.extend(state.result_chans);
                }
            }
        }
    }
}

#[async_trait]
impl Rule for LeakyWatchRule {
    fn id(&self) -> &'static str {
        "K8S042"
    }

    fn title(&self) -> &'static str {
        "Leaky watch channels"
    }

    fn suggestion(&self) -> &'static str {
        "Ensure Stop()/Cancel() is called and channels drained"
    }

    async fn evaluate(&self, unit: &SemanticUnit) -> Vec<RuleFinding> {
        let unit_uses_kubernetes = unit.imports_any(is_kubernetes_path);
        let mut findings = Vec::new();
        for file in &unit.files {
            let mut visitor = LeakVisitor {
                file,
                unit_uses_kubernetes,
                stack: Vec::new(),
                findings: &mut findings,
            };
            walk(&file.parsed, &mut visitor);
        }
        findings
    }
}
