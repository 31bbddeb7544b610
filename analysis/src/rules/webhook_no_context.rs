//! K8S061: flags `context.Background()`/`context.TODO()` construction in
//! webhook code, where the request context should be propagated.
//!
//! Deliberately blunt (every no-op context constructor in the unit) and
//! therefore disabled by default; enable it for admission-webhook packages.

use async_trait::async_trait;
use tree_sitter::Node;

use kubeaudit_core::{walk, CallTarget, Flow, ScopeFrame, SemanticUnit, UnitFile, Visitor};

use crate::finding::RuleFinding;
use crate::rules::helpers::callee_node;
use crate::rules::Rule;
use crate::watchlists::paths;

#[derive(Debug, Default)]
pub struct WebhookNoContextRule;

impl WebhookNoContextRule {
    pub fn new() -> Self {
        Self
    }
}

struct NoContextVisitor<'t, 'a> {
    file: &'t UnitFile,
    findings: &'a mut Vec<RuleFinding>,
}

impl<'t> Visitor<'t> for NoContextVisitor<'t, '_> {
    fn enter(&mut self, node: Node<'t>, _scope: &ScopeFrame) -> Flow {
        if node.kind() != "call_expression" {
            return Flow::Continue;
        }
        if let CallTarget::Resolved(sym) = self.file.resolver().resolve_call_target(node) {
            if sym.package == paths::CONTEXT && (sym.name == "Background" || sym.name == "TODO") {
                self.findings.push(RuleFinding::at(
                    &self.file.parsed,
                    &callee_node(node),
                    "webhook code using context.Background/TODO; propagate request context instead",
                ));
            }
        }
        Flow::Continue
    }
}

#[async_trait]
impl Rule for WebhookNoContextRule {
    fn id(&self) -> &'static str {
        "K8S061"
    }

    fn title(&self) -> &'static str {
        "Webhook uses Background/TODO"
    }

    fn suggestion(&self) -> &'static str {
        "Propagate request context"
    }

    async fn evaluate(&self, unit: &SemanticUnit) -> Vec<RuleFinding> {
        let mut findings = Vec::new();
        for file in &unit.files {
            let mut visitor = NoContextVisitor {
                file,
                findings: &mut findings,
            };
            walk(&file.parsed, &mut visitor);
        }
        findings
    }
}
