//! K8S040: flags informer construction with a literal zero resync period.

use async_trait::async_trait;
use tree_sitter::Node;

use kubeaudit_core::{walk, Flow, ScopeFrame, SemanticUnit, UnitFile, Visitor};

use crate::finding::RuleFinding;
use crate::rules::helpers::{call_args, is_zero_literal};
use crate::rules::Rule;
use crate::watchlists::{ResolutionTier, RESYNC_INFORMER_CONSTRUCTORS};

#[derive(Debug, Default)]
pub struct NoResyncRule;

impl NoResyncRule {
    pub fn new() -> Self {
        Self
    }
}

struct ResyncVisitor<'t, 'a> {
    file: &'t UnitFile,
    findings: &'a mut Vec<RuleFinding>,
}

impl<'t> Visitor<'t> for ResyncVisitor<'t, '_> {
    fn enter(&mut self, node: Node<'t>, _scope: &ScopeFrame) -> Flow {
        if node.kind() != "call_expression" {
            return Flow::Continue;
        }
        let target = self.file.resolver().resolve_call_target(node);
        if !RESYNC_INFORMER_CONSTRUCTORS.matches(&target, ResolutionTier::PreciseOrName) {
            return Flow::Continue;
        }
        for arg in call_args(node) {
            if is_zero_literal(&self.file.parsed, arg) {
                self.findings.push(RuleFinding::at(
                    &self.file.parsed,
                    &arg,
                    "informer resync period is zero; ensure this is intentional",
                ));
            }
        }
        Flow::Continue
    }
}

#[async_trait]
impl Rule for NoResyncRule {
    fn id(&self) -> &'static str {
        "K8S040"
    }

    fn title(&self) -> &'static str {
        "Informer with zero resync period"
    }

    fn suggestion(&self) -> &'static str {
        "Set an intentional resync period"
    }

    async fn evaluate(&self, unit: &SemanticUnit) -> Vec<RuleFinding> {
        let mut findings = Vec::new();
        for file in &unit.files {
            let mut visitor = ResyncVisitor {
                file,
                findings: &mut findings,
            };
            walk(&file.parsed, &mut visitor);
        }
        findings
    }
}
