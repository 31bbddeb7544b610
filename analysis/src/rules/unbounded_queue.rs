//! K8S013: flags workqueue construction without a rate limiter.

use async_trait::async_trait;
use tree_sitter::Node;

use kubeaudit_core::{walk, Flow, ScopeFrame, SemanticUnit, UnitFile, Visitor};

use crate::finding::RuleFinding;
use crate::rules::Rule;
use crate::watchlists::{ResolutionTier, UNBOUNDED_WORKQUEUE};

#[derive(Debug, Default)]
pub struct UnboundedQueueRule;

impl UnboundedQueueRule {
    pub fn new() -> Self {
        Self
    }
}

struct QueueVisitor<'t, 'a> {
    file: &'t UnitFile,
    findings: &'a mut Vec<RuleFinding>,
}

impl<'t> Visitor<'t> for QueueVisitor<'t, '_> {
    fn enter(&mut self, node: Node<'t>, _scope: &ScopeFrame) -> Flow {
        if node.kind() == "call_expression" {
            let target = self.file.resolver().resolve_call_target(node);
            if UNBOUNDED_WORKQUEUE.matches(&target, ResolutionTier::Precise) {
                self.findings.push(RuleFinding::at(
                    &self.file.parsed,
                    &node,
                    "workqueue constructed without a rate limiter; use NewRateLimitingQueue or a RateLimitingInterface",
                ));
            }
        }
        Flow::Continue
    }
}

#[async_trait]
impl Rule for UnboundedQueueRule {
    fn id(&self) -> &'static str {
        "K8S013"
    }

    fn title(&self) -> &'static str {
        "Unbounded workqueue without rate limiter"
    }

    fn suggestion(&self) -> &'static str {
        "Use RateLimitingInterface and backoff"
    }

    async fn evaluate(&self, unit: &SemanticUnit) -> Vec<RuleFinding> {
        let mut findings = Vec::new();
        for file in &unit.files {
            let mut visitor = QueueVisitor {
                file,
                findings: &mut findings,
            };
            walk(&file.parsed, &mut visitor);
        }
        findings
    }
}
