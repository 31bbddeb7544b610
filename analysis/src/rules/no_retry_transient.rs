//! K8S031: flags branches that detect transient network errors and give up
//! without any retry/backoff.
//!
//! The transient-error identifiers are a loose heuristic, so this rule is
//! disabled by default.

use async_trait::async_trait;
use tree_sitter::Node;

use kubeaudit_core::{walk, Flow, ScopeFrame, SemanticUnit, UnitFile, Visitor};

use crate::finding::RuleFinding;
use crate::rules::helpers::{subtree_has_backoff_call, subtree_mentions_ident};
use crate::rules::Rule;
use crate::watchlists::{is_kubernetes_path, BACKOFF_NAMES, TRANSIENT_ERROR_IDENTS};

#[derive(Debug, Default)]
pub struct NoRetryTransientRule;

impl NoRetryTransientRule {
    pub fn new() -> Self {
        Self
    }
}

struct TransientVisitor<'t, 'a> {
    file: &'t UnitFile,
    findings: &'a mut Vec<RuleFinding>,
}

impl<'t> Visitor<'t> for TransientVisitor<'t, '_> {
    fn enter(&mut self, node: Node<'t>, _scope: &ScopeFrame) -> Flow {
        if node.kind() != "if_statement" {
            return Flow::Continue;
        }
        let Some(condition) = node.child_by_field_name("condition") else {
            return Flow::Continue;
        };
        if !subtree_mentions_ident(&self.file.parsed, condition, TRANSIENT_ERROR_IDENTS) {
            return Flow::Continue;
        }
        let Some(body) = node.child_by_field_name("consequence") else {
            return Flow::Continue;
        };
        if !subtree_has_backoff_call(self.file, body, BACKOFF_NAMES) {
            self.findings.push(RuleFinding::at(
                &self.file.parsed,
                &node,
                "Kubernetes-related transient error handled without retry/backoff",
            ));
        }
        Flow::Continue
    }
}

#[async_trait]
impl Rule for NoRetryTransientRule {
    fn id(&self) -> &'static str {
        "K8S031"
    }

    fn title(&self) -> &'static str {
        "Transient error without retry"
    }

    fn suggestion(&self) -> &'static str {
        "Retry transient errors with backoff"
    }

    async fn evaluate(&self, unit: &SemanticUnit) -> Vec<RuleFinding> {
        // Only meaningful for code that talks to the Kubernetes API.
        if !unit.imports_any(is_kubernetes_path) {
            return Vec::new();
        }
        let mut findings = Vec::new();
        for file in &unit.files {
            let mut visitor = TransientVisitor {
                file,
                findings: &mut findings,
            };
            walk(&file.parsed, &mut visitor);
        }
        findings
    }
}
