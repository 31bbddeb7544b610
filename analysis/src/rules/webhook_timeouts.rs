//! K8S060: flags http.Client/http.Server literals in webhook code without
//! timeouts. Name-tier by design: webhook packages often lack resolvable
//! type info for net/http wrappers, so the match is on the literal's type
//! name.

use async_trait::async_trait;
use tree_sitter::Node;

use kubeaudit_core::{walk, Flow, ScopeFrame, SemanticUnit, TypeTarget, UnitFile, Visitor};

use crate::finding::RuleFinding;
use crate::rules::helpers::{is_zero_literal, keyed_fields};
use crate::rules::Rule;

#[derive(Debug, Default)]
pub struct WebhookTimeoutsRule;

impl WebhookTimeoutsRule {
    pub fn new() -> Self {
        Self
    }
}

struct TimeoutsVisitor<'t, 'a> {
    file: &'t UnitFile,
    findings: &'a mut Vec<RuleFinding>,
}

impl<'t> Visitor<'t> for TimeoutsVisitor<'t, '_> {
    fn enter(&mut self, node: Node<'t>, _scope: &ScopeFrame) -> Flow {
        if node.kind() != "composite_literal" {
            return Flow::Continue;
        }
        let type_name = match self.file.resolver().resolve_literal_type(node) {
            TypeTarget::Resolved(t) => {
                if t.package == "net/http" {
                    Some(t.name)
                } else {
                    None
                }
            }
            TypeTarget::Named { name, .. } => Some(name),
            TypeTarget::Unknown => None,
        };
        let (is_client, is_server) = match type_name.as_deref() {
            Some("Client") => (true, false),
            Some("Server") => (false, true),
            _ => (false, false),
        };
        if !is_client && !is_server {
            return Flow::Continue;
        }

        let parsed = &self.file.parsed;
        let mut has_timeout = false;
        let mut zero_timeout = false;
        for (key, value) in keyed_fields(parsed, node) {
            let relevant = if is_client {
                key == "Timeout"
            } else {
                matches!(key.as_str(), "ReadTimeout" | "WriteTimeout" | "IdleTimeout")
            };
            if relevant {
                has_timeout = true;
                if is_zero_literal(parsed, value) {
                    zero_timeout = true;
                }
            }
        }
        if !has_timeout || zero_timeout {
            self.findings.push(RuleFinding::at(
                parsed,
                &node,
                "webhook HTTP client/server missing or having zero timeouts; set conservative timeouts",
            ));
        }
        Flow::Continue
    }
}

#[async_trait]
impl Rule for WebhookTimeoutsRule {
    fn id(&self) -> &'static str {
        "K8S060"
    }

    fn title(&self) -> &'static str {
        "Webhook HTTP timeouts missing/zero"
    }

    fn suggestion(&self) -> &'static str {
        "Set client/server timeouts"
    }

    async fn evaluate(&self, unit: &SemanticUnit) -> Vec<RuleFinding> {
        let mut findings = Vec::new();
        for file in &unit.files {
            let mut visitor = TimeoutsVisitor {
                file,
                findings: &mut findings,
            };
            walk(&file.parsed, &mut visitor);
        }
        findings
    }
}
