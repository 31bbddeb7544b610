//! K8S050: flags rest.Config literals without sane defaults: a missing or
//! zero Timeout, or a missing or empty UserAgent.

use async_trait::async_trait;
use tree_sitter::Node;

use kubeaudit_core::{walk, Flow, ScopeFrame, SemanticUnit, TypeTarget, UnitFile, Visitor};

use crate::finding::RuleFinding;
use crate::rules::helpers::{is_empty_string, is_zero_literal, keyed_fields};
use crate::rules::Rule;
use crate::watchlists::paths;

#[derive(Debug, Default)]
pub struct RestConfigDefaultsRule;

impl RestConfigDefaultsRule {
    pub fn new() -> Self {
        Self
    }
}

struct DefaultsVisitor<'t, 'a> {
    file: &'t UnitFile,
    findings: &'a mut Vec<RuleFinding>,
}

impl<'t> Visitor<'t> for DefaultsVisitor<'t, '_> {
    fn enter(&mut self, node: Node<'t>, _scope: &ScopeFrame) -> Flow {
        if node.kind() != "composite_literal" {
            return Flow::Continue;
        }
        let is_rest_config = match self.file.resolver().resolve_literal_type(node) {
            TypeTarget::Resolved(t) => t.package == paths::CLIENT_GO_REST && t.name == "Config",
            TypeTarget::Named { qualifier, name } => {
                qualifier.as_deref() == Some("rest") && name == "Config"
            }
            TypeTarget::Unknown => false,
        };
        if !is_rest_config {
            return Flow::Continue;
        }

        let parsed = &self.file.parsed;
        let mut has_timeout = false;
        let mut has_user_agent = false;
        for (key, value) in keyed_fields(parsed, node) {
            match key.as_str() {
                "Timeout" => {
                    has_timeout = true;
                    if is_zero_literal(parsed, value) {
                        self.findings.push(RuleFinding::at(
                            parsed,
                            &value,
                            "rest.Config Timeout is zero; set a reasonable timeout",
                        ));
                    }
                }
                "UserAgent" => {
                    has_user_agent = true;
                    if is_empty_string(parsed, value) {
                        self.findings.push(RuleFinding::at(
                            parsed,
                            &value,
                            "rest.Config UserAgent is empty; set a descriptive UserAgent",
                        ));
                    }
                }
                _ => {}
            }
        }
        if !has_timeout || !has_user_agent {
            self.findings.push(RuleFinding::at(
                parsed,
                &node,
                "rest.Config missing Timeout and/or UserAgent; set sane defaults",
            ));
        }
        Flow::Continue
    }
}

#[async_trait]
impl Rule for RestConfigDefaultsRule {
    fn id(&self) -> &'static str {
        "K8S050"
    }

    fn title(&self) -> &'static str {
        "rest.Config missing sane defaults"
    }

    fn suggestion(&self) -> &'static str {
        "Set Timeout and UserAgent"
    }

    async fn evaluate(&self, unit: &SemanticUnit) -> Vec<RuleFinding> {
        let mut findings = Vec::new();
        for file in &unit.files {
            let mut visitor = DefaultsVisitor {
                file,
                findings: &mut findings,
            };
            walk(&file.parsed, &mut visitor);
        }
        findings
    }
}
