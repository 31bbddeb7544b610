//! K8S002: flags rest.Config literals and field assignments whose QPS/Burst
//! are missing, zero (client-go treats zero as "apply low defaults") or
//! absurdly high (effectively unlimited).

use async_trait::async_trait;
use tree_sitter::Node;

use kubeaudit_core::{walk, Flow, ParsedFile, ScopeFrame, SemanticUnit, TypeTarget, UnitFile, Visitor};

use crate::finding::RuleFinding;
use crate::rules::helpers::{
    expression_list, float_literal_value, int_literal_value, keyed_fields, unwrap_address_of,
    VarInits,
};
use crate::rules::Rule;
use crate::watchlists::{
    paths, ResolutionTier, CONFIG_LOADERS, MAX_REASONABLE_BURST, MAX_REASONABLE_QPS,
};

#[derive(Debug, Default)]
pub struct QpsBurstRule;

impl QpsBurstRule {
    pub fn new() -> Self {
        Self
    }
}

fn is_bad_qps(parsed: &ParsedFile, value: Node) -> bool {
    match float_literal_value(parsed, value) {
        Some(v) => v == 0.0 || v > MAX_REASONABLE_QPS,
        None => false,
    }
}

fn is_bad_burst(parsed: &ParsedFile, value: Node) -> bool {
    match int_literal_value(parsed, value) {
        Some(v) => v == 0 || v > MAX_REASONABLE_BURST,
        None => false,
    }
}

struct QpsBurstVisitor<'t, 'a> {
    file: &'t UnitFile,
    inits: VarInits<'t>,
    findings: &'a mut Vec<RuleFinding>,
}

impl<'t, 'a> QpsBurstVisitor<'t, 'a> {
    fn is_rest_config_literal(&self, lit: Node<'t>) -> bool {
        match self.file.resolver().resolve_literal_type(lit) {
            TypeTarget::Resolved(t) => t.package == paths::CLIENT_GO_REST && t.name == "Config",
            TypeTarget::Named { qualifier, name } => {
                qualifier.as_deref() == Some("rest") && name == "Config"
            }
            TypeTarget::Unknown => false,
        }
    }

    /// True if the expression traces back to a rest.Config value: a config
    /// literal or the result of a known config loader.
    fn resolves_to_rest_config(&self, expr: Node<'t>) -> bool {
        let resolved = self.inits.resolve(&self.file.parsed, expr);
        if resolved.kind() == "composite_literal" {
            return self.is_rest_config_literal(resolved);
        }
        if resolved.kind() == "call_expression" {
            let target = self.file.resolver().resolve_call_target(resolved);
            return CONFIG_LOADERS.matches(&target, ResolutionTier::Precise);
        }
        false
    }

    fn check_literal(&mut self, lit: Node<'t>) {
        if !self.is_rest_config_literal(lit) {
            return;
        }
        let parsed = &self.file.parsed;
        let mut has_qps = false;
        let mut has_burst = false;
        let mut bad_qps = false;
        let mut bad_burst = false;
        for (key, value) in keyed_fields(parsed, lit) {
            match key.as_str() {
                "QPS" => {
                    has_qps = true;
                    bad_qps = is_bad_qps(parsed, value);
                }
                "Burst" => {
                    has_burst = true;
                    bad_burst = is_bad_burst(parsed, value);
                }
                _ => {}
            }
        }
        if !has_qps || !has_burst || bad_qps || bad_burst {
            self.findings.push(RuleFinding::at(
                parsed,
                &lit,
                "rest.Config QPS/Burst missing or unrealistic",
            ));
        }
    }

    fn check_assignment(&mut self, node: Node<'t>) {
        let (Some(left), Some(right)) = (
            node.child_by_field_name("left"),
            node.child_by_field_name("right"),
        ) else {
            return;
        };
        let parsed = &self.file.parsed;
        let lhs = expression_list(left);
        let rhs = expression_list(right);
        for (target, value) in lhs.iter().zip(rhs.iter()) {
            if target.kind() != "selector_expression" {
                continue;
            }
            let (Some(operand), Some(field)) = (
                target.child_by_field_name("operand"),
                target.child_by_field_name("field"),
            ) else {
                continue;
            };
            let field_name = parsed.text_for_node(&field);
            if field_name != "QPS" && field_name != "Burst" {
                continue;
            }
            if !self.resolves_to_rest_config(unwrap_address_of(operand)) {
                continue;
            }
            if field_name == "QPS" && is_bad_qps(parsed, *value) {
                self.findings.push(RuleFinding::at(
                    parsed,
                    &field,
                    "rest.Config.QPS set to zero or extreme",
                ));
            }
            if field_name == "Burst" && is_bad_burst(parsed, *value) {
                self.findings.push(RuleFinding::at(
                    parsed,
                    &field,
                    "rest.Config.Burst set to zero or extreme",
                ));
            }
        }
    }
}

impl<'t> Visitor<'t> for QpsBurstVisitor<'t, '_> {
    fn enter(&mut self, node: Node<'t>, _scope: &ScopeFrame) -> Flow {
        match node.kind() {
            "function_declaration" | "method_declaration" => self.inits.clear(),
            "short_var_declaration" | "var_declaration" => {
                self.inits.record(&self.file.parsed, node)
            }
            "assignment_statement" => {
                self.check_assignment(node);
                self.inits.record(&self.file.parsed, node);
            }
            "composite_literal" => self.check_literal(node),
            _ => {}
        }
        Flow::Continue
    }
}

#[async_trait]
impl Rule for QpsBurstRule {
    fn id(&self) -> &'static str {
        "K8S002"
    }

    fn title(&self) -> &'static str {
        "rest.Config QPS/Burst missing or unrealistic"
    }

    fn suggestion(&self) -> &'static str {
        "Set reasonable QPS/Burst (e.g., QPS=20, Burst=50)"
    }

    async fn evaluate(&self, unit: &SemanticUnit) -> Vec<RuleFinding> {
        let mut findings = Vec::new();
        for file in &unit.files {
            let mut visitor = QpsBurstVisitor {
                file,
                inits: VarInits::default(),
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
    async fn literal_without_qps_burst_is_flagged() {
        let rule = QpsBurstRule::new();
        let unit = unit(
            r#"
package main

import "k8s.io/client-go/rest"

var cfg = rest.Config{Host: "https://example"}
"#,
        );
        assert_eq!(rule.evaluate(&unit).await.len(), 1);
    }

    #[tokio::test]
    async fn reasonable_values_are_clean() {
        let rule = QpsBurstRule::new();
        let unit = unit(
            r#"
package main

import "k8s.io/client-go/rest"

var cfg = rest.Config{QPS: 20, Burst: 50}
"#,
        );
        assert!(rule.evaluate(&unit).await.is_empty());
    }

    #[tokio::test]
    async fn zero_qps_is_flagged() {
        let rule = QpsBurstRule::new();
        let unit = unit(
            r#"
package main

import "k8s.io/client-go/rest"

var cfg = rest.Config{QPS: 0, Burst: 50}
"#,
        );
        assert_eq!(rule.evaluate(&unit).await.len(), 1);
    }

    #[tokio::test]
    async fn extreme_burst_is_flagged() {
        let rule = QpsBurstRule::new();
        let unit = unit(
            r#"
package main

import "k8s.io/client-go/rest"

var cfg = rest.Config{QPS: 20, Burst: 200000}
"#,
        );
        assert_eq!(rule.evaluate(&unit).await.len(), 1);
    }

    #[tokio::test]
    async fn assignment_to_loaded_config_is_checked() {
        let rule = QpsBurstRule::new();
        let unit = unit(
            r#"
package main

import "k8s.io/client-go/rest"

func tune() {
    cfg, _ := rest.InClusterConfig()
    cfg.QPS = 0
}
"#,
        );
        let findings = rule.evaluate(&unit).await;
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("QPS"));
    }

    #[tokio::test]
    async fn assignment_to_unrelated_struct_is_ignored() {
        let rule = QpsBurstRule::new();
        let unit = unit(
            r#"
package main

func tune() {
    limiter := NewLimiter()
    limiter.QPS = 0
}
"#,
        );
        assert!(rule.evaluate(&unit).await.is_empty());
    }

    #[tokio::test]
    async fn unrelated_config_literal_is_ignored() {
        let rule = QpsBurstRule::new();
        let unit = unit(
            r#"
package main

var cfg = app.Config{Name: "svc"}
"#,
        );
        assert!(rule.evaluate(&unit).await.is_empty());
    }
}
