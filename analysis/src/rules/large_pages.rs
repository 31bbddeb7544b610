//! K8S023: flags List calls paging with an excessively large Limit.

use async_trait::async_trait;
use tree_sitter::Node;

use kubeaudit_core::{walk, CallTarget, Flow, ScopeFrame, SemanticUnit, TypeTarget, UnitFile, Visitor};

use crate::finding::RuleFinding;
use crate::rules::helpers::{call_args, int_literal_value, keyed_fields, unwrap_address_of};
use crate::rules::Rule;
use crate::watchlists::{is_kubernetes_path, LARGE_PAGE_LIMIT};

#[derive(Debug, Default)]
pub struct LargePagesRule;

impl LargePagesRule {
    pub fn new() -> Self {
        Self
    }
}

struct LargePagesVisitor<'t, 'a> {
    file: &'t UnitFile,
    findings: &'a mut Vec<RuleFinding>,
}

impl<'t, 'a> LargePagesVisitor<'t, 'a> {
    fn is_list_options_literal(&self, lit: Node<'t>) -> bool {
        match self.file.resolver().resolve_literal_type(lit) {
            TypeTarget::Resolved(t) => t.name == "ListOptions" && is_kubernetes_path(&t.package),
            TypeTarget::Named { name, .. } => name == "ListOptions",
            TypeTarget::Unknown => false,
        }
    }
}

impl<'t> Visitor<'t> for LargePagesVisitor<'t, '_> {
    fn enter(&mut self, node: Node<'t>, _scope: &ScopeFrame) -> Flow {
        if node.kind() != "call_expression" {
            return Flow::Continue;
        }
        let target = self.file.resolver().resolve_call_target(node);
        if target.name() != Some("List") || matches!(target, CallTarget::Unresolved) {
            return Flow::Continue;
        }
        for arg in call_args(node) {
            let lit = unwrap_address_of(arg);
            if lit.kind() != "composite_literal" || !self.is_list_options_literal(lit) {
                continue;
            }
            for (key, value) in keyed_fields(&self.file.parsed, lit) {
                if key != "Limit" {
                    continue;
                }
                if let Some(limit) = int_literal_value(&self.file.parsed, value) {
                    if limit >= LARGE_PAGE_LIMIT {
                        self.findings.push(RuleFinding::at(
                            &self.file.parsed,
                            &value,
                            format!(
                                "ListOptions.Limit is very large ({limit}); use reasonable page sizes"
                            ),
                        ));
                    }
                }
            }
        }
        Flow::Continue
    }
}

#[async_trait]
impl Rule for LargePagesRule {
    fn id(&self) -> &'static str {
        "K8S023"
    }

    fn title(&self) -> &'static str {
        "Excessively large page sizes"
    }

    fn suggestion(&self) -> &'static str {
        "Use reasonable ListOptions.Limit"
    }

    async fn evaluate(&self, unit: &SemanticUnit) -> Vec<RuleFinding> {
        let mut findings = Vec::new();
        for file in &unit.files {
            let mut visitor = LargePagesVisitor {
                file,
                findings: &mut findings,
            };
            walk(&file.parsed, &mut visitor);
        }
        findings
    }
}
