//! K8S010: flags direct Watch calls in units that never construct a shared
//! informer.
//!
//! Two-phase, whole-unit scope: phase one looks for any informer-factory
//! construction across all files of the unit; phase two reports each direct
//! Watch call only when no such mitigation exists. The scope is deliberately
//! the unit, not the lexically enclosing function.

use async_trait::async_trait;
use tree_sitter::Node;

use kubeaudit_core::{walk, CallTarget, Flow, ScopeFrame, SemanticUnit, UnitFile, Visitor};

use crate::finding::RuleFinding;
use crate::rules::helpers::callee_node;
use crate::rules::Rule;
use crate::watchlists::{is_kubernetes_path, ResolutionTier, INFORMER_CONSTRUCTORS};

#[derive(Debug, Default)]
pub struct MissingInformerRule;

impl MissingInformerRule {
    pub fn new() -> Self {
        Self
    }
}

struct ScanVisitor<'t, 'a> {
    file: &'t UnitFile,
    unit_uses_kubernetes: bool,
    has_informer: &'a mut bool,
    watch_calls: &'a mut Vec<RuleFinding>,
}

impl<'t> Visitor<'t> for ScanVisitor<'t, '_> {
    fn enter(&mut self, node: Node<'t>, _scope: &ScopeFrame) -> Flow {
        if node.kind() != "call_expression" {
            return Flow::Continue;
        }
        let target = self.file.resolver().resolve_call_target(node);
        if INFORMER_CONSTRUCTORS.matches(&target, ResolutionTier::PreciseOrName) {
            *self.has_informer = true;
            return Flow::Continue;
        }
        let is_watch = match &target {
            CallTarget::Resolved(sym) => sym.name == "Watch" && is_kubernetes_path(&sym.package),
            CallTarget::Method { name } => name == "Watch" && self.unit_uses_kubernetes,
            _ => false,
        };
        if is_watch {
            self.watch_calls.push(RuleFinding::at(
                &self.file.parsed,
                &callee_node(node),
                "direct Kubernetes Watch call with no shared informer in this package; prefer shared informers (client-go informers/cache)",
            ));
        }
        Flow::Continue
    }
}

#[async_trait]
impl Rule for MissingInformerRule {
    fn id(&self) -> &'static str {
        "K8S010"
    }

    fn title(&self) -> &'static str {
        "Direct Watch without shared informer"
    }

    fn suggestion(&self) -> &'static str {
        "Use shared informers/cache to avoid expensive Watches"
    }

    async fn evaluate(&self, unit: &SemanticUnit) -> Vec<RuleFinding> {
        let unit_uses_kubernetes = unit.imports_any(is_kubernetes_path);
        let mut has_informer = false;
        let mut watch_calls = Vec::new();
        for file in &unit.files {
            let mut visitor = ScanVisitor {
                file,
                unit_uses_kubernetes,
                has_informer: &mut has_informer,
                watch_calls: &mut watch_calls,
            };
            walk(&file.parsed, &mut visitor);
        }
        if has_informer {
            Vec::new()
        } else {
            watch_calls
        }
    }
}
