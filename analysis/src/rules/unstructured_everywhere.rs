//! K8S052: flags units that lean on `unstructured.Unstructured` pervasively
//! (three or more constructs) while never building a typed client.
//!
//! Unit-count scope: one finding per unit, positioned at the first file.

use async_trait::async_trait;
use tree_sitter::Node;

use kubeaudit_core::{walk, CallTarget, Flow, ScopeFrame, SemanticUnit, TypeTarget, UnitFile, Visitor};

use crate::finding::RuleFinding;
use crate::rules::Rule;
use crate::watchlists::{
    paths, ResolutionTier, TYPED_CLIENT_CONSTRUCTORS, UNSTRUCTURED_OVERUSE_THRESHOLD,
};

#[derive(Debug, Default)]
pub struct UnstructuredEverywhereRule;

impl UnstructuredEverywhereRule {
    pub fn new() -> Self {
        Self
    }
}

struct UnstructuredScan<'t, 'a> {
    file: &'t UnitFile,
    count: &'a mut usize,
    has_typed: &'a mut bool,
}

impl<'t> Visitor<'t> for UnstructuredScan<'t, '_> {
    fn enter(&mut self, node: Node<'t>, _scope: &ScopeFrame) -> Flow {
        match node.kind() {
            "composite_literal" => {
                let is_unstructured = match self.file.resolver().resolve_literal_type(node) {
                    TypeTarget::Resolved(t) => {
                        t.name == "Unstructured" && t.package == paths::UNSTRUCTURED
                    }
                    TypeTarget::Named { qualifier, name } => {
                        qualifier.as_deref() == Some("unstructured") && name == "Unstructured"
                    }
                    TypeTarget::Unknown => false,
                };
                if is_unstructured {
                    *self.count += 1;
                }
            }
            "call_expression" => {
                let target = self.file.resolver().resolve_call_target(node);
                if TYPED_CLIENT_CONSTRUCTORS.matches(&target, ResolutionTier::Precise) {
                    *self.has_typed = true;
                } else if let CallTarget::Resolved(sym) = &target {
                    if sym.package == paths::UNSTRUCTURED && sym.name.contains("Unstructured") {
                        *self.count += 1;
                    }
                }
            }
            _ => {}
        }
        Flow::Continue
    }
}

#[async_trait]
impl Rule for UnstructuredEverywhereRule {
    fn id(&self) -> &'static str {
        "K8S052"
    }

    fn title(&self) -> &'static str {
        "Unstructured everywhere"
    }

    fn suggestion(&self) -> &'static str {
        "Prefer typed objects for performance and safety"
    }

    async fn evaluate(&self, unit: &SemanticUnit) -> Vec<RuleFinding> {
        let mut count = 0usize;
        let mut has_typed = false;
        for file in &unit.files {
            let mut visitor = UnstructuredScan {
                file,
                count: &mut count,
                has_typed: &mut has_typed,
            };
            walk(&file.parsed, &mut visitor);
        }
        if count >= UNSTRUCTURED_OVERUSE_THRESHOLD && !has_typed {
            if let Some(first) = unit.files.first() {
                let root = first.root();
                return vec![RuleFinding::at(
                    &first.parsed,
                    &root,
                    format!(
                        "heavy use of unstructured.Unstructured ({count} occurrences); prefer typed clients/objects when possible"
                    ),
                )];
            }
        }
        Vec::new()
    }
}
