//! Algorithm templates shared by rule families. Within a family only the
//! matched symbol sets and messages differ.

use tree_sitter::Node;

use kubeaudit_core::{walk, Flow, ScopeFrame, SemanticUnit, UnitFile, Visitor};

use crate::finding::RuleFinding;
use crate::hotpath::is_hot_path;
use crate::watchlists::{ResolutionTier, SymbolSet};

/// Construct-in-hot-path-or-loop template: flag calls resolving to a watched
/// constructor when the call site sits inside a loop, or when the enclosing
/// function is a hot path (and not `init`).
pub(crate) fn flag_constructions(
    unit: &SemanticUnit,
    watched: &SymbolSet,
    tier: ResolutionTier,
    loop_message: &str,
    hot_path_message: &str,
) -> Vec<RuleFinding> {
    struct ConstructVisitor<'t, 'a> {
        file: &'t UnitFile,
        watched: &'a SymbolSet,
        tier: ResolutionTier,
        loop_message: &'a str,
        hot_path_message: &'a str,
        findings: Vec<RuleFinding>,
    }

    impl<'t> Visitor<'t> for ConstructVisitor<'t, '_> {
        fn enter(&mut self, node: Node<'t>, scope: &ScopeFrame) -> Flow {
            if node.kind() != "call_expression" {
                return Flow::Continue;
            }
            let target = self.file.resolver().resolve_call_target(node);
            if !self.watched.matches(&target, self.tier) {
                return Flow::Continue;
            }
            if scope.loop_depth > 0 {
                self.findings.push(RuleFinding::at(
                    &self.file.parsed,
                    &node,
                    self.loop_message,
                ));
            } else if let Some(func) = &scope.enclosing_function {
                if is_hot_path(func, &self.file.imports) {
                    self.findings.push(RuleFinding::at(
                        &self.file.parsed,
                        &node,
                        self.hot_path_message,
                    ));
                }
            }
            Flow::Continue
        }
    }

    let mut findings = Vec::new();
    for file in &unit.files {
        let mut visitor = ConstructVisitor {
            file,
            watched,
            tier,
            loop_message,
            hot_path_message,
            findings: Vec::new(),
        };
        walk(&file.parsed, &mut visitor);
        findings.append(&mut visitor.findings);
    }
    findings
}
