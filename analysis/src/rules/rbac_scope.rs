//! K8S080 / K8S081: RBAC scope rules.
//!
//! K8S080 flags cluster-scoped RBAC literals (ClusterRole/ClusterRoleBinding)
//! as candidates for namespace scoping. K8S081 flags policy rules granting
//! wildcard verbs.

use async_trait::async_trait;
use tree_sitter::Node;

use kubeaudit_core::{walk, Flow, ScopeFrame, SemanticUnit, TypeTarget, UnitFile, Visitor};

use crate::finding::RuleFinding;
use crate::rules::helpers::keyed_fields;
use crate::rules::Rule;
use crate::watchlists::paths;

fn is_rbac_package(path: &str) -> bool {
    path == paths::RBAC_V1 || path == paths::RBAC_V1BETA1
}

/// K8S080: cluster-scoped RBAC literal.
#[derive(Debug, Default)]
pub struct ExcessiveClusterScopeRule;

impl ExcessiveClusterScopeRule {
    pub fn new() -> Self {
        Self
    }
}

struct ClusterScopeVisitor<'t, 'a> {
    file: &'t UnitFile,
    findings: &'a mut Vec<RuleFinding>,
}

impl<'t> Visitor<'t> for ClusterScopeVisitor<'t, '_> {
    fn enter(&mut self, node: Node<'t>, _scope: &ScopeFrame) -> Flow {
        if node.kind() != "composite_literal" {
            return Flow::Continue;
        }
        let flagged = match self.file.resolver().resolve_literal_type(node) {
            TypeTarget::Resolved(t) => {
                is_rbac_package(&t.package)
                    && (t.name == "ClusterRole" || t.name == "ClusterRoleBinding")
            }
            TypeTarget::Named { qualifier, name } => {
                qualifier.as_deref().is_some_and(|q| q.contains("rbac"))
                    && (name == "ClusterRole" || name == "ClusterRoleBinding")
            }
            TypeTarget::Unknown => false,
        };
        if flagged {
            self.findings.push(RuleFinding::at(
                &self.file.parsed,
                &node,
                "cluster-scoped RBAC detected; use namespace-scoped RBAC when possible",
            ));
        }
        Flow::Continue
    }
}

#[async_trait]
impl Rule for ExcessiveClusterScopeRule {
    fn id(&self) -> &'static str {
        "K8S080"
    }

    fn title(&self) -> &'static str {
        "Cluster-scoped RBAC where namespace scope may suffice"
    }

    fn suggestion(&self) -> &'static str {
        "Use namespace-scoped Role/RoleBinding when possible"
    }

    async fn evaluate(&self, unit: &SemanticUnit) -> Vec<RuleFinding> {
        let mut findings = Vec::new();
        for file in &unit.files {
            let mut visitor = ClusterScopeVisitor {
                file,
                findings: &mut findings,
            };
            walk(&file.parsed, &mut visitor);
        }
        findings
    }
}

/// K8S081: wildcard verbs in RBAC policy rules.
#[derive(Debug, Default)]
pub struct WildcardVerbsRule;

impl WildcardVerbsRule {
    pub fn new() -> Self {
        Self
    }
}

struct WildcardVisitor<'t, 'a> {
    file: &'t UnitFile,
    unit_in_rbac_context: bool,
    findings: &'a mut Vec<RuleFinding>,
}

impl<'t, 'a> WildcardVisitor<'t, 'a> {
    fn in_rbac_context(&self, lit: Node<'t>) -> bool {
        match self.file.resolver().resolve_literal_type(lit) {
            TypeTarget::Resolved(t) => {
                is_rbac_package(&t.package) && (t.name == "PolicyRule" || t.name == "Rule")
            }
            _ => self.unit_in_rbac_context,
        }
    }
}

impl<'t> Visitor<'t> for WildcardVisitor<'t, '_> {
    fn enter(&mut self, node: Node<'t>, _scope: &ScopeFrame) -> Flow {
        if node.kind() != "composite_literal" || !self.in_rbac_context(node) {
            return Flow::Continue;
        }
        let parsed = &self.file.parsed;
        for (key, value) in keyed_fields(parsed, node) {
            if key != "Verbs" || value.kind() != "composite_literal" {
                continue;
            }
            let mut has_wildcard = false;
            if let Some(body) = value.child_by_field_name("body") {
                for i in 0..body.child_count() {
                    if let Some(elem) = body.child(i) {
                        if parsed.text_for_node(&elem) == "\"*\"" {
                            has_wildcard = true;
                        }
                    }
                }
            }
            if has_wildcard {
                self.findings.push(RuleFinding::at(
                    parsed,
                    &node,
                    "RBAC rule uses wildcard verbs; restrict to specific verbs",
                ));
            }
        }
        Flow::Continue
    }
}

#[async_trait]
impl Rule for WildcardVerbsRule {
    fn id(&self) -> &'static str {
        "K8S081"
    }

    fn title(&self) -> &'static str {
        "Wildcard verbs in RBAC rules"
    }

    fn suggestion(&self) -> &'static str {
        "Restrict to specific verbs"
    }

    async fn evaluate(&self, unit: &SemanticUnit) -> Vec<RuleFinding> {
        let unit_in_rbac_context = unit.imports_any(|p| {
            p.contains("rbac") && (p.starts_with("k8s.io/") || p.starts_with("sigs.k8s.io/"))
        });
        let mut findings = Vec::new();
        for file in &unit.files {
            let mut visitor = WildcardVisitor {
                file,
                unit_in_rbac_context,
                findings: &mut findings,
            };
            walk(&file.parsed, &mut visitor);
        }
        findings
    }
}
