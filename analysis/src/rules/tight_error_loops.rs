//! K8S032: flags tight `for` loops that check errors and hit the Kubernetes
//! API with no sleep/backoff between attempts.

use async_trait::async_trait;
use tree_sitter::Node;

use kubeaudit_core::{walk, CallTarget, Flow, ScopeFrame, SemanticUnit, UnitFile, Visitor};

use crate::finding::RuleFinding;
use crate::rules::helpers::{
    args_contain_kube_options, call_args, chain_has_empty_namespace_arg, chain_has_resource_name,
    looks_like_context,
};
use crate::rules::Rule;
use crate::watchlists::{is_kubernetes_path, API_VERBS};

#[derive(Debug, Default)]
pub struct TightErrorLoopsRule;

impl TightErrorLoopsRule {
    pub fn new() -> Self {
        Self
    }
}

struct TightLoopVisitor<'t, 'a> {
    file: &'t UnitFile,
    /// Set while traversing an outermost non-range `for`.
    tracking: Option<Node<'t>>,
    has_error_check: bool,
    has_api_call: bool,
    has_sleep: bool,
    findings: &'a mut Vec<RuleFinding>,
}

impl<'t, 'a> TightLoopVisitor<'t, 'a> {
    /// A call counts as a Kubernetes API call when it is an API verb and the
    /// call shape carries Kubernetes evidence: a precise import resolution, a
    /// typed-client receiver chain, a context-like first argument, or known
    /// list options. Best effort without full type info.
    fn is_kube_api_call(&self, node: Node<'t>, target: &CallTarget) -> bool {
        let Some(name) = target.name() else {
            return false;
        };
        if !API_VERBS.contains(&name) {
            return false;
        }
        if let CallTarget::Resolved(sym) = target {
            return is_kubernetes_path(&sym.package);
        }
        if !matches!(target, CallTarget::Method { .. }) {
            return false;
        }
        if let Some(receiver) = self.file.resolver().call_receiver(node) {
            if chain_has_resource_name(&self.file.parsed, receiver)
                || chain_has_empty_namespace_arg(&self.file.parsed, receiver)
            {
                return true;
            }
        }
        let args = call_args(node);
        if let Some(first) = args.first() {
            if looks_like_context(&self.file.parsed, *first) {
                return true;
            }
        }
        args_contain_kube_options(&self.file.parsed, &args)
    }
}

impl<'t> Visitor<'t> for TightLoopVisitor<'t, '_> {
    fn enter(&mut self, node: Node<'t>, scope: &ScopeFrame) -> Flow {
        match node.kind() {
            "for_statement" if scope.loop_depth == 1 && self.tracking.is_none() => {
                let is_range = (0..node.child_count())
                    .filter_map(|i| node.child(i))
                    .any(|c| c.kind() == "range_clause");
                if !is_range {
                    self.tracking = Some(node);
                    self.has_error_check = false;
                    self.has_api_call = false;
                    self.has_sleep = false;
                }
            }
            "call_expression" if self.tracking.is_some() && scope.loop_depth == 1 => {
                let target = self.file.resolver().resolve_call_target(node);
                let is_sleep = match &target {
                    CallTarget::Resolved(sym) => sym.package == "time" && sym.name == "Sleep",
                    CallTarget::Method { name } => name == "Sleep",
                    _ => false,
                };
                if is_sleep {
                    self.has_sleep = true;
                } else if self.is_kube_api_call(node, &target) {
                    self.has_api_call = true;
                }
            }
            "if_statement" if self.tracking.is_some() && scope.loop_depth == 1 => {
                // `if err != nil` style conditions.
                if let Some(cond) = node.child_by_field_name("condition") {
                    if cond.kind() == "binary_expression" {
                        let op = cond
                            .child_by_field_name("operator")
                            .map(|o| o.kind() == "!=")
                            .unwrap_or(false);
                        let left_is_ident = cond
                            .child_by_field_name("left")
                            .map(|l| l.kind() == "identifier")
                            .unwrap_or(false);
                        let right_is_nil = cond
                            .child_by_field_name("right")
                            .map(|r| self.file.parsed.text_for_node(&r) == "nil")
                            .unwrap_or(false);
                        if op && left_is_ident && right_is_nil {
                            self.has_error_check = true;
                        }
                    }
                }
            }
            _ => {}
        }
        Flow::Continue
    }

    fn leave(&mut self, node: Node<'t>, _scope: &ScopeFrame) {
        if self.tracking.map(|t| t.id()) == Some(node.id()) {
            if self.has_error_check && self.has_api_call && !self.has_sleep {
                self.findings.push(RuleFinding::at(
                    &self.file.parsed,
                    &node,
                    "tight loop on errors without backoff around Kubernetes API calls",
                ));
            }
            self.tracking = None;
        }
    }
}

#[async_trait]
impl Rule for TightErrorLoopsRule {
    fn id(&self) -> &'static str {
        "K8S032"
    }

    fn title(&self) -> &'static str {
        "Tight error loop without backoff around Kubernetes API calls"
    }

    fn suggestion(&self) -> &'static str {
        "Insert backoff or sleep when retrying on errors"
    }

    async fn evaluate(&self, unit: &SemanticUnit) -> Vec<RuleFinding> {
        let mut findings = Vec::new();
        for file in &unit.files {
            let mut visitor = TightLoopVisitor {
                file,
                tracking: None,
                has_error_check: false,
                has_api_call: false,
                has_sleep: false,
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
    async fn flags_retry_loop_without_backoff() {
        let rule = TightErrorLoopsRule::new();
        let unit = unit(
            r#"
package main

func ensure(c Client) {
    for {
        err := c.Get(ctx, key)
        if err != nil {
            continue
        }
        break
    }
}
"#,
        );
        let findings = rule.evaluate(&unit).await;
        assert_eq!(findings.len(), 1);
    }

    #[tokio::test]
    async fn sleep_in_loop_is_clean() {
        let rule = TightErrorLoopsRule::new();
        let unit = unit(
            r#"
package main

import "time"

func ensure(c Client) {
    for {
        err := c.Get(ctx, key)
        if err != nil {
            time.Sleep(time.Second)
            continue
        }
        break
    }
}
"#,
        );
        assert!(rule.evaluate(&unit).await.is_empty());
    }

    #[tokio::test]
    async fn loop_without_error_check_is_clean() {
        let rule = TightErrorLoopsRule::new();
        let unit = unit(
            r#"
package main

func mirror(c Client) {
    for {
        c.Get(ctx, key)
    }
}
"#,
        );
        assert!(rule.evaluate(&unit).await.is_empty());
    }

    #[tokio::test]
    async fn typed_chain_counts_as_api_call() {
        let rule = TightErrorLoopsRule::new();
        let unit = unit(
            r#"
package main

func ensure(cs Clientset) {
    for {
        _, err := cs.CoreV1().Pods("prod").Get(name)
        if err != nil {
            continue
        }
        break
    }
}
"#,
        );
        let findings = rule.evaluate(&unit).await;
        assert_eq!(findings.len(), 1);
    }

    #[tokio::test]
    async fn non_api_loop_is_clean() {
        let rule = TightErrorLoopsRule::new();
        let unit = unit(
            r#"
package main

func parse(lines []string) {
    for {
        err := decode(buf)
        if err != nil {
            continue
        }
        break
    }
}
"#,
        );
        assert!(rule.evaluate(&unit).await.is_empty());
    }
}
