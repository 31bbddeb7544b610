//! K8S030: flags branches that detect HTTP 429/throttling and retry without
//! any backoff in the branch body.

use async_trait::async_trait;
use tree_sitter::Node;

use kubeaudit_core::{walk, Flow, ScopeFrame, SemanticUnit, UnitFile, Visitor};

use crate::finding::RuleFinding;
use crate::rules::helpers::{subtree_has_backoff_call, subtree_mentions_throttling};
use crate::rules::Rule;

#[derive(Debug, Default)]
pub struct Ignoring429Rule;

impl Ignoring429Rule {
    pub fn new() -> Self {
        Self
    }
}

struct ThrottleVisitor<'t, 'a> {
    file: &'t UnitFile,
    findings: &'a mut Vec<RuleFinding>,
}

impl<'t> Visitor<'t> for ThrottleVisitor<'t, '_> {
    fn enter(&mut self, node: Node<'t>, _scope: &ScopeFrame) -> Flow {
        if node.kind() != "if_statement" {
            return Flow::Continue;
        }
        let Some(condition) = node.child_by_field_name("condition") else {
            return Flow::Continue;
        };
        if !subtree_mentions_throttling(self.file, condition) {
            return Flow::Continue;
        }
        let Some(body) = node.child_by_field_name("consequence") else {
            return Flow::Continue;
        };
        if !subtree_has_backoff_call(self.file, body, &["Backoff", "Wait"]) {
            self.findings.push(RuleFinding::at(
                &self.file.parsed,
                &node,
                "handling 429 without backoff; add sleep/backoff before retrying",
            ));
        }
        Flow::Continue
    }
}

#[async_trait]
impl Rule for Ignoring429Rule {
    fn id(&self) -> &'static str {
        "K8S030"
    }

    fn title(&self) -> &'static str {
        "429 handled without backoff"
    }

    fn suggestion(&self) -> &'static str {
        "Back off before retrying throttled requests"
    }

    async fn evaluate(&self, unit: &SemanticUnit) -> Vec<RuleFinding> {
        let mut findings = Vec::new();
        for file in &unit.files {
            let mut visitor = ThrottleVisitor {
                file,
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
    async fn status_check_without_backoff_is_flagged() {
        let rule = Ignoring429Rule::new();
        let unit = unit(
            r#"
package main

import "net/http"

func retryOn429(resp *http.Response) {
    if resp.StatusCode == http.StatusTooManyRequests {
        retry()
    }
}
"#,
        );
        assert_eq!(rule.evaluate(&unit).await.len(), 1);
    }

    #[tokio::test]
    async fn literal_429_without_backoff_is_flagged() {
        let rule = Ignoring429Rule::new();
        let unit = unit(
            r#"
package main

func retryOn429(code int) {
    if code == 429 {
        retry()
    }
}
"#,
        );
        assert_eq!(rule.evaluate(&unit).await.len(), 1);
    }

    #[tokio::test]
    async fn sleep_in_branch_is_clean() {
        let rule = Ignoring429Rule::new();
        let unit = unit(
            r#"
package main

import (
    "net/http"
    "time"
)

func retryOn429(resp *http.Response) {
    if resp.StatusCode == http.StatusTooManyRequests {
        time.Sleep(time.Second)
        retry()
    }
}
"#,
        );
        assert!(rule.evaluate(&unit).await.is_empty());
    }

    #[tokio::test]
    async fn backoff_helper_in_branch_is_clean() {
        let rule = Ignoring429Rule::new();
        let unit = unit(
            r#"
package main

func retryOn429(code int) {
    if code == 429 {
        Backoff()
    }
}
"#,
        );
        assert!(rule.evaluate(&unit).await.is_empty());
    }

    #[tokio::test]
    async fn unrelated_condition_is_ignored() {
        let rule = Ignoring429Rule::new();
        let unit = unit(
            r#"
package main

func check(code int) {
    if code == 500 {
        retry()
    }
}
"#,
        );
        assert!(rule.evaluate(&unit).await.is_empty());
    }
}
