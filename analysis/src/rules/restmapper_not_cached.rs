//! K8S071: flags discovery-based RESTMapper construction when no caching
//! wrapper exists anywhere in the unit.

use async_trait::async_trait;
use tree_sitter::Node;

use kubeaudit_core::{walk, Flow, ScopeFrame, SemanticUnit, UnitFile, Visitor};

use crate::finding::RuleFinding;
use crate::rules::helpers::callee_node;
use crate::rules::Rule;
use crate::watchlists::{ResolutionTier, RESTMAPPER_CACHING, RESTMAPPER_CONSTRUCTORS};

#[derive(Debug, Default)]
pub struct RestMapperNotCachedRule;

impl RestMapperNotCachedRule {
    pub fn new() -> Self {
        Self
    }
}

struct MapperScan<'t, 'a> {
    file: &'t UnitFile,
    has_cache_wrapper: &'a mut bool,
    mapper_calls: &'a mut Vec<RuleFinding>,
}

impl<'t> Visitor<'t> for MapperScan<'t, '_> {
    fn enter(&mut self, node: Node<'t>, _scope: &ScopeFrame) -> Flow {
        if node.kind() != "call_expression" {
            return Flow::Continue;
        }
        let target = self.file.resolver().resolve_call_target(node);
        if RESTMAPPER_CACHING.matches(&target, ResolutionTier::Precise) {
            *self.has_cache_wrapper = true;
        } else if RESTMAPPER_CONSTRUCTORS.matches(&target, ResolutionTier::Precise) {
            self.mapper_calls.push(RuleFinding::at(
                &self.file.parsed,
                &callee_node(node),
                "RESTMapper created without caching; prefer deferred/cached RESTMapper wrappers",
            ));
        }
        Flow::Continue
    }
}

#[async_trait]
impl Rule for RestMapperNotCachedRule {
    fn id(&self) -> &'static str {
        "K8S071"
    }

    fn title(&self) -> &'static str {
        "RESTMapper not cached"
    }

    fn suggestion(&self) -> &'static str {
        "Use cached/deferred RESTMapper"
    }

    async fn evaluate(&self, unit: &SemanticUnit) -> Vec<RuleFinding> {
        let mut has_cache_wrapper = false;
        let mut mapper_calls = Vec::new();
        for file in &unit.files {
            let mut visitor = MapperScan {
                file,
                has_cache_wrapper: &mut has_cache_wrapper,
                mapper_calls: &mut mapper_calls,
            };
            walk(&file.parsed, &mut visitor);
        }
        if has_cache_wrapper {
            Vec::new()
        } else {
            mapper_calls
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::helpers::testutil::unit;

    #[tokio::test]
    async fn uncached_mapper_is_flagged() {
        let rule = RestMapperNotCachedRule::new();
        let unit = unit(
            r#"
package main

import "k8s.io/client-go/restmapper"

func setup(dc DiscoveryInterface) {
    m := restmapper.NewDeferredDiscoveryRESTMapper(dc)
    _ = m
}
"#,
        );
        assert_eq!(rule.evaluate(&unit).await.len(), 1);
    }

    #[tokio::test]
    async fn cached_discovery_wrapper_suppresses() {
        let rule = RestMapperNotCachedRule::new();
        let unit = unit(
            r#"
package main

import (
    cached "k8s.io/client-go/discovery/cached"
    "k8s.io/client-go/restmapper"
)

func setup(dc DiscoveryInterface) {
    cdc := cached.NewCachedDiscoveryClient(dc, "", time.Minute)
    m := restmapper.NewDeferredDiscoveryRESTMapper(cdc)
    _ = m
}
"#,
        );
        assert!(rule.evaluate(&unit).await.is_empty());
    }

    #[tokio::test]
    async fn shortcut_expander_suppresses() {
        let rule = RestMapperNotCachedRule::new();
        let unit = unit(
            r#"
package main

import "k8s.io/client-go/restmapper"

func setup(dc DiscoveryInterface) {
    m := restmapper.NewDiscoveryRESTMapper(groups)
    e := restmapper.NewShortcutExpander(m, dc, nil)
    _ = e
}
"#,
        );
        assert!(rule.evaluate(&unit).await.is_empty());
    }
}
