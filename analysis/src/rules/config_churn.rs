//! K8S003: flags rest.Config loaders called inside loops or hot paths.
//!
//! `InClusterConfig`, `BuildConfigFromFlags` and friends read kubeconfig or
//! service-account material from disk on every call.

use async_trait::async_trait;

use kubeaudit_core::SemanticUnit;

use crate::finding::RuleFinding;
use crate::rules::templates::flag_constructions;
use crate::rules::Rule;
use crate::watchlists::{ResolutionTier, CONFIG_LOADERS};

#[derive(Debug, Default)]
pub struct ConfigChurnRule;

impl ConfigChurnRule {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Rule for ConfigChurnRule {
    fn id(&self) -> &'static str {
        "K8S003"
    }

    fn title(&self) -> &'static str {
        "Repeated rest.Config construction"
    }

    fn suggestion(&self) -> &'static str {
        "Load the config once at startup and share it"
    }

    async fn evaluate(&self, unit: &SemanticUnit) -> Vec<RuleFinding> {
        flag_constructions(
            unit,
            &CONFIG_LOADERS,
            ResolutionTier::PreciseOrName,
            "rest.Config loaded inside loop; load once and reuse",
            "rest.Config loaded in hot path; load once and reuse",
        )
    }
}
