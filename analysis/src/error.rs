use thiserror::Error;

/// Top-level error type exposed by the engine to CLI callers.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("load error: {0}")]
    Load(#[from] kubeaudit_core::LoadError),

    #[error("rule evaluation error: {0}")]
    Rule(#[from] RuleError),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// A rule that failed while evaluating one unit.
///
/// These never abort a run; the failing rule's results for that unit are
/// discarded and everything else proceeds.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("rule {rule_id} panicked while evaluating {unit}")]
    Panicked { rule_id: String, unit: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = EngineError::Config("no rules selected".to_string());
        assert_eq!(err.to_string(), "configuration error: no rules selected");
    }

    #[test]
    fn rule_error_display() {
        let err = RuleError::Panicked {
            rule_id: "K8S001".to_string(),
            unit: "pkg/controllers".to_string(),
        };
        assert!(err.to_string().contains("K8S001"));
        assert!(err.to_string().contains("pkg/controllers"));
    }

    #[test]
    fn engine_error_from_rule_error() {
        let err: EngineError = RuleError::Panicked {
            rule_id: "K8S002".to_string(),
            unit: "p".to_string(),
        }
        .into();
        assert!(err.to_string().contains("rule evaluation error"));
    }
}
