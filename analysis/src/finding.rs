use serde::{Deserialize, Serialize};
use tree_sitter::Node;

use kubeaudit_core::ParsedFile;

/// A positioned message produced by one rule on one unit (engine-internal).
///
/// Rule identity, title and suggestion are attached by the runner from the
/// rule's own metadata when this is converted into a `Finding`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleFinding {
    pub message: String,
    pub file: String,
    /// 1-based line.
    pub line: u32,
    /// 1-based column.
    pub column: u32,
}

impl RuleFinding {
    /// Position a finding at the start of a node.
    pub fn at(parsed: &ParsedFile, node: &Node, message: impl Into<String>) -> Self {
        let loc = parsed.location_for_node(node);
        Self {
            message: message.into(),
            file: parsed.path.clone(),
            line: loc.range.start_line + 1,
            column: loc.range.start_col + 1,
        }
    }
}

/// One reported rule violation, as handed to callers and reporters.
///
/// Immutable once emitted; carries no reference back to the unit it came
/// from. `rule_id` values are a compatibility contract for downstream tooling
/// that filters or suppresses by ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub rule_id: String,
    pub title: String,
    pub message: String,
    pub suggestion: String,
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl Finding {
    pub fn from_rule(
        rule_id: &str,
        title: &str,
        suggestion: &str,
        rf: RuleFinding,
    ) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            title: title.to_string(),
            message: rf.message,
            suggestion: suggestion.to_string(),
            file: rf.file,
            line: rf.line,
            column: rf.column,
        }
    }
}
