use tree_sitter::Node;

use crate::parse::ast::ParsedFile;

/// The function or method declaration currently enclosing the traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionRef {
    pub name: String,
    /// Receiver type for methods, e.g. "PodReconciler" for `(r *PodReconciler)`.
    pub receiver: Option<String>,
    /// Declared parameter types, one entry per parameter name.
    pub param_types: Vec<String>,
    /// Declared result types.
    pub result_types: Vec<String>,
}

impl FunctionRef {
    /// Build from a `function_declaration` or `method_declaration` node.
    pub fn from_node(parsed: &ParsedFile, node: Node) -> Option<Self> {
        let name = parsed.text_for_node(&node.child_by_field_name("name")?);

        let receiver = node
            .child_by_field_name("receiver")
            .map(|r| receiver_type_name(parsed, &r));

        let param_types = node
            .child_by_field_name("parameters")
            .map(|p| param_type_list(parsed, &p))
            .unwrap_or_default();

        let result_types = node
            .child_by_field_name("result")
            .map(|r| result_type_list(parsed, &r))
            .unwrap_or_default();

        Some(Self {
            name,
            receiver,
            param_types,
            result_types,
        })
    }
}

/// Shared traversal state visible to every visitor in a pass.
///
/// The walker owns all transitions: entering a function/method declaration
/// replaces `enclosing_function`, entering a `for_statement` increments
/// `loop_depth`, and both revert on exit no matter what the visitor does
/// (including `SkipChildren`). Individual rules never touch this state.
#[derive(Debug, Clone, Default)]
pub struct ScopeFrame {
    pub enclosing_function: Option<FunctionRef>,
    pub loop_depth: u32,
}

/// Visitor control flow for `enter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    SkipChildren,
}

/// Enter/leave callbacks over a depth-first walk.
pub trait Visitor<'t> {
    fn enter(&mut self, _node: Node<'t>, _scope: &ScopeFrame) -> Flow {
        Flow::Continue
    }
    fn leave(&mut self, _node: Node<'t>, _scope: &ScopeFrame) {}
}

/// Depth-first walk over a parsed file, maintaining the `ScopeFrame`.
///
/// Range loops are `for_statement` nodes in the Go grammar (the
/// `range_clause` sits inside them), so each loop counts exactly once.
pub fn walk<'t>(parsed: &'t ParsedFile, visitor: &mut dyn Visitor<'t>) {
    let mut scope = ScopeFrame::default();
    walk_node(parsed.root(), parsed, visitor, &mut scope);
}

fn walk_node<'t>(
    node: Node<'t>,
    parsed: &'t ParsedFile,
    visitor: &mut dyn Visitor<'t>,
    scope: &mut ScopeFrame,
) {
    let is_loop = node.kind() == "for_statement";
    let entered_function = match node.kind() {
        "function_declaration" | "method_declaration" => FunctionRef::from_node(parsed, node),
        _ => None,
    };

    if is_loop {
        scope.loop_depth += 1;
    }
    let saved_function = entered_function
        .map(|f| std::mem::replace(&mut scope.enclosing_function, Some(f)));

    if visitor.enter(node, scope) == Flow::Continue {
        for i in 0..node.child_count() {
            if let Some(child) = node.child(i) {
                walk_node(child, parsed, visitor, scope);
            }
        }
    }
    visitor.leave(node, scope);

    if let Some(previous) = saved_function {
        scope.enclosing_function = previous;
    }
    if is_loop {
        scope.loop_depth -= 1;
    }
}

fn receiver_type_name(parsed: &ParsedFile, receiver: &Node) -> String {
    let text = parsed.text_for_node(receiver);
    let trimmed = text.trim_matches(|c| c == '(' || c == ')' || c == ' ');
    let after_star = match trimmed.find('*') {
        Some(pos) => trimmed[pos + 1..].trim(),
        None => trimmed,
    };
    after_star
        .split_whitespace()
        .last()
        .unwrap_or_default()
        .to_string()
}

const TYPE_KINDS: &[&str] = &[
    "type_identifier",
    "qualified_type",
    "pointer_type",
    "slice_type",
    "array_type",
    "map_type",
    "channel_type",
    "function_type",
    "interface_type",
    "struct_type",
];

fn param_type_list(parsed: &ParsedFile, params: &Node) -> Vec<String> {
    let mut types = Vec::new();
    for i in 0..params.child_count() {
        if let Some(decl) = params.child(i) {
            if decl.kind() != "parameter_declaration"
                && decl.kind() != "variadic_parameter_declaration"
            {
                continue;
            }
            let mut names = 0usize;
            let mut ty = String::new();
            for j in 0..decl.child_count() {
                if let Some(child) = decl.child(j) {
                    if child.kind() == "identifier" {
                        names += 1;
                    } else if TYPE_KINDS.contains(&child.kind()) {
                        ty = parsed.text_for_node(&child);
                    }
                }
            }
            for _ in 0..names.max(1) {
                types.push(ty.clone());
            }
        }
    }
    types
}

fn result_type_list(parsed: &ParsedFile, result: &Node) -> Vec<String> {
    let mut types = Vec::new();
    if result.kind() == "parameter_list" {
        for i in 0..result.child_count() {
            if let Some(decl) = result.child(i) {
                if decl.kind() != "parameter_declaration" {
                    continue;
                }
                for j in 0..decl.child_count() {
                    if let Some(child) = decl.child(j) {
                        if TYPE_KINDS.contains(&child.kind()) {
                            types.push(parsed.text_for_node(&child));
                        }
                    }
                }
            }
        }
    } else if TYPE_KINDS.contains(&result.kind()) {
        types.push(parsed.text_for_node(result));
    }
    types
}
