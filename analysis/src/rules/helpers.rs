//! Shared syntactic helpers for the rule catalog: composite-literal field
//! access, literal parsing, receiver-chain inspection and local variable
//! initializer tracking.

use std::collections::HashMap;

use tree_sitter::Node;

use kubeaudit_core::{CallTarget, ParsedFile, UnitFile};

use crate::watchlists::is_resource_selector;

/// Unwrap the `literal_element` wrapper some grammar versions put around
/// composite-literal keys and values.
pub fn unwrap_literal_element(node: Node) -> Node {
    if node.kind() == "literal_element" {
        for i in 0..node.child_count() {
            if let Some(child) = node.child(i) {
                if child.is_named() {
                    return child;
                }
            }
        }
    }
    node
}

/// The `(key, value)` pairs of a composite literal's body.
pub fn keyed_fields<'t>(parsed: &ParsedFile, lit: Node<'t>) -> Vec<(String, Node<'t>)> {
    let mut fields = Vec::new();
    let Some(body) = lit.child_by_field_name("body") else {
        return fields;
    };
    for i in 0..body.child_count() {
        let Some(elem) = body.child(i) else { continue };
        if elem.kind() != "keyed_element" {
            continue;
        }
        let mut named = Vec::new();
        for j in 0..elem.child_count() {
            if let Some(child) = elem.child(j) {
                if child.is_named() {
                    named.push(child);
                }
            }
        }
        if named.len() >= 2 {
            let key = unwrap_literal_element(named[0]);
            let value = unwrap_literal_element(named[named.len() - 1]);
            fields.push((parsed.text_for_node(&key), value));
        }
    }
    fields
}

/// The named argument nodes of a call expression.
pub fn call_args<'t>(call: Node<'t>) -> Vec<Node<'t>> {
    let mut args = Vec::new();
    let Some(list) = call.child_by_field_name("arguments") else {
        return args;
    };
    for i in 0..list.child_count() {
        if let Some(child) = list.child(i) {
            if child.is_named() {
                args.push(child);
            }
        }
    }
    args
}

/// True for a variadic call like `List(ctx, list, opts...)`.
pub fn has_variadic_argument(parsed: &ParsedFile, call: Node) -> bool {
    call.child_by_field_name("arguments")
        .map(|a| parsed.text_for_node(&a).trim_end().ends_with("...)"))
        .unwrap_or(false)
}

/// The identifier node naming the callee (selector field or bare
/// identifier), used to position findings at the method name.
pub fn callee_node<'t>(call: Node<'t>) -> Node<'t> {
    let Some(func) = call.child_by_field_name("function") else {
        return call;
    };
    if func.kind() == "selector_expression" {
        if let Some(field) = func.child_by_field_name("field") {
            return field;
        }
    }
    func
}

/// True for an empty interpreted string literal (`""`).
pub fn is_empty_string(parsed: &ParsedFile, node: Node) -> bool {
    node.kind() == "interpreted_string_literal" && parsed.text_for_node(&node) == "\"\""
}

/// Parse an integer literal, tolerating Go digit separators.
pub fn int_literal_value(parsed: &ParsedFile, node: Node) -> Option<i64> {
    if node.kind() != "int_literal" {
        return None;
    }
    parsed.text_for_node(&node).replace('_', "").parse().ok()
}

/// Parse an int or float literal as f64.
pub fn float_literal_value(parsed: &ParsedFile, node: Node) -> Option<f64> {
    if node.kind() != "int_literal" && node.kind() != "float_literal" {
        return None;
    }
    parsed.text_for_node(&node).replace('_', "").parse().ok()
}

/// True if the literal node is exactly `0`.
pub fn is_zero_literal(parsed: &ParsedFile, node: Node) -> bool {
    node.kind() == "int_literal" && parsed.text_for_node(&node) == "0"
}

/// Walk a selector/call chain looking for a call whose first argument is an
/// empty string literal. Catches typed client patterns like `Pods("").List(...)`.
pub fn chain_has_empty_namespace_arg(parsed: &ParsedFile, expr: Node) -> bool {
    match expr.kind() {
        "call_expression" => {
            if let Some(first) = call_args(expr).first() {
                if is_empty_string(parsed, *first) {
                    return true;
                }
            }
            expr.child_by_field_name("function")
                .is_some_and(|f| chain_has_empty_namespace_arg(parsed, f))
        }
        "selector_expression" => expr
            .child_by_field_name("operand")
            .is_some_and(|op| chain_has_empty_namespace_arg(parsed, op)),
        _ => false,
    }
}

/// Walk a selector/call chain looking for a known typed-client resource
/// selector name (`Pods`, `Deployments`, CRD kinds, ...).
pub fn chain_has_resource_name(parsed: &ParsedFile, expr: Node) -> bool {
    match expr.kind() {
        "selector_expression" => {
            if let Some(field) = expr.child_by_field_name("field") {
                if is_resource_selector(&parsed.text_for_node(&field)) {
                    return true;
                }
            }
            expr.child_by_field_name("operand")
                .is_some_and(|op| chain_has_resource_name(parsed, op))
        }
        "call_expression" => expr
            .child_by_field_name("function")
            .is_some_and(|f| chain_has_resource_name(parsed, f)),
        _ => false,
    }
}

/// True if the argument appears to be a context value or constructor:
/// an identifier named `ctx`/`context`, or `context.Background()/TODO()`.
pub fn looks_like_context(parsed: &ParsedFile, arg: Node) -> bool {
    match arg.kind() {
        "identifier" => {
            let name = parsed.text_for_node(&arg);
            name == "ctx" || name == "context"
        }
        "call_expression" => is_noop_context_call(parsed, arg),
        _ => false,
    }
}

/// True for `context.Background()` or `context.TODO()` call expressions.
///
/// The `context` package is in the standard library, so the syntactic form is
/// unambiguous; the resolver confirms the import when the file declares one.
pub fn is_noop_context_call(parsed: &ParsedFile, node: Node) -> bool {
    if node.kind() != "call_expression" {
        return false;
    }
    let Some(func) = node.child_by_field_name("function") else {
        return false;
    };
    if func.kind() != "selector_expression" {
        return false;
    }
    let (Some(operand), Some(field)) = (
        func.child_by_field_name("operand"),
        func.child_by_field_name("field"),
    ) else {
        return false;
    };
    if operand.kind() != "identifier" || parsed.text_for_node(&operand) != "context" {
        return false;
    }
    matches!(parsed.text_for_node(&field).as_str(), "Background" | "TODO")
}

/// True if any argument is a known list option: an `InNamespace`/
/// `MatchingLabels`/`MatchingFields` call or a literal with selector fields.
pub fn args_contain_kube_options(parsed: &ParsedFile, args: &[Node]) -> bool {
    for arg in args {
        match arg.kind() {
            "call_expression" => {
                let callee = parsed.text_for_node(&callee_node(*arg));
                if matches!(
                    callee.as_str(),
                    "InNamespace" | "MatchingLabels" | "MatchingFields" | "MatchingFieldsSelector"
                ) {
                    return true;
                }
            }
            "composite_literal" => {
                for (key, _) in keyed_fields(parsed, *arg) {
                    if key == "LabelSelector" || key == "FieldSelector" {
                        return true;
                    }
                }
            }
            _ => {}
        }
    }
    false
}

/// True if the subtree contains a call that counts as backoff: `time.Sleep`
/// (resolved or syntactic) or a callee named in `names`.
pub fn subtree_has_backoff_call(file: &UnitFile, root: Node, names: &[&str]) -> bool {
    let mut found = false;
    visit_subtree(root, &mut |node| {
        if found || node.kind() != "call_expression" {
            return;
        }
        let target = file.resolver().resolve_call_target(node);
        match &target {
            CallTarget::Resolved(sym) => {
                if (sym.package == "time" && sym.name == "Sleep") || names.contains(&sym.name.as_str())
                {
                    found = true;
                }
            }
            CallTarget::Method { name } | CallTarget::Local(name) => {
                if names.contains(&name.as_str()) {
                    found = true;
                }
            }
            CallTarget::Unresolved => {}
        }
    });
    found
}

/// True if the subtree mentions HTTP 429: the literal `429` or
/// `http.StatusTooManyRequests`.
pub fn subtree_mentions_throttling(file: &UnitFile, root: Node) -> bool {
    let mut found = false;
    visit_subtree(root, &mut |node| {
        if found {
            return;
        }
        match node.kind() {
            "int_literal" => {
                if file.parsed.text_for_node(&node) == "429" {
                    found = true;
                }
            }
            "selector_expression" => {
                let (Some(operand), Some(field)) = (
                    node.child_by_field_name("operand"),
                    node.child_by_field_name("field"),
                ) else {
                    return;
                };
                if field.kind() == "field_identifier"
                    && file.parsed.text_for_node(&field) == "StatusTooManyRequests"
                    && operand.kind() == "identifier"
                {
                    let qualifier = file.parsed.text_for_node(&operand);
                    // Precise when net/http is imported; syntactic `http.`
                    // qualifier is the documented fallback.
                    match file.imports.qualifier_path(&qualifier) {
                        Some(path) => {
                            if path == "net/http" {
                                found = true;
                            }
                        }
                        None => {
                            if qualifier == "http" {
                                found = true;
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    });
    found
}

/// True if the subtree mentions any of the given identifiers.
pub fn subtree_mentions_ident(parsed: &ParsedFile, root: Node, idents: &[&str]) -> bool {
    let mut found = false;
    visit_subtree(root, &mut |node| {
        if found {
            return;
        }
        if node.kind() == "identifier" || node.kind() == "field_identifier" {
            if idents.contains(&parsed.text_for_node(&node).as_str()) {
                found = true;
            }
        }
    });
    found
}

/// Apply `f` to every node in the subtree, depth first.
pub fn visit_subtree<'t>(node: Node<'t>, f: &mut dyn FnMut(Node<'t>)) {
    f(node);
    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            visit_subtree(child, f);
        }
    }
}

/// Tracks local variable initializers in document order within one function.
///
/// Lookups see the last assignment recorded before the use site, which is the
/// single-function, last-assignment resolution the engine is limited to.
#[derive(Default)]
pub struct VarInits<'t> {
    inits: HashMap<String, Node<'t>>,
}

impl<'t> VarInits<'t> {
    pub fn clear(&mut self) {
        self.inits.clear();
    }

    /// Record initializers from `:=`, `=` and `var` statements.
    pub fn record(&mut self, parsed: &ParsedFile, node: Node<'t>) {
        match node.kind() {
            "short_var_declaration" | "assignment_statement" => {
                let (Some(left), Some(right)) = (
                    node.child_by_field_name("left"),
                    node.child_by_field_name("right"),
                ) else {
                    return;
                };
                let names = expression_list(left);
                let values = expression_list(right);
                for (name_node, value) in names.iter().zip(values.iter()) {
                    if name_node.kind() == "identifier" {
                        self.inits.insert(parsed.text_for_node(name_node), *value);
                    }
                }
            }
            "var_declaration" => {
                for i in 0..node.child_count() {
                    let Some(spec) = node.child(i) else { continue };
                    if spec.kind() != "var_spec" {
                        continue;
                    }
                    let mut names = Vec::new();
                    let mut values = Vec::new();
                    for j in 0..spec.child_count() {
                        if let Some(child) = spec.child(j) {
                            match child.kind() {
                                "identifier" => names.push(child),
                                "expression_list" => values = expression_list(child),
                                _ => {}
                            }
                        }
                    }
                    for (name_node, value) in names.iter().zip(values.iter()) {
                        self.inits.insert(parsed.text_for_node(name_node), *value);
                    }
                }
            }
            _ => {}
        }
    }

    /// Resolve an expression back to its defining expression: identifiers go
    /// through the init map, and one level of address-of is unwrapped.
    pub fn resolve(&self, parsed: &ParsedFile, expr: Node<'t>) -> Node<'t> {
        let mut current = unwrap_address_of(expr);
        if current.kind() == "identifier" {
            if let Some(init) = self.inits.get(&parsed.text_for_node(&current)) {
                current = unwrap_address_of(*init);
            }
        }
        current
    }

    pub fn lookup(&self, name: &str) -> Option<Node<'t>> {
        self.inits.get(name).copied()
    }
}

/// The named expressions of an `expression_list`, or the node itself.
pub fn expression_list(node: Node) -> Vec<Node> {
    if node.kind() != "expression_list" {
        return vec![node];
    }
    let mut out = Vec::new();
    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            if child.is_named() {
                out.push(child);
            }
        }
    }
    out
}

/// Unwrap a single `&expr` level.
pub fn unwrap_address_of(node: Node) -> Node {
    if node.kind() == "unary_expression" {
        let is_addr = node
            .child_by_field_name("operator")
            .map(|op| op.kind() == "&")
            .unwrap_or(false);
        if is_addr {
            if let Some(operand) = node.child_by_field_name("operand") {
                return operand;
            }
        }
    }
    node
}


#[cfg(test)]
mod tests {
    use super::*;
    use kubeaudit_core::{unit_from_sources, SourceFile, UnitFile};

    fn file(code: &str) -> UnitFile {
        let mut unit = unit_from_sources(&[SourceFile::new("test.go", code)]).unwrap();
        unit.files.remove(0)
    }

    fn find_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
        if node.kind() == kind {
            return Some(node);
        }
        for i in 0..node.child_count() {
            if let Some(found) = node.child(i).and_then(|c| find_kind(c, kind)) {
                return Some(found);
            }
        }
        None
    }

    #[test]
    fn keyed_fields_reads_composite_literal() {
        let f = file("package p\n\nvar o = Options{Limit: 500, Continue: tok}\n");
        let lit = find_kind(f.root(), "composite_literal").unwrap();
        let fields = keyed_fields(&f.parsed, lit);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].0, "Limit");
        assert_eq!(f.parsed.text_for_node(&fields[0].1), "500");
        assert_eq!(fields[1].0, "Continue");
    }

    #[test]
    fn chain_detects_empty_namespace_arg() {
        let f = file("package p\n\nfunc f() { c.CoreV1().Pods(\"\").List(ctx, opts) }\n");
        let call = find_kind(f.root(), "call_expression").unwrap();
        let recv = f.resolver().call_receiver(call).unwrap();
        assert!(chain_has_empty_namespace_arg(&f.parsed, recv));
        assert!(chain_has_resource_name(&f.parsed, recv));
    }

    #[test]
    fn chain_without_empty_arg_is_clean() {
        let f = file("package p\n\nfunc f() { c.CoreV1().Pods(\"prod\").List(ctx, opts) }\n");
        let call = find_kind(f.root(), "call_expression").unwrap();
        let recv = f.resolver().call_receiver(call).unwrap();
        assert!(!chain_has_empty_namespace_arg(&f.parsed, recv));
        assert!(chain_has_resource_name(&f.parsed, recv));
    }

    #[test]
    fn noop_context_detection() {
        let f = file("package p\n\nimport \"context\"\n\nfunc f() { g(context.Background()) }\n");
        let outer = find_kind(f.root(), "call_expression").unwrap();
        let arg = call_args(outer)[0];
        assert!(is_noop_context_call(&f.parsed, arg));
        assert!(looks_like_context(&f.parsed, arg));
    }

    #[test]
    fn plain_ctx_is_not_noop() {
        let f = file("package p\n\nfunc f() { g(ctx) }\n");
        let outer = find_kind(f.root(), "call_expression").unwrap();
        let arg = call_args(outer)[0];
        assert!(!is_noop_context_call(&f.parsed, arg));
        assert!(looks_like_context(&f.parsed, arg));
    }

    #[test]
    fn var_inits_resolve_through_address_of() {
        let f = file(
            r#"
package p

func f() {
    opts := ListOptions{Limit: 10}
    use(&opts)
}
"#,
        );
        let mut inits = VarInits::default();
        visit_subtree(f.root(), &mut |n| inits.record(&f.parsed, n));

        let use_call = {
            let mut found = None;
            visit_subtree(f.root(), &mut |n| {
                if n.kind() == "call_expression"
                    && f.parsed.text_for_node(&callee_node(n)) == "use"
                {
                    found = Some(n);
                }
            });
            found.unwrap()
        };
        let arg = call_args(use_call)[0];
        let resolved = inits.resolve(&f.parsed, arg);
        assert_eq!(resolved.kind(), "composite_literal");
    }

    #[test]
    fn var_inits_last_assignment_wins() {
        let f = file(
            r#"
package p

func f() {
    x := first()
    x = second()
}
"#,
        );
        let mut inits = VarInits::default();
        visit_subtree(f.root(), &mut |n| inits.record(&f.parsed, n));
        let init = inits.lookup("x").unwrap();
        assert!(f.parsed.text_for_node(&init).contains("second"));
    }

    #[test]
    fn backoff_detected_in_branch() {
        let f = file(
            r#"
package p

import "time"

func f() {
    if throttled {
        time.Sleep(time.Second)
    }
}
"#,
        );
        let body = find_kind(f.root(), "block").unwrap();
        assert!(subtree_has_backoff_call(&f, body, &["Backoff", "Wait"]));
    }

    #[test]
    fn throttling_mentions() {
        let f = file(
            r#"
package p

import "net/http"

func f(code int) {
    if code == http.StatusTooManyRequests {
        retry()
    }
}
"#,
        );
        let cond = find_kind(f.root(), "binary_expression").unwrap();
        assert!(subtree_mentions_throttling(&f, cond));
    }

    #[test]
    fn throttling_literal_429() {
        let f = file("package p\n\nfunc f(code int) { if code == 429 { retry() } }\n");
        let cond = find_kind(f.root(), "binary_expression").unwrap();
        assert!(subtree_mentions_throttling(&f, cond));
    }

    #[test]
    fn variadic_argument_detection() {
        let f = file("package p\n\nfunc f() { c.List(ctx, list, opts...) }\n");
        let call = find_kind(f.root(), "call_expression").unwrap();
        assert!(has_variadic_argument(&f.parsed, call));
    }
}
