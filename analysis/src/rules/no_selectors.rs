//! K8S021: flags List calls without label/field selectors.
//!
//! Unselective lists transfer whole collections. The check resolves local
//! variable initializers back to their last same-function assignment and
//! unwraps one level of address-of, so `opts := metav1.ListOptions{...};
//! c.List(ctx, &opts)` is inspected like an inline literal. Unknown option
//! identifiers are conservatively assumed to carry selectors.

use async_trait::async_trait;
use tree_sitter::Node;

use kubeaudit_core::{walk, CallTarget, Flow, ParsedFile, ScopeFrame, SemanticUnit, UnitFile, Visitor};

use crate::finding::RuleFinding;
use crate::rules::helpers::{
    call_args, callee_node, has_variadic_argument, keyed_fields, unwrap_address_of, VarInits,
};
use crate::rules::Rule;

#[derive(Debug, Default)]
pub struct NoSelectorsRule;

impl NoSelectorsRule {
    pub fn new() -> Self {
        Self
    }
}

fn literal_type_name(parsed: &ParsedFile, lit: Node) -> Option<String> {
    let ty = lit.child_by_field_name("type")?;
    match ty.kind() {
        "type_identifier" => Some(parsed.text_for_node(&ty)),
        "qualified_type" => ty
            .child_by_field_name("name")
            .map(|n| parsed.text_for_node(&n)),
        _ => None,
    }
}

/// Whether a ListOptions literal sets LabelSelector / FieldSelector.
fn selector_fields(parsed: &ParsedFile, lit: Node) -> (bool, bool) {
    let mut has_label = false;
    let mut has_field = false;
    for (key, _) in keyed_fields(parsed, lit) {
        match key.as_str() {
            "LabelSelector" => has_label = true,
            "FieldSelector" => has_field = true,
            _ => {}
        }
    }
    (has_label, has_field)
}

struct SelectorVisitor<'t, 'a> {
    file: &'t UnitFile,
    inits: VarInits<'t>,
    findings: &'a mut Vec<RuleFinding>,
}

impl<'t, 'a> SelectorVisitor<'t, 'a> {
    fn classify_option_arg(&self, arg: Node<'t>, has_label: &mut bool, has_field: &mut bool, has_opts: &mut bool) {
        let parsed = &self.file.parsed;
        match arg.kind() {
            "call_expression" => {
                let name = parsed.text_for_node(&callee_node(arg));
                match name.as_str() {
                    "MatchingLabels" | "MatchingLabelsSelector" => *has_label = true,
                    "MatchingFields" | "MatchingFieldsSelector" => *has_field = true,
                    "ListOption" => *has_opts = true,
                    _ => {}
                }
            }
            "identifier" => match self.inits.lookup(&parsed.text_for_node(&arg)) {
                Some(init) => {
                    let init = unwrap_address_of(init);
                    if init.kind() == "composite_literal" {
                        self.classify_option_literal(init, has_label, has_field);
                    }
                }
                // Unknown identifier: assume it carries options rather than
                // report a likely false positive.
                None => *has_opts = true,
            },
            "composite_literal" => self.classify_option_literal(arg, has_label, has_field),
            "unary_expression" => {
                let inner = unwrap_address_of(arg);
                if inner.id() != arg.id() {
                    self.classify_option_arg(inner, has_label, has_field, has_opts);
                }
            }
            _ => {}
        }
    }

    fn classify_option_literal(&self, lit: Node<'t>, has_label: &mut bool, has_field: &mut bool) {
        let parsed = &self.file.parsed;
        match literal_type_name(parsed, lit).as_deref() {
            Some("ListOptions") => {
                let (label, field) = selector_fields(parsed, lit);
                *has_label |= label;
                *has_field |= field;
            }
            Some("MatchingLabels") => *has_label = true,
            Some("MatchingFields") => *has_field = true,
            _ => {}
        }
    }

    fn check_list_call(&mut self, call: Node<'t>) {
        let parsed = &self.file.parsed;
        let target = self.file.resolver().resolve_call_target(call);
        if !matches!(&target, CallTarget::Method { name } if name == "List") {
            return;
        }
        let args = call_args(call);

        if args.len() == 2 {
            // Typed client-go style: List(ctx, metav1.ListOptions{...}),
            // with options variables resolved back to their initializer.
            let options = self.inits.resolve(parsed, args[1]);
            if options.kind() == "composite_literal"
                && literal_type_name(parsed, options).as_deref() == Some("ListOptions")
            {
                let (has_label, has_field) = selector_fields(parsed, options);
                if !(has_label || has_field) {
                    self.findings.push(RuleFinding::at(
                        parsed,
                        &callee_node(call),
                        "ListOptions without LabelSelector/FieldSelector; add selectors to reduce load",
                    ));
                }
            } else {
                // Two-arg controller-runtime style with no options at all.
                self.findings.push(RuleFinding::at(
                    parsed,
                    &callee_node(call),
                    "List without options; provide MatchingLabels/Fields or scope namespace",
                ));
            }
            return;
        }

        if args.len() >= 3 {
            // Options forwarded as a variadic slice: skip to avoid false
            // positives.
            if has_variadic_argument(parsed, call)
                && args.last().is_some_and(|a| a.kind() == "identifier")
            {
                return;
            }
            let mut has_label = false;
            let mut has_field = false;
            let mut has_opts = false;
            for arg in &args[2..] {
                self.classify_option_arg(*arg, &mut has_label, &mut has_field, &mut has_opts);
            }
            if !(has_label || has_field || has_opts) {
                self.findings.push(RuleFinding::at(
                    parsed,
                    &callee_node(call),
                    "List without label/field selectors; add MatchingLabels/Fields or set ListOptions selectors",
                ));
            }
        }
    }
}

impl<'t> Visitor<'t> for SelectorVisitor<'t, '_> {
    fn enter(&mut self, node: Node<'t>, _scope: &ScopeFrame) -> Flow {
        match node.kind() {
            "function_declaration" | "method_declaration" => self.inits.clear(),
            "short_var_declaration" | "assignment_statement" | "var_declaration" => {
                self.inits.record(&self.file.parsed, node)
            }
            "call_expression" => self.check_list_call(node),
            _ => {}
        }
        Flow::Continue
    }
}

#[async_trait]
impl Rule for NoSelectorsRule {
    fn id(&self) -> &'static str {
        "K8S021"
    }

    fn title(&self) -> &'static str {
        "List without label/field selectors"
    }

    fn suggestion(&self) -> &'static str {
        "Use MatchingLabels/Fields or ListOptions selectors"
    }

    async fn evaluate(&self, unit: &SemanticUnit) -> Vec<RuleFinding> {
        let mut findings = Vec::new();
        for file in &unit.files {
            let mut visitor = SelectorVisitor {
                file,
                inits: VarInits::default(),
                findings: &mut findings,
            };
            walk(&file.parsed, &mut visitor);
        }
        findings
    }
}
