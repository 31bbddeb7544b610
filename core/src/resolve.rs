use serde::{Deserialize, Serialize};
use tree_sitter::Node;

use crate::parse::ast::ParsedFile;
use crate::unit::ImportTable;

/// A resolved symbol: the import path of its declaring package plus its name.
///
/// Equality is structural; watch-list membership tests compare both fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualifiedSymbol {
    pub package: String,
    pub name: String,
}

/// A resolved type identity, analogous to `QualifiedSymbol`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualifiedType {
    pub package: String,
    pub name: String,
}

/// Outcome of resolving a call expression's target.
///
/// `Resolved` is the precise tier: the callee is `qualifier.Name(...)` and the
/// qualifier maps through the file's import table. `Method` and `Local` carry
/// only a name and are usable by rules that declare name-tier support.
/// `Unresolved` is never matched against anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallTarget {
    Resolved(QualifiedSymbol),
    /// A method call on an arbitrary receiver expression: `expr.Name(...)`.
    Method { name: String },
    /// A bare identifier call: `Name(...)`.
    Local(String),
    Unresolved,
}

impl CallTarget {
    /// The bare callee name, regardless of tier. `None` for `Unresolved`.
    pub fn name(&self) -> Option<&str> {
        match self {
            CallTarget::Resolved(sym) => Some(&sym.name),
            CallTarget::Method { name } => Some(name),
            CallTarget::Local(name) => Some(name),
            CallTarget::Unresolved => None,
        }
    }

    /// The declaring package path when precisely resolved.
    pub fn package(&self) -> Option<&str> {
        match self {
            CallTarget::Resolved(sym) => Some(&sym.package),
            _ => None,
        }
    }
}

/// Outcome of resolving the type of a composite literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeTarget {
    Resolved(QualifiedType),
    /// Syntactic name only: `qualifier.Name{}` with an unknown qualifier, or
    /// a bare `Name{}`.
    Named {
        qualifier: Option<String>,
        name: String,
    },
    Unknown,
}

impl TypeTarget {
    pub fn name(&self) -> Option<&str> {
        match self {
            TypeTarget::Resolved(t) => Some(&t.name),
            TypeTarget::Named { name, .. } => Some(name),
            TypeTarget::Unknown => None,
        }
    }
}

/// Symbol and type resolver for one file.
///
/// Two tiers coexist by design: the precise, import-resolved tier (preferred)
/// and the syntactic name-only tier used as a documented fallback when a
/// receiver is an arbitrary expression. Ambiguity (dot imports, exotic callee
/// shapes) resolves to `Unresolved`, never to a guess.
pub struct Resolver<'a> {
    parsed: &'a ParsedFile,
    imports: &'a ImportTable,
}

impl<'a> Resolver<'a> {
    pub fn new(parsed: &'a ParsedFile, imports: &'a ImportTable) -> Self {
        Self { parsed, imports }
    }

    /// Resolve the target of a `call_expression` node.
    pub fn resolve_call_target(&self, call: Node<'a>) -> CallTarget {
        let Some(func) = call.child_by_field_name("function") else {
            return CallTarget::Unresolved;
        };
        match func.kind() {
            "identifier" => {
                // A dot import could have brought this name in from anywhere;
                // refuse to guess.
                if self.imports.has_dot_import() {
                    CallTarget::Unresolved
                } else {
                    CallTarget::Local(self.parsed.text_for_node(&func))
                }
            }
            "selector_expression" => {
                let (Some(operand), Some(field)) = (
                    func.child_by_field_name("operand"),
                    func.child_by_field_name("field"),
                ) else {
                    return CallTarget::Unresolved;
                };
                let name = self.parsed.text_for_node(&field);
                if operand.kind() == "identifier" {
                    let qualifier = self.parsed.text_for_node(&operand);
                    if let Some(path) = self.imports.qualifier_path(&qualifier) {
                        return CallTarget::Resolved(QualifiedSymbol {
                            package: path.to_string(),
                            name,
                        });
                    }
                }
                CallTarget::Method { name }
            }
            _ => CallTarget::Unresolved,
        }
    }

    /// The receiver expression of a method call, for chain inspection.
    pub fn call_receiver(&self, call: Node<'a>) -> Option<Node<'a>> {
        let func = call.child_by_field_name("function")?;
        if func.kind() == "selector_expression" {
            func.child_by_field_name("operand")
        } else {
            None
        }
    }

    /// Resolve the declared type of a `composite_literal` node.
    pub fn resolve_literal_type(&self, lit: Node<'a>) -> TypeTarget {
        let Some(ty) = lit.child_by_field_name("type") else {
            return TypeTarget::Unknown;
        };
        match ty.kind() {
            "qualified_type" => {
                let (Some(pkg), Some(name)) = (
                    ty.child_by_field_name("package"),
                    ty.child_by_field_name("name"),
                ) else {
                    return TypeTarget::Unknown;
                };
                let qualifier = self.parsed.text_for_node(&pkg);
                let name = self.parsed.text_for_node(&name);
                match self.imports.qualifier_path(&qualifier) {
                    Some(path) => TypeTarget::Resolved(QualifiedType {
                        package: path.to_string(),
                        name,
                    }),
                    None => TypeTarget::Named {
                        qualifier: Some(qualifier),
                        name,
                    },
                }
            }
            "type_identifier" => TypeTarget::Named {
                qualifier: None,
                name: self.parsed.text_for_node(&ty),
            },
            _ => TypeTarget::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::ast::FileId;
    use crate::parse::go::parse_go_file;
    use crate::types::SourceFile;
    use crate::unit::UnitFile;

    fn unit_file(code: &str) -> UnitFile {
        let sf = SourceFile::new("test.go", code);
        UnitFile::new(parse_go_file(FileId(1), &sf).unwrap())
    }

    fn first_node_of_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
        if node.kind() == kind {
            return Some(node);
        }
        for i in 0..node.child_count() {
            if let Some(found) = node.child(i).and_then(|c| first_node_of_kind(c, kind)) {
                return Some(found);
            }
        }
        None
    }

    #[test]
    fn resolves_imported_package_call() {
        let f = unit_file(
            r#"
package main

import "k8s.io/client-go/kubernetes"

func main() {
    kubernetes.NewForConfig(nil)
}
"#,
        );
        let call = first_node_of_kind(f.root(), "call_expression").unwrap();
        let target = f.resolver().resolve_call_target(call);
        assert_eq!(
            target,
            CallTarget::Resolved(QualifiedSymbol {
                package: "k8s.io/client-go/kubernetes".to_string(),
                name: "NewForConfig".to_string(),
            })
        );
    }

    #[test]
    fn alias_resolves_to_real_path() {
        let f = unit_file(
            r#"
package main

import cs "k8s.io/client-go/kubernetes"

func main() {
    cs.NewForConfig(nil)
}
"#,
        );
        let call = first_node_of_kind(f.root(), "call_expression").unwrap();
        let target = f.resolver().resolve_call_target(call);
        assert_eq!(
            target.package(),
            Some("k8s.io/client-go/kubernetes"),
            "alias must resolve to the declaring path"
        );
    }

    #[test]
    fn method_on_variable_is_name_tier() {
        let f = unit_file(
            r#"
package main

func main() {
    client.List(nil)
}
"#,
        );
        let call = first_node_of_kind(f.root(), "call_expression").unwrap();
        let target = f.resolver().resolve_call_target(call);
        assert_eq!(
            target,
            CallTarget::Method {
                name: "List".to_string()
            }
        );
        assert!(target.package().is_none());
    }

    #[test]
    fn bare_identifier_is_local() {
        let f = unit_file("package main\n\nfunc main() { helper() }\n");
        let call = first_node_of_kind(f.root(), "call_expression").unwrap();
        assert_eq!(
            f.resolver().resolve_call_target(call),
            CallTarget::Local("helper".to_string())
        );
    }

    #[test]
    fn dot_import_makes_bare_calls_unresolved() {
        let f = unit_file(
            r#"
package main

import . "fmt"

func main() { Println() }
"#,
        );
        let call = first_node_of_kind(f.root(), "call_expression").unwrap();
        assert_eq!(f.resolver().resolve_call_target(call), CallTarget::Unresolved);
    }

    #[test]
    fn resolves_qualified_literal_type() {
        let f = unit_file(
            r#"
package main

import "k8s.io/client-go/rest"

var cfg = rest.Config{}
"#,
        );
        let lit = first_node_of_kind(f.root(), "composite_literal").unwrap();
        let target = f.resolver().resolve_literal_type(lit);
        assert_eq!(
            target,
            TypeTarget::Resolved(QualifiedType {
                package: "k8s.io/client-go/rest".to_string(),
                name: "Config".to_string(),
            })
        );
    }

    #[test]
    fn unknown_qualifier_stays_name_tier() {
        let f = unit_file("package main\n\nvar c = http.Client{}\n");
        let lit = first_node_of_kind(f.root(), "composite_literal").unwrap();
        let target = f.resolver().resolve_literal_type(lit);
        assert_eq!(
            target,
            TypeTarget::Named {
                qualifier: Some("http".to_string()),
                name: "Client".to_string(),
            }
        );
    }

    #[test]
    fn bare_literal_type_is_named() {
        let f = unit_file("package main\n\ntype Options struct{}\n\nvar o = Options{}\n");
        let lit = first_node_of_kind(f.root(), "composite_literal").unwrap();
        assert_eq!(
            f.resolver().resolve_literal_type(lit),
            TypeTarget::Named {
                qualifier: None,
                name: "Options".to_string(),
            }
        );
    }

    #[test]
    fn call_receiver_returns_chain_root() {
        let f = unit_file("package main\n\nfunc main() { c.Pods(\"\").List(ctx) }\n");
        let call = first_node_of_kind(f.root(), "call_expression").unwrap();
        let recv = f.resolver().call_receiver(call).unwrap();
        assert_eq!(recv.kind(), "call_expression");
    }
}
