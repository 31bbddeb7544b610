use std::sync::Arc;

use anyhow::Result;
use tree_sitter::{Language as TsLanguage, Parser};

use crate::parse::ast::{FileId, ParsedFile};
use crate::types::SourceFile;

fn go_language() -> TsLanguage {
    tree_sitter_go::LANGUAGE.into()
}

/// Parse a Go source file into a `ParsedFile`.
///
/// tree-sitter is error tolerant: syntactically broken input still yields a
/// tree (with error nodes), so the only hard failures here are parser setup
/// problems.
pub fn parse_go_file(file_id: FileId, sf: &SourceFile) -> Result<ParsedFile> {
    let mut parser = Parser::new();
    parser.set_language(&go_language())?;

    let source = Arc::new(sf.content.clone());
    let tree = parser
        .parse(&*source, None)
        .ok_or_else(|| anyhow::anyhow!("failed to parse Go source"))?;

    Ok(ParsedFile {
        file_id,
        path: sf.path.clone(),
        source,
        tree,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make(path: &str, content: &str) -> SourceFile {
        SourceFile::new(path, content)
    }

    #[test]
    fn go_language_is_valid() {
        assert!(go_language().abi_version() > 0);
    }

    #[test]
    fn parse_simple_package() {
        let parsed = parse_go_file(FileId(1), &make("test.go", "package main")).unwrap();
        assert_eq!(parsed.root().kind(), "source_file");
        assert!(!parsed.root().has_error());
    }

    #[test]
    fn parse_function_declarations() {
        let code = r#"
package main

func add(a, b int) int {
    return a + b
}

func sub(a, b int) int {
    return a - b
}
"#;
        let parsed = parse_go_file(FileId(2), &make("func.go", code)).unwrap();
        let root = parsed.root();
        let mut count = 0;
        for i in 0..root.child_count() {
            if root.child(i).unwrap().kind() == "function_declaration" {
                count += 1;
            }
        }
        assert_eq!(count, 2);
    }

    #[test]
    fn parse_imports() {
        let code = r#"
package main

import (
    "context"
    "k8s.io/client-go/kubernetes"
)
"#;
        let parsed = parse_go_file(FileId(3), &make("imports.go", code)).unwrap();
        let root = parsed.root();
        let mut saw_import = false;
        for i in 0..root.child_count() {
            if root.child(i).unwrap().kind() == "import_declaration" {
                saw_import = true;
            }
        }
        assert!(saw_import);
        assert!(!root.has_error());
    }

    #[test]
    fn parse_method_declarations() {
        let code = r#"
package main

type Reconciler struct{}

func (r *Reconciler) Reconcile() error {
    return nil
}
"#;
        let parsed = parse_go_file(FileId(4), &make("method.go", code)).unwrap();
        let root = parsed.root();
        let mut saw_method = false;
        for i in 0..root.child_count() {
            if root.child(i).unwrap().kind() == "method_declaration" {
                saw_method = true;
            }
        }
        assert!(saw_method);
    }

    #[test]
    fn parse_is_error_tolerant() {
        let parsed = parse_go_file(FileId(5), &make("broken.go", "package main\nfunc broken(\n")).unwrap();
        assert!(parsed.root().has_error());
    }

    #[test]
    fn parse_empty_file() {
        let parsed = parse_go_file(FileId(6), &make("empty.go", "")).unwrap();
        assert_eq!(parsed.root().kind(), "source_file");
    }

    #[test]
    fn file_id_and_path_preserved() {
        let parsed = parse_go_file(FileId(77), &make("a/b/c.go", "package c")).unwrap();
        assert_eq!(parsed.file_id, FileId(77));
        assert_eq!(parsed.path, "a/b/c.go");
    }
}
