use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tree_sitter::{Node, Tree};

/// Engine-internal identifier for a file within one audit run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileId(pub u64);

/// Text range in (line, col) space; 0-based. Findings convert to 1-based
/// positions when they are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRange {
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

/// Lightweight handle to "where in the AST" something lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AstLocation {
    pub file_id: FileId,
    pub range: TextRange,
}

/// A fully parsed Go source file: source text plus its tree-sitter AST.
#[derive(Debug)]
pub struct ParsedFile {
    pub file_id: FileId,
    pub path: String,
    pub source: Arc<String>,
    pub tree: Tree,
}

impl ParsedFile {
    /// Convert a tree-sitter node range into a TextRange.
    pub fn location_for_node(&self, node: &Node) -> AstLocation {
        let range = node.range();
        let start = range.start_point;
        let end = range.end_point;

        AstLocation {
            file_id: self.file_id,
            range: TextRange {
                start_line: start.row as u32,
                start_col: start.column as u32,
                end_line: end.row as u32,
                end_col: end.column as u32,
            },
        }
    }

    /// Get the exact source text for a node.
    pub fn text_for_node(&self, node: &Node) -> String {
        let byte_range = node.byte_range();
        self.source[byte_range.start..byte_range.end].to_string()
    }

    /// The root node of the syntax tree.
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::go::parse_go_file;
    use crate::types::SourceFile;
    use std::collections::HashSet;

    fn parse(code: &str) -> ParsedFile {
        let sf = SourceFile::new("test.go", code);
        parse_go_file(FileId(1), &sf).unwrap()
    }

    #[test]
    fn file_id_equality_and_hash() {
        let mut set = HashSet::new();
        set.insert(FileId(1));
        set.insert(FileId(2));
        set.insert(FileId(1));
        assert_eq!(set.len(), 2);
        assert!(set.contains(&FileId(1)));
        assert!(!set.contains(&FileId(3)));
    }

    #[test]
    fn file_id_serialize_roundtrip() {
        let id = FileId(999);
        let json = serde_json::to_string(&id).unwrap();
        let back: FileId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }

    #[test]
    fn location_for_node_simple() {
        let parsed = parse("package main");
        let root = parsed.root();
        let loc = parsed.location_for_node(&root);
        assert_eq!(loc.file_id, FileId(1));
        assert_eq!(loc.range.start_line, 0);
        assert_eq!(loc.range.start_col, 0);
    }

    #[test]
    fn location_for_node_multiline() {
        let parsed = parse("package main\n\nfunc f() {\n}\n");
        let root = parsed.root();
        let mut func = None;
        for i in 0..root.child_count() {
            let c = root.child(i).unwrap();
            if c.kind() == "function_declaration" {
                func = Some(c);
            }
        }
        let func = func.expect("function_declaration");
        let loc = parsed.location_for_node(&func);
        assert_eq!(loc.range.start_line, 2);
        assert_eq!(loc.range.end_line, 3);
    }

    #[test]
    fn text_for_node_whole_file() {
        let code = "package main\n\nvar x = 42\n";
        let parsed = parse(code);
        let root = parsed.root();
        assert_eq!(parsed.text_for_node(&root), code);
    }

    #[test]
    fn text_for_node_identifier() {
        let parsed = parse("package main\n\nfunc helper() {}\n");
        let root = parsed.root();
        let mut name = None;
        for i in 0..root.child_count() {
            let c = root.child(i).unwrap();
            if c.kind() == "function_declaration" {
                name = c.child_by_field_name("name");
            }
        }
        let name = name.expect("name node");
        assert_eq!(parsed.text_for_node(&name), "helper");
    }

    #[test]
    fn source_is_shared_via_arc() {
        let parsed = parse("package main");
        let clone = Arc::clone(&parsed.source);
        assert_eq!(*clone, "package main");
        assert_eq!(Arc::strong_count(&parsed.source), 2);
    }
}
