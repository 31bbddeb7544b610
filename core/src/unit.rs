use std::collections::HashMap;

use crate::parse::ast::{AstLocation, ParsedFile};
use crate::resolve::Resolver;

/// One Go import as written in a file.
#[derive(Debug, Clone)]
pub struct GoImport {
    /// The import path, e.g. "k8s.io/client-go/kubernetes".
    pub path: String,
    /// Optional alias, e.g. "metav1" in `import metav1 "k8s.io/apimachinery/pkg/apis/meta/v1"`.
    pub alias: Option<String>,
    /// Blank import (`import _ "..."`).
    pub is_blank: bool,
    /// Dot import (`import . "..."`).
    pub is_dot: bool,
    pub location: AstLocation,
}

impl GoImport {
    /// The package qualifier this import binds in the file: its alias if
    /// present, otherwise the last path segment.
    pub fn qualifier(&self) -> Option<&str> {
        if self.is_blank || self.is_dot {
            return None;
        }
        match &self.alias {
            Some(a) => Some(a.as_str()),
            None => self.path.rsplit('/').next(),
        }
    }
}

/// Per-file table mapping package qualifiers to import paths.
///
/// This is the precise resolution tier: `kubernetes.NewForConfig` resolves to
/// `(k8s.io/client-go/kubernetes, NewForConfig)` because the file imports
/// that path. Dot imports poison bare-identifier resolution for the file and
/// are recorded but never guessed through.
#[derive(Debug, Clone, Default)]
pub struct ImportTable {
    imports: Vec<GoImport>,
    by_qualifier: HashMap<String, String>,
    has_dot: bool,
}

impl ImportTable {
    pub fn from_parsed(parsed: &ParsedFile) -> Self {
        let mut table = ImportTable::default();
        let root = parsed.root();
        for i in 0..root.child_count() {
            if let Some(child) = root.child(i) {
                if child.kind() == "import_declaration" {
                    collect_imports(parsed, &child, &mut table);
                }
            }
        }
        table
    }

    fn push(&mut self, import: GoImport) {
        if import.is_dot {
            self.has_dot = true;
        }
        if let Some(q) = import.qualifier() {
            self.by_qualifier.insert(q.to_string(), import.path.clone());
        }
        self.imports.push(import);
    }

    /// Resolve a package qualifier to its import path.
    pub fn qualifier_path(&self, qualifier: &str) -> Option<&str> {
        self.by_qualifier.get(qualifier).map(String::as_str)
    }

    pub fn imports(&self) -> &[GoImport] {
        &self.imports
    }

    /// True if the file has a dot import, which makes bare identifiers
    /// ambiguous.
    pub fn has_dot_import(&self) -> bool {
        self.has_dot
    }

    /// True if any import path satisfies the predicate.
    pub fn any_path<F: Fn(&str) -> bool>(&self, pred: F) -> bool {
        self.imports.iter().any(|imp| pred(&imp.path))
    }
}

fn collect_imports(parsed: &ParsedFile, node: &tree_sitter::Node, table: &mut ImportTable) {
    fn process_spec(parsed: &ParsedFile, spec: tree_sitter::Node, table: &mut ImportTable) {
        let mut path = String::new();
        let mut alias = None;
        let mut is_blank = false;
        let mut is_dot = false;

        for i in 0..spec.child_count() {
            if let Some(child) = spec.child(i) {
                match child.kind() {
                    "interpreted_string_literal" | "raw_string_literal" => {
                        path = parsed
                            .text_for_node(&child)
                            .trim_matches('"')
                            .trim_matches('`')
                            .to_string();
                    }
                    "package_identifier" | "identifier" => {
                        let name = parsed.text_for_node(&child);
                        if name == "_" {
                            is_blank = true;
                        } else if name == "." {
                            is_dot = true;
                        } else {
                            alias = Some(name);
                        }
                    }
                    "blank_identifier" => is_blank = true,
                    "dot" => is_dot = true,
                    _ => {}
                }
            }
        }

        if !path.is_empty() {
            table.push(GoImport {
                path,
                alias,
                is_blank,
                is_dot,
                location: parsed.location_for_node(&spec),
            });
        }
    }

    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            match child.kind() {
                "import_spec" => process_spec(parsed, child, table),
                "import_spec_list" => {
                    for j in 0..child.child_count() {
                        if let Some(spec) = child.child(j) {
                            if spec.kind() == "import_spec" {
                                process_spec(parsed, spec, table);
                            }
                        }
                    }
                }
                _ => {}
            }
        }
    }
}

/// One parsed file together with its import table.
#[derive(Debug)]
pub struct UnitFile {
    pub parsed: ParsedFile,
    pub imports: ImportTable,
}

impl UnitFile {
    pub fn new(parsed: ParsedFile) -> Self {
        let imports = ImportTable::from_parsed(&parsed);
        Self { parsed, imports }
    }

    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.parsed, &self.imports)
    }

    pub fn root(&self) -> tree_sitter::Node<'_> {
        self.parsed.root()
    }

    pub fn text(&self, node: &tree_sitter::Node) -> String {
        self.parsed.text_for_node(node)
    }
}

/// One loaded, resolved compilation unit: a Go package directory.
///
/// Immutable after loading; discarded once its rules have run.
#[derive(Debug)]
pub struct SemanticUnit {
    /// Directory the unit was loaded from (empty for in-memory units).
    pub dir: String,
    /// Package name from the first file's package clause.
    pub package_name: String,
    pub files: Vec<UnitFile>,
}

impl SemanticUnit {
    /// Build a unit from already-parsed files.
    pub fn from_files(dir: impl Into<String>, files: Vec<UnitFile>) -> Self {
        let package_name = files
            .first()
            .and_then(|f| package_name(&f.parsed))
            .unwrap_or_default();
        Self {
            dir: dir.into(),
            package_name,
            files,
        }
    }

    /// True if any file in the unit imports a path satisfying the predicate.
    pub fn imports_any<F: Fn(&str) -> bool + Copy>(&self, pred: F) -> bool {
        self.files.iter().any(|f| f.imports.any_path(pred))
    }
}

/// Extract the package name from a file's package clause.
pub fn package_name(parsed: &ParsedFile) -> Option<String> {
    let root = parsed.root();
    for i in 0..root.child_count() {
        let child = root.child(i)?;
        if child.kind() == "package_clause" {
            for j in 0..child.child_count() {
                if let Some(ident) = child.child(j) {
                    if ident.kind() == "package_identifier" {
                        return Some(parsed.text_for_node(&ident));
                    }
                }
            }
        }
    }
    None
}
