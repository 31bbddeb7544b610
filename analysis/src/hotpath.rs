//! Hot-path classification shared by the construct-in-hot-path rule family.
//!
//! A function is "hot path" if it is likely to run per-request or per-item:
//! reconcilers, HTTP handlers, worker loops. The precise tier matches known
//! signature shapes through the import table; the name heuristic is the
//! documented fallback. `init` functions are never hot path.

use kubeaudit_core::{FunctionRef, ImportTable};

use crate::watchlists::paths;

const HOT_NAMES: &[&str] = &[
    "reconcile",
    "servehttp",
    "handle",
    "process",
    "sync",
    "worker",
    "run",
];

const HOT_SUBSTRINGS: &[&str] = &["reconcil", "handler", "loop"];

/// Classify the enclosing function of a call site.
pub fn is_hot_path(func: &FunctionRef, imports: &ImportTable) -> bool {
    if func.name == "init" {
        return false;
    }

    // Precise tier: ServeHTTP(http.ResponseWriter, *http.Request).
    if func.name == "ServeHTTP" && func.param_types.len() == 2 {
        if type_resolves_to(&func.param_types[0], imports, paths::NET_HTTP, "ResponseWriter")
            && type_resolves_to(&func.param_types[1], imports, paths::NET_HTTP, "Request")
        {
            return true;
        }
    }

    // Precise tier: Reconcile(...) (reconcile.Result, error).
    if func.name == "Reconcile" {
        if let Some(first) = func.result_types.first() {
            if type_resolves_to(first, imports, paths::CR_RECONCILE, "Result")
                || type_resolves_to(first, imports, paths::CONTROLLER_RUNTIME, "Result")
            {
                return true;
            }
        }
    }

    // Name-heuristic fallback: receiver type first, then the function name.
    if let Some(receiver) = &func.receiver {
        let recv = receiver.to_lowercase();
        if recv.contains("reconcil") || recv.contains("controller") {
            return true;
        }
    }
    let name = func.name.to_lowercase();
    if HOT_NAMES.contains(&name.as_str()) {
        return true;
    }
    HOT_SUBSTRINGS.iter().any(|s| name.contains(s))
}

/// True if a declared type text like `*http.Request` resolves through the
/// import table to the given package path and type name.
fn type_resolves_to(type_text: &str, imports: &ImportTable, path: &str, name: &str) -> bool {
    let stripped = type_text.trim_start_matches('*');
    let Some((qualifier, type_name)) = stripped.split_once('.') else {
        return false;
    };
    type_name == name && imports.qualifier_path(qualifier) == Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kubeaudit_core::{unit_from_sources, FunctionRef, SourceFile};

    fn func_and_imports(code: &str) -> (FunctionRef, ImportTable) {
        let unit = unit_from_sources(&[SourceFile::new("test.go", code)]).unwrap();
        let file = &unit.files[0];
        let root = file.root();
        let mut found = None;
        for i in 0..root.child_count() {
            let c = root.child(i).unwrap();
            if c.kind() == "function_declaration" || c.kind() == "method_declaration" {
                found = FunctionRef::from_node(&file.parsed, c);
            }
        }
        (found.expect("function"), file.imports.clone())
    }

    #[test]
    fn serve_http_signature_is_hot() {
        let (f, imports) = func_and_imports(
            r#"
package p

import "net/http"

func (s *Server) ServeHTTP(w http.ResponseWriter, r *http.Request) {}
"#,
        );
        assert!(is_hot_path(&f, &imports));
    }

    #[test]
    fn serve_http_name_without_signature_still_hot_by_name() {
        // The fixed name set includes servehttp, so the fallback fires even
        // when the signature does not resolve.
        let (f, imports) = func_and_imports("package p\n\nfunc ServeHTTP() {}\n");
        assert!(is_hot_path(&f, &imports));
    }

    #[test]
    fn reconcile_result_signature_is_hot() {
        let (f, imports) = func_and_imports(
            r#"
package p

import "sigs.k8s.io/controller-runtime/pkg/reconcile"

func (r *Thing) Reconcile(ctx context.Context, req reconcile.Request) (reconcile.Result, error) {
    return reconcile.Result{}, nil
}
"#,
        );
        assert!(is_hot_path(&f, &imports));
    }

    #[test]
    fn reconciler_receiver_is_hot() {
        let (f, imports) =
            func_and_imports("package p\n\nfunc (r *PodReconciler) helper() {}\n");
        assert!(is_hot_path(&f, &imports));
    }

    #[test]
    fn handler_substring_is_hot() {
        let (f, imports) = func_and_imports("package p\n\nfunc requestHandler() {}\n");
        assert!(is_hot_path(&f, &imports));
    }

    #[test]
    fn init_is_never_hot() {
        let (f, imports) = func_and_imports("package p\n\nfunc init() {}\n");
        assert!(!is_hot_path(&f, &imports));
    }

    #[test]
    fn plain_function_is_not_hot() {
        let (f, imports) = func_and_imports("package p\n\nfunc setup() {}\n");
        assert!(!is_hot_path(&f, &imports));
    }
}
