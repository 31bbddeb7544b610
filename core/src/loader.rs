use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use log::{debug, warn};

use crate::error::LoadError;
use crate::parse::ast::FileId;
use crate::parse::go::parse_go_file;
use crate::types::SourceFile;
use crate::unit::{SemanticUnit, UnitFile};

/// A non-fatal problem that caused one unit to be skipped.
#[derive(Debug, Clone)]
pub struct LoadDiagnostic {
    pub dir: String,
    pub reason: String,
}

/// The result of loading: the units that parsed plus diagnostics for the ones
/// that did not.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub units: Vec<SemanticUnit>,
    pub skipped: Vec<LoadDiagnostic>,
}

/// Load semantic units (one per Go package directory) from the given paths.
///
/// Fatal errors: a missing input path, or no `.go` file anywhere under the
/// inputs. A unit that fails to read or parse is skipped with a diagnostic
/// and the rest of the scan proceeds.
///
/// `vendor/` and `testdata/` directories and `_test.go` files are excluded.
pub fn load_units(paths: &[PathBuf]) -> Result<LoadOutcome, LoadError> {
    for path in paths {
        if !path.exists() {
            return Err(LoadError::MissingPath(path.display().to_string()));
        }
    }

    let mut by_dir: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();
    for path in paths {
        for entry in WalkBuilder::new(path).build() {
            let entry = entry.map_err(|e| LoadError::Walk(e.to_string()))?;
            let file = entry.path();
            if !entry.file_type().is_some_and(|t| t.is_file()) || !is_scannable(file) {
                continue;
            }
            let dir = file.parent().unwrap_or(Path::new(".")).to_path_buf();
            by_dir.entry(dir).or_default().push(file.to_path_buf());
        }
    }

    if by_dir.is_empty() {
        return Err(LoadError::NoSources);
    }

    let mut outcome = LoadOutcome::default();
    let mut next_id: u64 = 1;

    'dirs: for (dir, mut files) in by_dir {
        files.sort();
        let mut unit_files = Vec::with_capacity(files.len());
        for file in &files {
            let content = match std::fs::read_to_string(file) {
                Ok(c) => c,
                Err(e) => {
                    warn!("skipping unit {}: {}", dir.display(), e);
                    outcome.skipped.push(LoadDiagnostic {
                        dir: dir.display().to_string(),
                        reason: format!("read {}: {e}", file.display()),
                    });
                    continue 'dirs;
                }
            };
            let sf = SourceFile::new(file.display().to_string(), content);
            let file_id = FileId(next_id);
            next_id += 1;
            match parse_go_file(file_id, &sf) {
                Ok(parsed) => unit_files.push(UnitFile::new(parsed)),
                Err(e) => {
                    warn!("skipping unit {}: {}", dir.display(), e);
                    outcome.skipped.push(LoadDiagnostic {
                        dir: dir.display().to_string(),
                        reason: format!("parse {}: {e}", file.display()),
                    });
                    continue 'dirs;
                }
            }
        }
        if unit_files.is_empty() {
            continue;
        }
        debug!("loaded unit {} ({} files)", dir.display(), unit_files.len());
        outcome
            .units
            .push(SemanticUnit::from_files(dir.display().to_string(), unit_files));
    }

    Ok(outcome)
}

/// Build a single in-memory unit from source files, for tests and embedding.
pub fn unit_from_sources(sources: &[SourceFile]) -> anyhow::Result<SemanticUnit> {
    let mut files = Vec::with_capacity(sources.len());
    for (i, sf) in sources.iter().enumerate() {
        let parsed = parse_go_file(FileId(i as u64 + 1), sf)?;
        files.push(UnitFile::new(parsed));
    }
    Ok(SemanticUnit::from_files("", files))
}

fn is_scannable(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if !name.ends_with(".go") || name.ends_with("_test.go") {
        return false;
    }
    !path.components().any(|c| {
        matches!(c.as_os_str().to_str(), Some("vendor") | Some("testdata"))
    })
}
